//! Structural anchor extraction and distance-based pruning

use super::classifier::DataType;
use super::detector::TableRegion;
use crate::grid::{Cell, CellRef, Grid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Anchor rows and columns of a region, in sheet coordinates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSet {
    pub anchor_rows: BTreeSet<u32>,
    pub anchor_cols: BTreeSet<u32>,
}

impl AnchorSet {
    pub fn is_anchor_row(&self, row: u32) -> bool {
        self.anchor_rows.contains(&row)
    }

    pub fn is_anchor_col(&self, col: u32) -> bool {
        self.anchor_cols.contains(&col)
    }
}

/// Cells of a region that survive pruning
///
/// A cell is retained when its row and its column are both kept, or when it
/// lies on an anchor row or anchor column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrunedRegion {
    pub region: TableRegion,
    pub anchors: AnchorSet,
    pub kept_rows: Vec<u32>,
    pub kept_cols: Vec<u32>,
}

impl PrunedRegion {
    /// The whole region, nothing pruned
    pub fn full(region: TableRegion) -> Self {
        Self {
            region,
            anchors: AnchorSet::default(),
            kept_rows: (region.top..=region.bottom).collect(),
            kept_cols: (region.left..=region.right).collect(),
        }
    }

    pub fn retains(&self, row: u32, col: u32) -> bool {
        if !self.region.contains(CellRef::new(row, col)) {
            return false;
        }
        self.anchors.is_anchor_row(row)
            || self.anchors.is_anchor_col(col)
            || (self.kept_rows.binary_search(&row).is_ok()
                && self.kept_cols.binary_search(&col).is_ok())
    }

    /// Retained positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = CellRef> + '_ {
        let region = self.region;
        (region.top..=region.bottom)
            .flat_map(move |row| {
                (region.left..=region.right).map(move |col| CellRef::new(row, col))
            })
            .filter(move |at| self.retains(at.row, at.col))
    }

    pub fn retained_cell_count(&self) -> usize {
        self.positions().count()
    }

    pub fn pruned_cell_count(&self) -> usize {
        self.region.cell_count() - self.retained_cell_count()
    }

    /// Retained cells in row-major order, including empty ones
    pub fn cells<'g>(&'g self, grid: &'g Grid) -> impl Iterator<Item = &'g Cell> + 'g {
        self.positions().filter_map(move |at| grid.get(at.row, at.col))
    }
}

/// Finds the rows and columns where the type structure of a region changes
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralAnchorExtractor;

impl StructuralAnchorExtractor {
    /// Outer edges plus every row (column) whose type signature differs from the previous one
    pub fn extract_anchors(&self, grid: &Grid, region: &TableRegion) -> AnchorSet {
        let row_signature = |row: u32| -> Vec<DataType> {
            (region.left..=region.right)
                .map(|col| type_at(grid, row, col))
                .collect()
        };
        let col_signature = |col: u32| -> Vec<DataType> {
            (region.top..=region.bottom)
                .map(|row| type_at(grid, row, col))
                .collect()
        };

        AnchorSet {
            anchor_rows: boundaries(region.top, region.bottom, row_signature),
            anchor_cols: boundaries(region.left, region.right, col_signature),
        }
    }

    /// Keep rows and columns within `k` of an anchor. Anchors themselves always survive.
    pub fn prune(&self, region: &TableRegion, anchors: &AnchorSet, k: u32) -> PrunedRegion {
        PrunedRegion {
            region: *region,
            anchors: anchors.clone(),
            kept_rows: within_distance(region.top, region.bottom, &anchors.anchor_rows, k),
            kept_cols: within_distance(region.left, region.right, &anchors.anchor_cols, k),
        }
    }
}

fn type_at(grid: &Grid, row: u32, col: u32) -> DataType {
    grid.get(row, col)
        .map_or(DataType::Empty, |cell| cell.data_type)
}

fn boundaries<F>(first: u32, last: u32, signature: F) -> BTreeSet<u32>
where
    F: Fn(u32) -> Vec<DataType>,
{
    let mut anchors = BTreeSet::from([first, last]);
    let mut previous = signature(first);
    for line in first + 1..=last {
        let current = signature(line);
        if current != previous {
            anchors.insert(line);
        }
        previous = current;
    }
    anchors
}

fn within_distance(first: u32, last: u32, anchors: &BTreeSet<u32>, k: u32) -> Vec<u32> {
    (first..=last)
        .filter(|&line| {
            let before = anchors.range(..=line).next_back();
            let after = anchors.range(line..).next();
            before.is_some_and(|&a| line - a <= k) || after.is_some_and(|&a| a - line <= k)
        })
        .collect()
}
