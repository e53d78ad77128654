//! Address ranges and contiguous-run merging

use crate::grid::CellRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Shortest run the inverted-index translator collapses into a range
pub const TRANSLATION_MIN_RUN: usize = 2;

/// Shortest run the format aggregator collapses into a range
pub const AGGREGATION_MIN_RUN: usize = 3;

/// One or more cells sharing a grouping key.
///
/// A `Range` always spans a single row or a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AddressRange {
    Single { address: CellRef },
    Range { start: CellRef, end: CellRef },
}

impl AddressRange {
    pub fn single(at: CellRef) -> Self {
        AddressRange::Single { address: at }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, AddressRange::Range { .. })
    }

    pub fn start(&self) -> CellRef {
        match self {
            AddressRange::Single { address } => *address,
            AddressRange::Range { start, .. } => *start,
        }
    }

    pub fn end(&self) -> CellRef {
        match self {
            AddressRange::Single { address } => *address,
            AddressRange::Range { end, .. } => *end,
        }
    }

    /// Number of cells covered
    pub fn len(&self) -> usize {
        let (start, end) = (self.start(), self.end());
        ((end.row - start.row + 1) * (end.col - start.col + 1)) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Cells covered, row-major
    pub fn expand(&self) -> Vec<CellRef> {
        let (start, end) = (self.start(), self.end());
        (start.row..=end.row)
            .flat_map(|row| (start.col..=end.col).map(move |col| CellRef::new(row, col)))
            .collect()
    }
}

impl std::fmt::Display for AddressRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressRange::Single { address } => write!(f, "{address}"),
            AddressRange::Range { start, end } => write!(f, "{start}:{end}"),
        }
    }
}

/// Merge cells into ranges.
///
/// Cells are visited in row-major order. From each unconsumed cell the run
/// is extended right along the row and down along the column over cells that
/// are present and unconsumed; the longer direction wins, ties go to the row.
/// A run of at least `min_run` cells becomes a `Range`, anything shorter is
/// emitted cell by cell. The output is a deterministic function of the cell
/// set, so merging the expansion of a result reproduces it.
pub fn merge_address_ranges<I>(cells: I, min_run: usize) -> Vec<AddressRange>
where
    I: IntoIterator<Item = CellRef>,
{
    let mut remaining: BTreeSet<CellRef> = cells.into_iter().collect();
    let min_run = min_run.max(2);
    let mut merged = Vec::new();

    while let Some(first) = remaining.pop_first() {
        let horizontal = run_length(&remaining, first, 0, 1);
        let vertical = run_length(&remaining, first, 1, 0);
        let (dr, dc, extra) = if horizontal >= vertical {
            (0, 1, horizontal)
        } else {
            (1, 0, vertical)
        };

        if extra + 1 < min_run {
            merged.push(AddressRange::single(first));
            continue;
        }

        let mut end = first;
        for _ in 0..extra {
            end = CellRef::new(end.row + dr, end.col + dc);
            remaining.remove(&end);
        }
        merged.push(AddressRange::Range { start: first, end });
    }

    merged
}

/// Number of consecutive cells after `from` in direction (dr, dc)
fn run_length(cells: &BTreeSet<CellRef>, from: CellRef, dr: u32, dc: u32) -> usize {
    let mut count = 0;
    let mut at = from;
    loop {
        let (Some(row), Some(col)) = (at.row.checked_add(dr), at.col.checked_add(dc)) else {
            return count;
        };
        at = CellRef::new(row, col);
        if !cells.contains(&at) {
            return count;
        }
        count += 1;
    }
}
