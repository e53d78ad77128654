//! Format-aware aggregation: data type -> merged address ranges

use super::anchors::PrunedRegion;
use super::classifier::DataType;
use super::ranges::{AGGREGATION_MIN_RUN, AddressRange, merge_address_ranges};
use crate::grid::{Cell, CellRef, Grid};
use std::collections::BTreeMap;

/// Data type to the ranges of that type. `Empty` is the implicit remainder.
pub type FormatGroups = BTreeMap<DataType, Vec<AddressRange>>;

#[derive(Debug, Clone, Copy)]
pub struct DataFormatAggregator {
    min_run: usize,
}

impl Default for DataFormatAggregator {
    fn default() -> Self {
        Self {
            min_run: AGGREGATION_MIN_RUN,
        }
    }
}

impl DataFormatAggregator {
    pub fn new(min_run: usize) -> Self {
        Self { min_run }
    }

    pub fn aggregate(&self, grid: &Grid, pruned: &PrunedRegion) -> FormatGroups {
        let mut by_type: BTreeMap<DataType, Vec<&Cell>> = BTreeMap::new();
        for cell in pruned.cells(grid).filter(|c| !c.is_empty()) {
            by_type.entry(cell.data_type).or_default().push(cell);
        }

        by_type
            .into_iter()
            .map(|(data_type, cells)| (data_type, self.group_contiguous_cells(&cells)))
            .collect()
    }

    /// Order cells by (row, col) and merge runs of `min_run` or more into ranges
    pub fn group_contiguous_cells(&self, cells: &[&Cell]) -> Vec<AddressRange> {
        let mut refs: Vec<CellRef> = cells.iter().map(|c| c.at).collect();
        refs.sort();
        merge_address_ranges(refs, self.min_run)
    }
}
