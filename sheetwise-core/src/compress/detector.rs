//! Table region detection
//!
//! Splits a sheet into rectangular islands of data separated by fully empty
//! rows or columns, then labels each island with a coarse table type.

use super::classifier::DataType;
use crate::grid::{CellRef, Grid};
use serde::{Deserialize, Serialize};

/// Coarse shape of a detected table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableType {
    /// Header row over typed columns (the default)
    DataTable,
    /// Two columns of label/value pairs
    KeyValue,
    /// Single column
    List,
    /// Header row and label column around a numeric body
    Matrix,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::DataTable => "data table",
            TableType::KeyValue => "key-value",
            TableType::List => "list",
            TableType::Matrix => "matrix",
        }
    }
}

/// Inclusive bounding box over the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRegion {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
    pub table_type: TableType,
    pub has_header: bool,
}

impl TableRegion {
    /// Plain region over the given bounds, typed as a data table
    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
            table_type: TableType::DataTable,
            has_header: false,
        }
    }

    /// Region covering the whole grid
    pub fn whole(grid: &Grid) -> Self {
        Self::new(0, grid.rows() - 1, 0, grid.cols() - 1)
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn cell_count(&self) -> usize {
        self.height() as usize * self.width() as usize
    }

    pub fn contains(&self, at: CellRef) -> bool {
        (self.top..=self.bottom).contains(&at.row) && (self.left..=self.right).contains(&at.col)
    }

    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.top, self.left)
    }

    pub fn bottom_right(&self) -> CellRef {
        CellRef::new(self.bottom, self.right)
    }

    /// Share of non-empty cells inside the box
    pub fn density(&self, grid: &Grid) -> f64 {
        let filled = (self.top..=self.bottom)
            .flat_map(|row| (self.left..=self.right).map(move |col| (row, col)))
            .filter(|&(row, col)| !grid.is_empty_at(row, col))
            .count();
        filled as f64 / self.cell_count() as f64
    }
}

impl std::fmt::Display for TableRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.top_left(), self.bottom_right())
    }
}

/// Finds data islands separated by at least `min_gap` empty rows or columns
#[derive(Debug, Clone, Copy)]
pub struct TableRegionDetector {
    min_gap: u32,
}

impl Default for TableRegionDetector {
    fn default() -> Self {
        Self { min_gap: 1 }
    }
}

impl TableRegionDetector {
    pub fn new(min_gap: u32) -> Self {
        Self {
            min_gap: min_gap.max(1),
        }
    }

    /// Detect regions, ordered top-to-bottom then left-to-right.
    ///
    /// A grid without data yields an empty list.
    pub fn detect(&self, grid: &Grid) -> Vec<TableRegion> {
        let mut regions = Vec::new();
        let mut pending = vec![(0, grid.rows() - 1, 0, grid.cols() - 1)];

        while let Some(bounds) = pending.pop() {
            let Some((top, bottom, left, right)) = tighten(grid, bounds) else {
                continue;
            };

            let row_bands = split_bands(top, bottom, self.min_gap, |row| {
                (left..=right).all(|col| grid.is_empty_at(row, col))
            });
            if row_bands.len() > 1 {
                pending.extend(row_bands.into_iter().map(|(t, b)| (t, b, left, right)));
                continue;
            }

            let col_bands = split_bands(left, right, self.min_gap, |col| {
                (top..=bottom).all(|row| grid.is_empty_at(row, col))
            });
            if col_bands.len() > 1 {
                pending.extend(col_bands.into_iter().map(|(l, r)| (top, bottom, l, r)));
                continue;
            }

            regions.push(classify_region(grid, TableRegion::new(top, bottom, left, right)));
        }

        regions.sort_by_key(|r| (r.top, r.left));
        regions
    }
}

/// Shrink bounds to the non-empty cells they contain
fn tighten(
    grid: &Grid,
    (top, bottom, left, right): (u32, u32, u32, u32),
) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for row in top..=bottom {
        for col in left..=right {
            if grid.is_empty_at(row, col) {
                continue;
            }
            bounds = Some(match bounds {
                None => (row, row, col, col),
                Some((t, b, l, r)) => (t.min(row), b.max(row), l.min(col), r.max(col)),
            });
        }
    }
    bounds
}

/// Split `start..=end` into bands separated by runs of at least `min_gap` empty lines
fn split_bands(
    start: u32,
    end: u32,
    min_gap: u32,
    is_empty: impl Fn(u32) -> bool,
) -> Vec<(u32, u32)> {
    let mut bands = Vec::new();
    let mut band_start: Option<u32> = None;
    let mut band_end = start;
    let mut gap = 0;

    for line in start..=end {
        if is_empty(line) {
            gap += 1;
            continue;
        }
        match band_start {
            Some(s) if gap >= min_gap => {
                bands.push((s, band_end));
                band_start = Some(line);
            }
            None => band_start = Some(line),
            Some(_) => {}
        }
        band_end = line;
        gap = 0;
    }
    if let Some(s) = band_start {
        bands.push((s, band_end));
    }

    bands
}

fn classify_region(grid: &Grid, region: TableRegion) -> TableRegion {
    let TableRegion {
        top,
        bottom,
        left,
        right,
        ..
    } = region;
    let type_at = |row: u32, col: u32| {
        grid.get(row, col)
            .map_or(DataType::Empty, |cell| cell.data_type)
    };
    let filled = |t: &DataType| *t != DataType::Empty;

    let header: Vec<DataType> = (left..=right).map(|col| type_at(top, col)).collect();
    let header_filled = header.iter().filter(|t| filled(t)).count();
    let body_has_values = (top + 1..=bottom).any(|row| {
        (left..=right).any(|col| !matches!(type_at(row, col), DataType::Empty | DataType::Others))
    });
    let has_header = region.height() >= 2
        && header_filled * 2 >= header.len()
        && header.iter().all(|t| matches!(t, DataType::Empty | DataType::Others))
        && body_has_values;

    let labels_from = |from: u32| (from..=bottom).all(|row| type_at(row, left) == DataType::Others);

    let key_value = region.width() == 2 && region.height() >= 2 && labels_from(top) && {
        // a typed value column reads as a header over data; mixed types read as key/value pairs
        let mut value_types: Vec<DataType> = (top + 1..=bottom)
            .map(|row| type_at(row, right))
            .filter(filled)
            .collect();
        value_types.sort();
        value_types.dedup();
        !has_header || value_types.len() > 1
    };

    let matrix = !key_value && has_header && region.width() >= 3 && labels_from(top + 1) && {
        let interior: Vec<DataType> = (top + 1..=bottom)
            .flat_map(|row| (left + 1..=right).map(move |col| (row, col)))
            .map(|(row, col)| type_at(row, col))
            .filter(filled)
            .collect();
        !interior.is_empty() && interior.iter().all(DataType::is_numeric)
    };

    let table_type = if region.width() == 1 {
        TableType::List
    } else if key_value {
        TableType::KeyValue
    } else if matrix {
        TableType::Matrix
    } else {
        TableType::DataTable
    };

    TableRegion {
        table_type,
        has_header: has_header && !key_value,
        ..region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|v| CellValue::from(*v)).collect::<Vec<_>>()),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_grid_has_no_regions() {
        let g = grid(&[&["", ""], &["", ""]]);
        assert!(TableRegionDetector::default().detect(&g).is_empty());
    }

    #[test]
    fn test_split_on_empty_row_and_column() {
        let g = grid(&[
            &["Name", "Score", "", "Key"],
            &["Ann", "10", "", "x"],
            &["", "", "", ""],
            &["Bob", "12", "", ""],
        ]);
        let regions = TableRegionDetector::default().detect(&g);
        let rendered: Vec<String> = regions.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["A1:B2", "D1:D2", "A4:B4"]);

        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                assert!(!a.contains(b.top_left()) && !a.contains(b.bottom_right()));
            }
        }
    }

    #[test]
    fn test_min_gap_keeps_single_blank_rows_inside() {
        let g = grid(&[&["a", "1"], &["", ""], &["b", "2"]]);
        assert_eq!(TableRegionDetector::new(1).detect(&g).len(), 2);
        let regions = TableRegionDetector::new(2).detect(&g);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].to_string(), "A1:B3");
    }

    #[test]
    fn test_table_types() {
        let data = grid(&[
            &["Name", "Joined", "Email"],
            &["Ann", "2023-01-01", "ann@example.com"],
            &["Bob", "2023-02-01", "bob@example.com"],
        ]);
        let region = TableRegionDetector::default().detect(&data)[0];
        assert_eq!(region.table_type, TableType::DataTable);
        assert!(region.has_header);

        let matrix = grid(&[
            &["Region", "Q1", "Q2"],
            &["North", "10", "20"],
            &["South", "30", "40"],
        ]);
        let region = TableRegionDetector::default().detect(&matrix)[0];
        assert_eq!(region.table_type, TableType::Matrix);

        let key_value = grid(&[&["Owner", "Ann"], &["Budget", "$100"], &["Due", "2024-01-01"]]);
        assert_eq!(
            TableRegionDetector::default().detect(&key_value)[0].table_type,
            TableType::KeyValue
        );

        let list = grid(&[&["x"], &["y"], &["z"]]);
        assert_eq!(
            TableRegionDetector::default().detect(&list)[0].table_type,
            TableType::List
        );
    }

    #[test]
    fn test_density() {
        let g = grid(&[&["a", "b"], &["c", ""], &["d", "e"]]);
        let regions = TableRegionDetector::new(3).detect(&g);
        assert_eq!(regions.len(), 1);
        assert!((regions[0].density(&g) - 5.0 / 6.0).abs() < 1e-9);
    }
}
