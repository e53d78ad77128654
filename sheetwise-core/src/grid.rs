//! Dense cell grid that every compression stage works on

use crate::compress::classifier::{self, DataType};
use crate::error::{Result, SheetwiseError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

/// Cell position (0-based), displayed in `A1` notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", col_to_letter(self.col), self.row + 1)
    }

    /// Parse an Excel-style reference such as `AB12`. `$` markers are ignored.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim().replace('$', "");
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = reference.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(Self::new(row - 1, letter_to_col(letters)?))
    }
}

impl PartialOrd for CellRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then_with(|| self.col.cmp(&other.col))
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_excel_ref())
    }
}

impl Serialize for CellRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_excel_ref())
    }
}

impl<'de> Deserialize<'de> for CellRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        CellRef::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid cell reference '{text}'")))
    }
}

/// Convert column index (0-based) to Excel-style letter (A, B, ..., Z, AA, AB, ...)
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut col = col + 1;

    while col > 0 {
        col -= 1;
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }

    result
}

/// Inverse of [`col_to_letter`]; `None` for empty or non-alphabetic input
pub fn letter_to_col(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    Some(col - 1)
}

/// Raw cell content as handed over by a loader
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl CellValue {
    /// Check if the cell is empty (NaN numbers count as empty)
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) => n.is_nan(),
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Boolean(_) => false,
        }
    }

    /// Text rendering used for classification and encoding
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) if n.is_nan() => String::new(),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::from(value.as_str())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

/// Represents a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub at: CellRef,
    pub value: CellValue,
    pub data_type: DataType,
}

impl Cell {
    pub fn new(row: u32, col: u32, value: CellValue) -> Self {
        let data_type = classifier::classify_value(&value);
        Self {
            at: CellRef::new(row, col),
            value,
            data_type,
        }
    }

    pub fn row(&self) -> u32 {
        self.at.row
    }

    pub fn col(&self) -> u32 {
        self.at.col
    }

    pub fn address(&self) -> String {
        self.at.to_excel_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.data_type == DataType::Empty
    }
}

/// Rectangular, fully populated grid of cells in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    columns: Vec<String>,
    rows: u32,
    cols: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid whose columns are named `A`, `B`, ...
    pub fn from_rows<R, V>(rows: R) -> Result<Self>
    where
        R: IntoIterator<Item = Vec<V>>,
        V: Into<CellValue>,
    {
        let rows: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let columns = (0..width as u32).map(col_to_letter).collect();
        Self::build(columns, rows)
    }

    /// Build a grid with caller-supplied column names. Short rows are padded.
    pub fn with_columns<R, V>(columns: Vec<String>, rows: R) -> Result<Self>
    where
        R: IntoIterator<Item = Vec<V>>,
        V: Into<CellValue>,
    {
        let rows: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self::build(columns, rows)
    }

    fn build(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(SheetwiseError::invalid_input("grid has zero rows"));
        }
        if columns.is_empty() {
            return Err(SheetwiseError::invalid_input("grid has zero columns"));
        }

        let width = columns.len();
        let mut cells = Vec::with_capacity(rows.len() * width);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(SheetwiseError::invalid_input(format!(
                    "row {} has {} cells but the grid declares {} columns",
                    r + 1,
                    row.len(),
                    width
                )));
            }
            let padding = width - row.len();
            let values = row
                .into_iter()
                .chain(std::iter::repeat_n(CellValue::Empty, padding));
            for (c, value) in values.enumerate() {
                cells.push(Cell::new(r as u32, c as u32, value));
            }
        }

        Ok(Self {
            rows: (cells.len() / width) as u32,
            cols: width as u32,
            columns,
            cells,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// (rows, cols)
    pub fn shape(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Get a cell at the given position
    pub fn get(&self, row: u32, col: u32) -> Option<&Cell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get((row * self.cols + col) as usize)
    }

    pub fn is_empty_at(&self, row: u32, col: u32) -> bool {
        self.get(row, col).is_none_or(Cell::is_empty)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn row_cells(&self, row: u32) -> &[Cell] {
        if row >= self.rows {
            return &[];
        }
        let start = (row * self.cols) as usize;
        &self.cells[start..start + self.cols as usize]
    }

    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn empty_count(&self) -> usize {
        self.total_cells() - self.non_empty_count()
    }

    /// Percentage of empty cells over the whole grid
    pub fn sparsity_percentage(&self) -> f64 {
        self.empty_count() as f64 / self.total_cells() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(27), "AB");
        assert_eq!(col_to_letter(701), "ZZ");
        assert_eq!(col_to_letter(702), "AAA");

        for col in [0, 1, 25, 26, 51, 52, 701, 702, 16383] {
            assert_eq!(letter_to_col(&col_to_letter(col)), Some(col));
        }
        assert_eq!(letter_to_col(""), None);
        assert_eq!(letter_to_col("A1"), None);
    }

    #[test]
    fn test_cell_ref_parse() {
        assert_eq!(CellRef::parse("A1"), Some(CellRef::new(0, 0)));
        assert_eq!(CellRef::parse("AA12"), Some(CellRef::new(11, 26)));
        assert_eq!(CellRef::parse("$B$3"), Some(CellRef::new(2, 1)));
        assert_eq!(CellRef::parse("A0"), None);
        assert_eq!(CellRef::parse("12"), None);
        assert_eq!(CellRef::parse("A"), None);
        assert_eq!(CellRef::new(11, 26).to_string(), "AA12");
    }

    #[test]
    fn test_cell_ref_ordering_is_row_major() {
        let mut refs = vec![CellRef::new(1, 0), CellRef::new(0, 5), CellRef::new(0, 1)];
        refs.sort();
        assert_eq!(
            refs,
            vec![CellRef::new(0, 1), CellRef::new(0, 5), CellRef::new(1, 0)]
        );
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(CellValue::Number(100.0).as_text(), "100");
        assert_eq!(CellValue::Number(-3.5).as_text(), "-3.5");
        assert_eq!(CellValue::Number(f64::NAN).as_text(), "");
        assert!(CellValue::Number(f64::NAN).is_empty());
        assert_eq!(CellValue::Boolean(true).as_text(), "TRUE");
    }

    #[test]
    fn test_grid_padding_and_addresses() {
        let grid = Grid::from_rows(vec![
            vec![CellValue::from("Header1"), CellValue::from("Header2")],
            vec![CellValue::from("Data1")],
        ])
        .unwrap();

        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid.columns(), ["A", "B"]);
        assert_eq!(grid.get(0, 0).unwrap().address(), "A1");
        assert_eq!(grid.get(1, 1).unwrap().value, CellValue::Empty);
        assert_eq!(grid.get(1, 1).unwrap().data_type, DataType::Empty);
        assert!(grid.get(2, 0).is_none());
        assert_eq!(grid.non_empty_count(), 3);
        assert_eq!(grid.sparsity_percentage(), 25.0);
    }

    #[test]
    fn test_invalid_shapes() {
        let no_rows: Vec<Vec<CellValue>> = Vec::new();
        assert!(matches!(
            Grid::from_rows(no_rows),
            Err(SheetwiseError::InvalidInput(_))
        ));

        let no_cols: Vec<Vec<CellValue>> = vec![Vec::new(), Vec::new()];
        assert!(matches!(
            Grid::from_rows(no_cols),
            Err(SheetwiseError::InvalidInput(_))
        ));

        let too_wide = Grid::with_columns(
            vec!["only".to_string()],
            vec![vec![CellValue::from(1i64), CellValue::from(2i64)]],
        );
        assert!(matches!(too_wide, Err(SheetwiseError::InvalidInput(_))));
    }
}
