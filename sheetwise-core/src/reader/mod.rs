//! Workbook and CSV loading into grids

use crate::error::{Result, SheetwiseError};
use crate::grid::{CellValue, Grid};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One non-empty sheet of a workbook
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSheet {
    pub name: String,
    pub grid: Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Workbook,
    Csv,
}

fn file_kind(path: &Path) -> Result<FileKind> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(FileKind::Workbook),
        "csv" => Ok(FileKind::Csv),
        _ => Err(SheetwiseError::UnsupportedFormat {
            extension: if extension.is_empty() {
                path.display().to_string()
            } else {
                format!(".{extension}")
            },
        }),
    }
}

/// Load the first non-empty sheet of a file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    read_workbook(path)?
        .into_iter()
        .next()
        .map(|sheet| sheet.grid)
        .ok_or_else(|| {
            SheetwiseError::invalid_input(format!("{} has no data", path.display()))
        })
}

/// Read every non-empty sheet; a CSV file is a single sheet named after the file
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Vec<NamedSheet>> {
    let path = path.as_ref();
    match file_kind(path)? {
        FileKind::Workbook => read_spreadsheet(path),
        FileKind::Csv => {
            let file = File::open(path).map_err(|e| SheetwiseError::io(path, e))?;
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Sheet1")
                .to_string();
            match parse_csv(file)? {
                Some(grid) => Ok(vec![NamedSheet { name, grid }]),
                None => {
                    tracing::debug!(path = %path.display(), "skipping CSV without data rows");
                    Ok(Vec::new())
                }
            }
        }
    }
}

/// Parse CSV data; the first record names the columns
pub fn read_csv<R: Read>(reader: R) -> Result<Grid> {
    parse_csv(reader)?
        .ok_or_else(|| SheetwiseError::invalid_input("CSV data has no rows below the header"))
}

/// `None` when there are no records below the header
fn parse_csv<R: Read>(reader: R) -> Result<Option<Grid>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let columns: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::from).collect::<Vec<_>>());
    }
    if rows.is_empty() {
        return Ok(None);
    }
    Grid::with_columns(columns, rows).map(Some)
}

fn read_spreadsheet(path: &Path) -> Result<Vec<NamedSheet>> {
    let mut excel: Sheets<_> = open_workbook_auto(path)?;
    let mut sheets = Vec::new();

    for name in excel.sheet_names() {
        let range = excel.worksheet_range(&name)?;
        match range_to_grid(&range) {
            Some(grid) => sheets.push(NamedSheet { name, grid }),
            None => tracing::debug!(sheet = %name, "skipping empty sheet"),
        }
    }
    Ok(sheets)
}

/// Dense grid anchored at `A1` so addresses match the sheet
fn range_to_grid(range: &Range<Data>) -> Option<Grid> {
    if range.is_empty() {
        return None;
    }
    let (max_row, max_col) = range.end()?;
    let rows: Vec<Vec<CellValue>> = (0..=max_row)
        .map(|row| {
            (0..=max_col)
                .map(|col| {
                    range
                        .get_value((row, col))
                        .map(parse_cell_value)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    let grid = Grid::from_rows(rows).ok()?;
    (grid.non_empty_count() > 0).then_some(grid)
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind() {
        assert_eq!(file_kind(Path::new("a.XLSX")).unwrap(), FileKind::Workbook);
        assert_eq!(file_kind(Path::new("a.ods")).unwrap(), FileKind::Workbook);
        assert_eq!(file_kind(Path::new("a.csv")).unwrap(), FileKind::Csv);
        let err = file_kind(Path::new("test.txt")).unwrap_err();
        assert!(err.to_string().starts_with("Unsupported file format"));
        assert!(file_kind(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_read_csv() {
        let data = "name,qty\nbolt,10\nnut,\n";
        let grid = read_csv(data.as_bytes()).unwrap();
        assert_eq!(grid.columns(), &["name".to_string(), "qty".to_string()]);
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid.get(0, 1).unwrap().value.as_text(), "10");
        assert!(grid.get(1, 1).unwrap().is_empty());
    }

    #[test]
    fn test_header_only_csv_is_invalid() {
        assert!(matches!(
            read_csv("a,b\n".as_bytes()),
            Err(SheetwiseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_record_wider_than_header_is_an_error() {
        let err = read_csv("a,b\n1,2\n3,4,5\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SheetwiseError::InvalidInput(_)));
        assert!(!err.to_string().contains("no rows"));
    }

    #[test]
    fn test_range_to_grid() {
        let mut range = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("x".into()));
        range.set_value((2, 2), Data::Int(3));
        let grid = range_to_grid(&range).unwrap();

        assert_eq!(grid.shape(), (3, 3));
        assert_eq!(grid.get(1, 1).unwrap().address(), "B2");
        assert_eq!(grid.get(2, 2).unwrap().value, CellValue::Number(3.0));
        assert!(range_to_grid(&Range::<Data>::empty()).is_none());
    }
}
