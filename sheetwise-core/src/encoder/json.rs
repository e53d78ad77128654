use super::Encoder;
use crate::error::Result;
use crate::grid::{CellValue, Grid};
use serde_json::{Value, json};

/// `{columns, data, dimensions}` JSON, one array per row
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

fn cell_json(value: &CellValue) -> Value {
    match value {
        _ if value.is_empty() => Value::String(String::new()),
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Value::from(*n as i64),
        CellValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.as_text())),
        CellValue::Boolean(b) => Value::Bool(*b),
        CellValue::Text(s) => Value::String(s.clone()),
        CellValue::Empty => Value::String(String::new()),
    }
}

impl Encoder for JsonEncoder {
    type Input = Grid;

    fn encode(&self, grid: &Grid) -> Result<String> {
        let data: Vec<Vec<Value>> = (0..grid.rows())
            .map(|row| {
                grid.row_cells(row)
                    .iter()
                    .map(|cell| cell_json(&cell.value))
                    .collect()
            })
            .collect();

        let output = json!({
            "columns": grid.columns(),
            "data": data,
            "dimensions": {
                "rows": grid.rows(),
                "columns": grid.cols(),
            }
        });
        Ok(serde_json::to_string_pretty(&output)?)
    }

    /// Structural characters (quotes twice) plus content words
    fn estimate_tokens(&self, encoded: &str) -> usize {
        let structural: usize = encoded
            .chars()
            .map(|ch| match ch {
                '{' | '}' | '[' | ']' | ':' | ',' => 1,
                '"' => 2,
                _ => 0,
            })
            .sum();
        let content = encoded
            .split(|ch: char| ch.is_whitespace() || "{}[]\":,".contains(ch))
            .filter(|word| !word.is_empty())
            .count();
        structural + content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_rendering() {
        assert_eq!(cell_json(&CellValue::Number(100.0)), json!(100));
        assert_eq!(cell_json(&CellValue::Number(2.5)), json!(2.5));
        assert_eq!(cell_json(&CellValue::Number(f64::NAN)), json!(""));
        assert_eq!(cell_json(&CellValue::Boolean(true)), json!(true));
    }

    #[test]
    fn test_encode_shape() {
        let grid = Grid::with_columns(
            vec!["id".into(), "label".into()],
            vec![
                vec![CellValue::from(1i64), CellValue::from("one")],
                vec![CellValue::from(2i64)],
            ],
        )
        .unwrap();
        let encoded = JsonEncoder.encode(&grid).unwrap();
        let parsed: Value = serde_json::from_str(&encoded).unwrap();

        assert_eq!(parsed["columns"], json!(["id", "label"]));
        assert_eq!(parsed["data"], json!([[1, "one"], [2, ""]]));
        assert_eq!(parsed["dimensions"], json!({"rows": 2, "columns": 2}));
    }

    #[test]
    fn test_estimate_tokens() {
        // 2 braces, 1 colon, 2 quotes (x2) and 2 content words
        assert_eq!(JsonEncoder.estimate_tokens(r#"{"a": 1}"#), 9);
    }
}
