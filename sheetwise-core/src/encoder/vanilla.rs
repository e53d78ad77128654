use super::Encoder;
use crate::error::Result;
use crate::grid::{Cell, Grid};

/// Every cell as `ADDR,value`, cells joined by `|`, one line per row
#[derive(Debug, Clone, Copy, Default)]
pub struct VanillaEncoder {
    /// Append the classified type after each non-empty value
    pub include_format: bool,
}

impl VanillaEncoder {
    pub fn new(include_format: bool) -> Self {
        Self { include_format }
    }

    fn encode_cell(&self, cell: &Cell) -> String {
        let address = cell.address();
        if cell.is_empty() {
            format!("{address}, ")
        } else if self.include_format {
            format!("{address},{},{}", cell.value.as_text(), cell.data_type)
        } else {
            format!("{address},{}", cell.value.as_text())
        }
    }
}

impl Encoder for VanillaEncoder {
    type Input = Grid;

    fn encode(&self, grid: &Grid) -> Result<String> {
        let lines: Vec<String> = (0..grid.rows())
            .map(|row| {
                grid.row_cells(row)
                    .iter()
                    .map(|cell| self.encode_cell(cell))
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect();
        Ok(lines.join("\n"))
    }

    /// One token per cell
    fn estimate_tokens(&self, encoded: &str) -> usize {
        if encoded.is_empty() {
            return 0;
        }
        encoded.split(['|', '\n']).count()
    }
}
