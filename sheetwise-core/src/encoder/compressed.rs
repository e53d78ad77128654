use super::{Encoder, count_words_and_punctuation};
use crate::compress::{AddressRange, CompressedRepresentation};
use crate::error::{Result, SheetwiseError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Layout flavour of the compressed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    General,
    ChatGpt,
    Claude,
    Gemini,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 4] = [
        LlmProvider::General,
        LlmProvider::ChatGpt,
        LlmProvider::Claude,
        LlmProvider::Gemini,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::General => "general",
            LlmProvider::ChatGpt => "chatgpt",
            LlmProvider::Claude => "claude",
            LlmProvider::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = SheetwiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(LlmProvider::General),
            "chatgpt" | "gpt" | "openai" => Ok(LlmProvider::ChatGpt),
            "claude" | "anthropic" => Ok(LlmProvider::Claude),
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            other => Err(SheetwiseError::unsupported_configuration(format!(
                "unknown LLM provider '{other}'"
            ))),
        }
    }
}

/// Renders a [`CompressedRepresentation`] for one provider
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressedEncoder {
    pub provider: LlmProvider,
}

impl CompressedEncoder {
    pub fn new(provider: LlmProvider) -> Self {
        Self { provider }
    }
}

impl Encoder for CompressedEncoder {
    type Input = CompressedRepresentation;

    fn encode(&self, repr: &CompressedRepresentation) -> Result<String> {
        let lines = match self.provider {
            LlmProvider::General => general(repr),
            LlmProvider::ChatGpt => chatgpt(repr),
            LlmProvider::Claude => claude(repr),
            LlmProvider::Gemini => gemini(repr),
        };
        Ok(lines.join("\n"))
    }

    fn estimate_tokens(&self, encoded: &str) -> usize {
        count_words_and_punctuation(encoded)
    }
}

fn join_ranges(ranges: &[AddressRange]) -> String {
    ranges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn shape(repr: &CompressedRepresentation) -> String {
    let (rows, cols) = repr.original_shape;
    let (kept_rows, kept_cols) = repr.compressed_shape;
    format!("{rows}x{cols} -> {kept_rows}x{kept_cols}")
}

/// Retained cells of regions that skipped translation
fn untranslated(repr: &CompressedRepresentation) -> impl Iterator<Item = (String, &str)> {
    repr.regions
        .iter()
        .flat_map(|r| r.untranslated.iter())
        .map(|(at, value)| (at.to_string(), value.as_str()))
}

fn general(repr: &CompressedRepresentation) -> Vec<String> {
    let mut lines = vec![
        format!(
            "# Spreadsheet Data (Compressed {:.1}x)",
            repr.stats.compression_ratio
        ),
        format!("Shape: {}", shape(repr)),
    ];
    let tables: Vec<String> = repr
        .regions
        .iter()
        .map(|r| format!("{} {}", r.region, r.region.table_type.as_str()))
        .collect();
    if !tables.is_empty() {
        lines.push(format!("Tables: {}", tables.join(", ")));
    }

    if !repr.value_groups.is_empty() {
        lines.push(String::new());
        lines.push("## Values".to_string());
        for (value, ranges) in &repr.value_groups {
            lines.push(format!("{value}: {}", join_ranges(ranges)));
        }
    }

    let cells: Vec<String> = untranslated(repr)
        .map(|(address, value)| format!("{address},{value}"))
        .collect();
    if !cells.is_empty() {
        lines.push(String::new());
        lines.push("## Cells".to_string());
        lines.push(cells.join("|"));
    }

    if !repr.format_groups.is_empty() {
        lines.push(String::new());
        lines.push("## Formats".to_string());
        for (data_type, ranges) in &repr.format_groups {
            lines.push(format!("{data_type}: {}", join_ranges(ranges)));
        }
    }
    lines
}

fn chatgpt(repr: &CompressedRepresentation) -> Vec<String> {
    let (rows, cols) = repr.original_shape;
    let mut lines = vec![
        format!(
            "Spreadsheet Data (compressed {:.1}x)",
            repr.stats.compression_ratio
        ),
        format!(
            "Dimensions: {rows} rows x {cols} columns, {} non-empty cells",
            repr.stats.non_empty_cells
        ),
    ];
    if !repr.regions.is_empty() {
        let tables: Vec<String> = repr
            .regions
            .iter()
            .map(|r| format!("{} ({})", r.region, r.region.table_type.as_str()))
            .collect();
        lines.push(format!("Tables: {}", tables.join(", ")));
    }

    lines.push(String::new());
    lines.push("Key-Value Mappings:".to_string());
    for (value, ranges) in &repr.value_groups {
        lines.push(format!("{value:?} -> {}", join_ranges(ranges)));
    }
    for (address, value) in untranslated(repr) {
        lines.push(format!("{value:?} -> {address}"));
    }

    if !repr.format_groups.is_empty() {
        lines.push(String::new());
        lines.push("Format Groups:".to_string());
        for (data_type, ranges) in &repr.format_groups {
            lines.push(format!("{data_type} -> {}", join_ranges(ranges)));
        }
    }
    lines
}

fn claude(repr: &CompressedRepresentation) -> Vec<String> {
    let (rows, cols) = repr.original_shape;
    let (kept_rows, kept_cols) = repr.compressed_shape;
    let mut lines = vec![
        "# Spreadsheet Data".to_string(),
        String::new(),
        "## Summary".to_string(),
        format!("- Original shape: {rows} rows x {cols} columns"),
        format!("- Compressed shape: {kept_rows} rows x {kept_cols} columns"),
        format!("- Compression ratio: {:.1}x", repr.stats.compression_ratio),
        format!("- Sparsity: {:.1}%", repr.stats.sparsity_percentage),
        format!("- Tables: {}", repr.regions.len()),
    ];

    if !repr.regions.is_empty() {
        lines.push(String::new());
        lines.push("## Tables".to_string());
        for r in &repr.regions {
            let header = if r.region.has_header {
                " with header"
            } else {
                ""
            };
            lines.push(format!(
                "- {}: {}{header}",
                r.region,
                r.region.table_type.as_str()
            ));
        }
    }

    let cells: Vec<(String, &str)> = untranslated(repr).collect();
    if !repr.value_groups.is_empty() || !cells.is_empty() {
        lines.push(String::new());
        lines.push("## Values".to_string());
        for (value, ranges) in &repr.value_groups {
            lines.push(format!("- `{value}`: {}", join_ranges(ranges)));
        }
        for (address, value) in cells {
            lines.push(format!("- {address}: `{value}`"));
        }
    }

    if !repr.format_groups.is_empty() {
        lines.push(String::new());
        lines.push("## Formats".to_string());
        for (data_type, ranges) in &repr.format_groups {
            lines.push(format!("- {data_type}: {}", join_ranges(ranges)));
        }
    }
    lines
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn gemini(repr: &CompressedRepresentation) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Spreadsheet Data (compressed {:.1}x, {})",
            repr.stats.compression_ratio,
            shape(repr)
        ),
        String::new(),
        "| Table | Type | Header |".to_string(),
        "|---|---|---|".to_string(),
    ];
    for r in &repr.regions {
        let header = if r.region.has_header { "yes" } else { "no" };
        lines.push(format!(
            "| {} | {} | {header} |",
            r.region,
            r.region.table_type.as_str()
        ));
    }

    lines.push(String::new());
    lines.push("| Value | Cells |".to_string());
    lines.push("|---|---|".to_string());
    for (value, ranges) in &repr.value_groups {
        lines.push(format!(
            "| {} | {} |",
            escape_cell(value),
            join_ranges(ranges)
        ));
    }
    for (address, value) in untranslated(repr) {
        lines.push(format!("| {} | {address} |", escape_cell(value)));
    }

    if !repr.format_groups.is_empty() {
        lines.push(String::new());
        lines.push("| Type | Cells |".to_string());
        lines.push("|---|---|".to_string());
        for (data_type, ranges) in &repr.format_groups {
            lines.push(format!("| {data_type} | {} |", join_ranges(ranges)));
        }
    }
    lines
}
