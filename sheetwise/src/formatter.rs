//! Output formatters for compressed sheets

use anyhow::Result;
use colored::*;
use sheetwise_core::{AddressRange, CompressedRepresentation, CompressionStep};
use std::path::Path;

/// Value groups shown per sheet in human output
const MAX_VALUES_SHOWN: usize = 10;

fn join_ranges(ranges: &[AddressRange]) -> String {
    ranges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print a colored summary of every compressed sheet
pub fn print_human(file_path: &Path, sheets: &[(String, CompressedRepresentation)]) {
    println!("{}", format!("Compressing: {}", file_path.display()).bold());
    println!();

    for (name, compressed) in sheets {
        let stats = &compressed.stats;
        let (rows, cols) = compressed.original_shape;
        let (kept_rows, kept_cols) = compressed.compressed_shape;

        println!("{} {}", "Sheet:".bold(), name.cyan().bold());
        println!("  {} {rows}x{cols} -> {kept_rows}x{kept_cols}", "Shape:".bold());
        println!(
            "  {} {} total, {} non-empty, {:.1}% sparse",
            "Cells:".bold(),
            stats.original_cells,
            stats.non_empty_cells,
            stats.sparsity_percentage
        );
        println!(
            "  {} {}",
            "Compression:".bold(),
            format!("{:.2}x", stats.compression_ratio).green().bold()
        );
        println!(
            "  {} {:.2}x",
            "Token reduction:".bold(),
            stats.token_reduction_ratio
        );

        if !compressed.regions.is_empty() {
            println!("  {}", "Tables:".bold().underline());
            for region in &compressed.regions {
                let header = if region.region.has_header {
                    " (header)".bright_black().to_string()
                } else {
                    String::new()
                };
                println!(
                    "    {} {}{}  {} kept, {} pruned",
                    region.region.to_string().yellow(),
                    region.region.table_type.as_str(),
                    header,
                    region.pruned.retained_cell_count(),
                    region.pruned.pruned_cell_count()
                );
            }
        }

        println!("  {}", "Steps:".bold().underline());
        for step in &compressed.steps {
            println!("    {}", describe_step(step));
        }

        if !compressed.value_groups.is_empty() {
            println!("  {}", "Values:".bold().underline());
            for (value, ranges) in compressed.value_groups.iter().take(MAX_VALUES_SHOWN) {
                println!("    {} {}", format!("{value:?}").blue(), join_ranges(ranges));
            }
            let hidden = compressed.value_groups.len().saturating_sub(MAX_VALUES_SHOWN);
            if hidden > 0 {
                println!("    {}", format!("... {hidden} more").bright_black());
            }
        }

        if !compressed.format_groups.is_empty() {
            println!("  {}", "Formats:".bold().underline());
            for (data_type, ranges) in &compressed.format_groups {
                println!("    {} {}", data_type.as_str().magenta(), join_ranges(ranges));
            }
        }
        println!();
    }
}

fn describe_step(step: &CompressionStep) -> String {
    match step {
        CompressionStep::TableDetection { regions } => {
            format!("table detection: {regions} region(s)")
        }
        CompressionStep::StructuralExtraction {
            anchor_rows,
            anchor_cols,
            retained_cells,
            pruned_cells,
        } => format!(
            "structural extraction: {anchor_rows} anchor rows, {anchor_cols} anchor columns, \
             {retained_cells} kept, {pruned_cells} pruned"
        ),
        CompressionStep::InvertedIndexTranslation { values, entries } => {
            format!("inverted index: {values} values over {entries} entries")
        }
        CompressionStep::FormatAggregation { types, entries } => {
            format!("format aggregation: {types} types over {entries} entries")
        }
    }
}

/// Print compressed sheets in JSON format
pub fn print_json(file_path: &Path, sheets: &[(String, CompressedRepresentation)]) -> Result<()> {
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "sheets": sheets
            .iter()
            .map(|(name, compressed)| serde_json::json!({
                "name": name,
                "compressed": compressed,
            }))
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
