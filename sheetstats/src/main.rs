use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use sheetwise_core::{EncodingStats, NamedSheet, SheetwiseConfig, SpreadsheetLlm, reader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetstats")]
#[command(about = "Encoding statistics for spreadsheet compression")]
#[command(version)]
struct Cli {
    /// Path to the Excel/ODS/CSV file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Use settings picked from each sheet's shape
    #[arg(long)]
    auto: bool,

    /// Log pipeline progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[derive(Serialize)]
struct FileStats {
    total_sheets: usize,
    total_file_size: u64,
    total_cells: usize,
    total_non_empty_cells: usize,
    sheets: Vec<SheetStats>,
}

#[derive(Serialize)]
struct SheetStats {
    sheet_name: String,
    /// Share of the workbook's non-empty cells
    percentage: f64,
    #[serde(flatten)]
    encoding: EncodingStats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = match &cli.config {
        Some(path) => SheetwiseConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SheetwiseConfig::default(),
    };

    // Read workbook
    let sheets = reader::read_workbook(&cli.file)
        .with_context(|| format!("Failed to read file: {}", cli.file.display()))?;

    // Get file size
    let total_file_size = std::fs::metadata(&cli.file)
        .with_context(|| "Failed to get file size")?
        .len();

    let sheet_stats = calculate_sheet_stats(&sheets, &config, cli.auto)?;

    let stats = FileStats {
        total_sheets: sheets.len(),
        total_file_size,
        total_cells: sheets.iter().map(|s| s.grid.total_cells()).sum(),
        total_non_empty_cells: sheet_stats.iter().map(|s| s.encoding.non_empty_cells).sum(),
        sheets: sheet_stats,
    };

    // Output results
    match cli.format {
        OutputFormat::Human => print_human(&stats),
        OutputFormat::Json => print_json(&stats)?,
    }

    Ok(())
}

fn calculate_sheet_stats(
    sheets: &[NamedSheet],
    config: &SheetwiseConfig,
    auto: bool,
) -> Result<Vec<SheetStats>> {
    let mut encodings = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let mut sllm = SpreadsheetLlm::with_config(config.for_sheet(&sheet.name))
            .with_context(|| format!("Invalid configuration for sheet '{}'", sheet.name))?;
        if auto {
            sllm = SpreadsheetLlm::with_config(sllm.auto_configure(&sheet.grid))?;
        }
        let encoding = sllm
            .encoding_stats(&sheet.grid)
            .with_context(|| format!("Failed to encode sheet '{}'", sheet.name))?;
        tracing::debug!(sheet = %sheet.name, ratio = encoding.compression_ratio, "sheet measured");
        encodings.push((sheet.name.clone(), encoding));
    }

    let total_non_empty: usize = encodings.iter().map(|(_, e)| e.non_empty_cells).sum();

    // Calculate percentages
    Ok(encodings
        .into_iter()
        .map(|(name, encoding)| SheetStats {
            sheet_name: name,
            percentage: if total_non_empty > 0 {
                (encoding.non_empty_cells as f64 / total_non_empty as f64) * 100.0
            } else {
                0.0
            },
            encoding,
        })
        .collect())
}

fn humanize_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

fn print_human(stats: &FileStats) {
    println!("File Statistics:");
    println!("  Total Sheets: {}", stats.total_sheets);
    println!(
        "  Total File Size: {}",
        humanize_size(stats.total_file_size)
    );
    println!(
        "  Cells: {} ({} non-empty)",
        stats.total_cells, stats.total_non_empty_cells
    );

    for sheet in &stats.sheets {
        let e = &sheet.encoding;
        println!("\nSheet: {} ({:.2}% of data)", sheet.sheet_name, sheet.percentage);
        println!(
            "  Shape: {}x{} -> {}x{}",
            e.original_shape.0, e.original_shape.1, e.compressed_shape.0, e.compressed_shape.1
        );
        println!("  Sparsity: {:.2}%", e.sparsity_percentage);
        println!(
            "  Tokens: {} vanilla, {} compressed ({:.2}x reduction)",
            e.vanilla_tokens_estimate, e.compressed_tokens_estimate, e.token_reduction_ratio
        );
        println!("  Compression Ratio: {:.2}x", e.compression_ratio);
    }
}

fn print_json(stats: &FileStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    println!("{}", json);
    Ok(())
}
