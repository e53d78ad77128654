use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheetwise_core::{
    CompressionConfig, Encoding, LlmProvider, SharedSink, SheetwiseConfig, SpreadsheetLlm,
    TracingSink, reader,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetwise")]
#[command(about = "Compress spreadsheets into compact encodings for language models")]
#[command(long_about = None)]
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

    /// Layout used by `--format llm`
    #[arg(short, long, value_enum, default_value = "general")]
    provider: Provider,

    /// Anchor distance, overrides the configuration file
    #[arg(short, value_name = "K")]
    k: Option<u32>,

    /// Only process this sheet
    #[arg(short, long, value_name = "SHEET")]
    sheet: Option<String>,

    /// Pick compression settings from each sheet's shape
    #[arg(long)]
    auto: bool,

    /// Append cell types to vanilla output
    #[arg(long)]
    include_format: bool,

    /// Log pipeline progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored summary
    Human,
    /// Every cell as ADDR,value
    Vanilla,
    /// Plain JSON of the grid
    Json,
    /// Compressed text for a language model
    Llm,
    /// Full compressed structure as JSON
    Repr,
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    General,
    Chatgpt,
    Claude,
    Gemini,
}

impl From<Provider> for LlmProvider {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::General => LlmProvider::General,
            Provider::Chatgpt => LlmProvider::ChatGpt,
            Provider::Claude => LlmProvider::Claude,
            Provider::Gemini => LlmProvider::Gemini,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<SheetwiseConfig> {
    if let Some(config_path) = &cli.config {
        return SheetwiseConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    // Try to load default config from current directory if it exists
    let default_config_path = PathBuf::from("sheetwise.toml");
    if default_config_path.exists() {
        SheetwiseConfig::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(SheetwiseConfig::default())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = load_config(&cli)?;
    let sink: SharedSink = Arc::new(TracingSink);

    let mut sheets = reader::read_workbook(&cli.file)
        .with_context(|| format!("Failed to read file: {}", cli.file.display()))?;
    if let Some(name) = &cli.sheet {
        sheets.retain(|sheet| &sheet.name == name);
        anyhow::ensure!(!sheets.is_empty(), "No sheet named '{name}' with data");
    }
    anyhow::ensure!(!sheets.is_empty(), "{} has no data", cli.file.display());
    tracing::info!(sheets = sheets.len(), file = %cli.file.display(), "workbook loaded");

    let multiple = sheets.len() > 1;
    let mut compressed_sheets = Vec::new();

    for sheet in &sheets {
        let mut config: CompressionConfig = file_config.for_sheet(&sheet.name);
        if let Some(k) = cli.k {
            config.k = k;
        }
        let mut sllm = SpreadsheetLlm::with_config(config)
            .with_context(|| format!("Invalid configuration for sheet '{}'", sheet.name))?
            .with_sink(sink.clone());
        if cli.auto {
            let tuned = sllm.auto_configure(&sheet.grid);
            sllm = SpreadsheetLlm::with_config(tuned)?.with_sink(sink.clone());
        }

        let encoding = match cli.format {
            OutputFormat::Vanilla => Some(Encoding::Vanilla {
                include_format: cli.include_format,
            }),
            OutputFormat::Json => Some(Encoding::Json),
            OutputFormat::Llm => Some(Encoding::Compressed(cli.provider.into())),
            OutputFormat::Human | OutputFormat::Repr => None,
        };

        match encoding {
            Some(encoding) => {
                let text = sllm
                    .encode(&sheet.grid, encoding)
                    .with_context(|| format!("Failed to encode sheet '{}'", sheet.name))?;
                if multiple {
                    println!("=== {} ===", sheet.name);
                }
                println!("{text}");
            }
            None => {
                let compressed = sllm
                    .compress_spreadsheet(&sheet.grid)
                    .with_context(|| format!("Failed to compress sheet '{}'", sheet.name))?;
                compressed_sheets.push((sheet.name.clone(), compressed));
            }
        }
    }

    match cli.format {
        OutputFormat::Human => formatter::print_human(&cli.file, &compressed_sheets),
        OutputFormat::Repr => formatter::print_json(&cli.file, &compressed_sheets)?,
        _ => {}
    }

    Ok(())
}
