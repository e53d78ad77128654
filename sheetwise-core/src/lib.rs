//! sheetwise-core: structural compression of spreadsheets for language models
//!
//! A sheet is loaded into a dense [`Grid`], split into table regions, pruned
//! around structural anchors, and summarised as value and type groups over
//! merged address ranges. Encoders turn the grid or its compressed form into text.

pub mod compress;
pub mod config;
pub mod encoder;
pub mod error;
pub mod grid;
pub mod observe;
pub mod reader;

use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub use compress::{
    AddressRange, CompressedRegion, CompressedRepresentation, CompressionStats, CompressionStep,
    DataType, SheetCompressor, TableRegion, TableType,
};
pub use config::{CompressionConfig, DEFAULT_K, SheetwiseConfig};
pub use encoder::{CompressedEncoder, Encoder, Encoding, JsonEncoder, LlmProvider, VanillaEncoder};
pub use error::{Result, SheetwiseError};
pub use grid::{Cell, CellRef, CellValue, Grid};
pub use observe::{EventSink, PipelineEvent, SharedSink, TracingSink};
pub use reader::NamedSheet;

/// Size and token figures for one grid, plain and compressed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingStats {
    pub original_shape: (u32, u32),
    pub compressed_shape: (u32, u32),
    pub vanilla_tokens_estimate: usize,
    pub compressed_tokens_estimate: usize,
    pub compression_ratio: f64,
    /// Vanilla token estimate over compressed token estimate
    pub token_reduction_ratio: f64,
    pub sparsity_percentage: f64,
    pub non_empty_cells: usize,
}

/// Main entry point: compression plus every encoding
pub struct SpreadsheetLlm {
    config: CompressionConfig,
    sink: Option<SharedSink>,
    vanilla: VanillaEncoder,
    json: JsonEncoder,
}

impl SpreadsheetLlm {
    /// Create with default configuration
    pub fn new() -> Self {
        Self {
            config: CompressionConfig::default(),
            sink: None,
            vanilla: VanillaEncoder::default(),
            json: JsonEncoder,
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Attach an event sink; results are identical with or without one
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    fn compressor(&self, config: CompressionConfig) -> Result<SheetCompressor> {
        Ok(SheetCompressor::new(config)?.with_sink(self.sink.clone()))
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(sink) = &self.sink {
            sink.log(&event);
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Grid> {
        reader::load_from_file(path)
    }

    pub fn compress_spreadsheet(&self, grid: &Grid) -> Result<CompressedRepresentation> {
        Ok(self.compressor(self.config.clone())?.compress(grid))
    }

    pub fn encode_vanilla(&self, grid: &Grid) -> Result<String> {
        self.vanilla.encode(grid)
    }

    pub fn encode_json(&self, grid: &Grid) -> Result<String> {
        self.json.encode(grid)
    }

    pub fn encode_compressed_for_llm(
        &self,
        compressed: &CompressedRepresentation,
    ) -> Result<String> {
        self.encode_for_llm_provider(compressed, LlmProvider::General)
    }

    pub fn encode_for_llm_provider(
        &self,
        compressed: &CompressedRepresentation,
        provider: LlmProvider,
    ) -> Result<String> {
        CompressedEncoder::new(provider).encode(compressed)
    }

    pub fn compress_and_encode_for_llm(&self, grid: &Grid) -> Result<String> {
        let compressed = self.compress_spreadsheet(grid)?;
        self.encode_compressed_for_llm(&compressed)
    }

    /// Render a grid in any supported encoding
    pub fn encode(&self, grid: &Grid, encoding: Encoding) -> Result<String> {
        match encoding {
            Encoding::Vanilla { include_format } => {
                VanillaEncoder::new(include_format).encode(grid)
            }
            Encoding::Json => self.encode_json(grid),
            Encoding::Compressed(provider) => {
                let compressed = self.compress_spreadsheet(grid)?;
                self.encode_for_llm_provider(&compressed, provider)
            }
        }
    }

    pub fn encoding_stats(&self, grid: &Grid) -> Result<EncodingStats> {
        let compressed = self.compress_spreadsheet(grid)?;
        let vanilla_text = self.encode_vanilla(grid)?;
        let compressed_encoder = CompressedEncoder::default();
        let compressed_text = compressed_encoder.encode(&compressed)?;

        let vanilla_tokens = self.vanilla.estimate_tokens(&vanilla_text);
        let compressed_tokens = compressed_encoder.estimate_tokens(&compressed_text);

        Ok(EncodingStats {
            original_shape: compressed.original_shape,
            compressed_shape: compressed.compressed_shape,
            vanilla_tokens_estimate: vanilla_tokens,
            compressed_tokens_estimate: compressed_tokens,
            compression_ratio: compressed.stats.compression_ratio,
            token_reduction_ratio: vanilla_tokens as f64 / compressed_tokens.max(1) as f64,
            sparsity_percentage: compressed.stats.sparsity_percentage,
            non_empty_cells: compressed.stats.non_empty_cells,
        })
    }

    /// Pick settings from the grid's shape: sparser sheets get a tighter `k`,
    /// tiny sheets skip pruning, near-unique values skip translation.
    /// A stage already disabled in the current config stays disabled.
    pub fn auto_configure(&self, grid: &Grid) -> CompressionConfig {
        let sparsity = grid.sparsity_percentage();
        let mut config = self.config.clone();

        config.k = match sparsity {
            s if s >= 90.0 => 1,
            s if s >= 70.0 => 2,
            s if s >= 50.0 => 3,
            _ => DEFAULT_K,
        }
        .min(5);

        config.use_extraction &= grid.total_cells() >= 100 && grid.rows() >= 10;

        let non_empty: Vec<&Cell> = grid.cells().filter(|c| !c.is_empty()).collect();
        let distinct: HashSet<String> = non_empty
            .iter()
            .map(|c| compress::translator::normalize_value(c))
            .collect();
        config.use_translation &=
            non_empty.len() < 10 || (distinct.len() as f64) < 0.9 * non_empty.len() as f64;

        self.emit(PipelineEvent::AutoConfigured {
            sparsity_percentage: sparsity,
            config: config.clone(),
        });
        config
    }

    /// Compress with [`Self::auto_configure`] settings and encode for the general provider
    pub fn compress_with_auto_config(&self, grid: &Grid) -> Result<String> {
        let config = self.auto_configure(grid);
        let compressed = self.compressor(config)?.compress(grid);
        self.encode_compressed_for_llm(&compressed)
    }
}

impl Default for SpreadsheetLlm {
    fn default() -> Self {
        Self::new()
    }
}
