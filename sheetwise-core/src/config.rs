//! Configuration for the compression pipeline

use crate::compress::ranges::{AGGREGATION_MIN_RUN, TRANSLATION_MIN_RUN};
use crate::error::{Result, SheetwiseError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default anchor distance
pub const DEFAULT_K: u32 = 4;

/// Knobs consumed by [`crate::compress::SheetCompressor`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Anchor distance: rows/columns further than this from every anchor are pruned
    pub k: u32,
    /// Run structural anchor pruning
    pub use_extraction: bool,
    /// Run inverted-index translation
    pub use_translation: bool,
    /// Run format aggregation
    pub use_aggregation: bool,
    pub translation_min_run: usize,
    pub aggregation_min_run: usize,
    /// Empty rows/columns needed to separate two tables
    pub min_gap: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            use_extraction: true,
            use_translation: true,
            use_aggregation: true,
            translation_min_run: TRANSLATION_MIN_RUN,
            aggregation_min_run: AGGREGATION_MIN_RUN,
            min_gap: 1,
        }
    }
}

impl CompressionConfig {
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(SheetwiseError::unsupported_configuration(
                "k must be greater than zero",
            ));
        }
        if self.min_gap == 0 {
            return Err(SheetwiseError::unsupported_configuration(
                "min_gap must be greater than zero",
            ));
        }
        for (name, value) in [
            ("translation_min_run", self.translation_min_run),
            ("aggregation_min_run", self.aggregation_min_run),
        ] {
            if !(2..=3).contains(&value) {
                return Err(SheetwiseError::unsupported_configuration(format!(
                    "{name} must be 2 or 3, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// File-level configuration: global settings plus per-sheet overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetwiseConfig {
    #[serde(default)]
    pub global: CompressionConfig,
    #[serde(default)]
    pub sheets: HashMap<String, SheetOverride>,
}

/// Sheet-specific settings; unset fields fall back to the global section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetOverride {
    pub k: Option<u32>,
    pub use_extraction: Option<bool>,
    pub use_translation: Option<bool>,
    pub use_aggregation: Option<bool>,
    pub min_gap: Option<u32>,
}

impl SheetwiseConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SheetwiseError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SheetwiseConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve settings for a sheet: sheet override -> global
    pub fn for_sheet(&self, sheet_name: &str) -> CompressionConfig {
        let mut config = self.global.clone();
        if let Some(sheet) = self.sheets.get(sheet_name) {
            config.k = sheet.k.unwrap_or(config.k);
            config.use_extraction = sheet.use_extraction.unwrap_or(config.use_extraction);
            config.use_translation = sheet.use_translation.unwrap_or(config.use_translation);
            config.use_aggregation = sheet.use_aggregation.unwrap_or(config.use_aggregation);
            config.min_gap = sheet.min_gap.unwrap_or(config.min_gap);
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        self.global.validate()?;
        for name in self.sheets.keys() {
            self.for_sheet(name).validate().map_err(|e| match e {
                SheetwiseError::UnsupportedConfiguration(msg) => {
                    SheetwiseError::unsupported_configuration(format!("sheet '{name}': {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}
