//! Error types surfaced at the library boundary

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building grids, validating configuration or loading files.
///
/// Classification and grouping never fail; everything here happens at the edges.
#[derive(Error, Debug)]
pub enum SheetwiseError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("File I/O error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read workbook")]
    Workbook(#[from] calamine::Error),

    #[error("Failed to read CSV data")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse configuration")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON encoding failed")]
    Json(#[from] serde_json::Error),
}

impl SheetwiseError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unsupported_configuration(message: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetwiseError>;
