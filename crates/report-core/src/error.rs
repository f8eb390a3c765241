use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the report pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A session log is malformed: missing field, bad number or bad date.
    #[error("Failed to parse {file}: {reason}")]
    Parse { file: String, reason: String },

    /// No session logs exist for the requested scenario.
    #[error("No files found for scenario: {0}")]
    NoDataFound(String),

    /// A trend window of zero records was requested.
    #[error("last_n should be set to a positive integer (current value: {0})")]
    InvalidWindow(usize),

    /// Trends were requested over an empty record list.
    #[error("Cannot compute trends over an empty record list")]
    EmptyWindow,

    /// The spline system could not be built or solved.
    #[error("Interpolation failed: {0}")]
    Interpolation(String),

    /// The stats directory does not exist.
    #[error("Stats path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// A rank tier name is not one of the recognised tiers.
    #[error("Unknown rank: {0}")]
    UnknownRank(String),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Build a [`ReportError::Parse`] for `file`.
    pub fn parse(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;
