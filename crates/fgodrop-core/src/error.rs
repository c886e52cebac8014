//! Error types for fgodrop-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fgodrop-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in {context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    /// HTTP transport error talking to the Sheets API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error payload returned by the Sheets API
    #[error("Sheets API error: {0}")]
    Sheets(String),

    /// Sheet has fewer rows than the banner plus the two header rows
    #[error("sheet is truncated: expected a banner row and two header rows, got {rows} rows")]
    TruncatedSheet { rows: usize },

    /// Index too large for a single base-36 digit
    #[error("index {0} does not fit in a single base-36 digit")]
    Base36(usize),

    /// A required column is absent from a data row
    #[error("row {row} is missing required column '{column}'")]
    MissingColumn { row: usize, column: String },

    /// Drop rate references a quest name absent from the quest table
    #[error("drop rate references unknown quest '{0}'")]
    UnknownQuest(String),

    /// Numeric cell failed to parse as an integer
    #[error("invalid integer '{value}' in column '{column}': {source}")]
    InvalidInt {
        column: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Drop-rate cell failed to parse as a decimal
    #[error("invalid drop rate '{value}' for item '{item}'")]
    InvalidRate { item: String, value: String },

    /// Training-ground quest ID does not end in a decimal rank digit
    #[error("training-ground quest ID '{0}' does not end in a decimal digit")]
    RankDigit(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
