//! Configuration error types.

use std::path::PathBuf;

use orrery_mechanics::MechanicsError;

/// Errors that can occur when loading, saving, or parsing configuration and
/// body catalogs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write a file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// Failed to parse or serialize JSON content.
    #[error("failed to process JSON catalog: {0}")]
    JsonError(#[source] serde_json::Error),

    /// The file extension is neither `.ron` nor `.json`.
    #[error("unsupported catalog format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A start date could not be parsed.
    #[error("invalid date `{0}`: expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),

    /// The catalog's bodies do not form a valid system.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] MechanicsError),
}
