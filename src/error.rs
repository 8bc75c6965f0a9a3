//! Error types for the TBM Horaires skill

use thiserror::Error;

use crate::transit::TransitError;

/// Result type alias for skill operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside of a voice turn (startup, CLI commands, server)
///
/// Inside a turn every failure is turned into a spoken message by the intent
/// handler, so these never reach the voice platform.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Catalog loading or validation error
    #[error("catalog error: {0}")]
    Catalog(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML writing error
    #[error("toml write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Transit API error
    #[error(transparent)]
    Transit(#[from] TransitError),
}
