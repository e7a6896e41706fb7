//! Error types for titulus-core.

use thiserror::Error;

/// Result type for titulus operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for titulus operations.
///
/// `Config` is the only variant surfaced to callers of the extraction
/// API; adapter failures are caught inside the pipeline and degrade
/// the run instead of aborting it.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid extraction configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// External linguistic analyzer failed to load or answer.
    #[error("Analyzer error: {0}")]
    Adapter(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error in an input or output file.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an adapter error.
    #[must_use]
    pub fn adapter(msg: impl Into<String>) -> Self {
        Self::Adapter(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
