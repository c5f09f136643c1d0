//! CLI error types.

use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Protocol or transport error.
    #[error(transparent)]
    Dav(#[from] calwire_protocol::DavError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output serialization failed.
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),

    /// A create request was not answered with 201 Created.
    #[error("{0} was not created")]
    NotCreated(String),
}
