//! Error types for the application

use thiserror::Error;

/// Result type alias using our AnalysisError
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised around the sizing core
///
/// The sizing core itself never fails: unavailable prices and degenerate
/// adjustments are recorded in the report. These variants cover the
/// process boundary (parameters, configuration, terminal, output).
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Run parameters violate their invariants
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The trading terminal could not be initialized
    #[error("Terminal initialization failed: {0}")]
    TerminalInitialization(String),

    /// Account information could not be retrieved
    #[error("Failed to retrieve account information")]
    AccountUnavailable,

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Framed output could not be recovered
    #[error("Malformed output: {0}")]
    MalformedOutput(String),
}
