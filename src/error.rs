//! Error types for the token screener

use serde::Serialize;
use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the screener
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Upstream errors
    #[error("HTTP client error: {0}")]
    Http(String),

    // Input errors
    #[error("Invalid token list: {0}")]
    InvalidTokenList(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Classification used in run statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Market data provider knows no pairs for the token
    NoPairs,
    /// Pairs exist, but none is quoted in the stablecoin
    NoStablecoinPairs,
    /// A required fraud oracle could not answer
    OracleUnavailable,
    /// Anything else (transport, parsing, other providers)
    Other,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::NoPairs => write!(f, "no pairs"),
            ErrorCategory::NoStablecoinPairs => write!(f, "no stablecoin pairs"),
            ErrorCategory::OracleUnavailable => write!(f, "oracle unavailable"),
            ErrorCategory::Other => write!(f, "other"),
        }
    }
}

/// Structured error returned by every data provider.
///
/// The orchestrator categorizes failures from the variant alone.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("no DEXScreener pairs found for token {address}")]
    NoPairs { address: String },

    #[error("no stablecoin pairs found for token {address}")]
    NoStablecoinPairs { address: String },

    #[error("{oracle} unavailable: {message}")]
    OracleUnavailable { oracle: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProviderError::NoPairs { .. } => ErrorCategory::NoPairs,
            ProviderError::NoStablecoinPairs { .. } => ErrorCategory::NoStablecoinPairs,
            ProviderError::OracleUnavailable { .. } => ErrorCategory::OracleUnavailable,
            ProviderError::Other(_) => ErrorCategory::Other,
        }
    }

    pub fn oracle(oracle: &str, message: impl Into<String>) -> Self {
        ProviderError::OracleUnavailable {
            oracle: oracle.to_string(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Other(format!("request failed: {}", e))
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
