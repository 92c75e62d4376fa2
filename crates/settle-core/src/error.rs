//! Error types for feed stabilization
//!
//! Provides a unified error type for all settle crates. The detector itself
//! never fails; these errors come from parameter validation and from the
//! driver talking to its size source.

use thiserror::Error;

/// Core error type for stabilization and driver operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a constructor or schedule
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The size source failed to produce a measurement
    #[error("Source error: {0}")]
    Source(String),

    /// The size source failed too many times in a row
    #[error("Source exhausted: {failures} consecutive measurement failures")]
    SourceExhausted { failures: usize },

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for a parameter that must be strictly positive
    pub fn non_positive(name: &str) -> Self {
        Self::InvalidParameter(format!("{name} must be greater than zero"))
    }

    /// Create an error for an inverted lower/upper bound pair
    pub fn inverted_bounds(lower: &str, upper: &str) -> Self {
        Self::InvalidParameter(format!("{upper} must be greater than or equal to {lower}"))
    }

    /// Wrap any displayable source failure
    pub fn source<E: std::fmt::Display>(err: E) -> Self {
        Self::Source(err.to_string())
    }
}
