//! Error types for the price_forecast crate

use price_math::MathError;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum PriceError {
    /// A series with no observations where at least one is required
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// Not enough distinct timestamps to fit a trend
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Malformed policy, horizon or cadence
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Error from the numeric layer
    #[error("Math error: {0}")]
    MathError(String),

    /// Error related to ingesting or validating raw rows
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from parsing a timestamp or price field
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from decoding a configuration document
    #[error("Config error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PriceError>;

impl From<MathError> for PriceError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => PriceError::InsufficientData(msg),
            MathError::InvalidInput(msg) => PriceError::InvalidConfiguration(msg),
            MathError::CalculationError(msg) => PriceError::MathError(msg),
        }
    }
}

impl From<std::num::ParseFloatError> for PriceError {
    fn from(err: std::num::ParseFloatError) -> Self {
        PriceError::ParseError(err.to_string())
    }
}

impl From<chrono::ParseError> for PriceError {
    fn from(err: chrono::ParseError) -> Self {
        PriceError::ParseError(err.to_string())
    }
}
