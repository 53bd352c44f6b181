//! # Price Math
//!
//! Numeric building blocks shared by the price cleaning and forecasting crates.
//! This crate provides local window statistics, price-band rounding and a
//! rank-tolerant least-squares solver.

use thiserror::Error;

pub mod least_squares;
pub mod rounding;
pub mod stats;

pub use least_squares::{DesignMatrix, LeastSquaresFit};
pub use rounding::{round_half_even, round_in_bands, RoundingBand};
pub use stats::{DeviationBand, WindowStats};

/// Errors that can occur in price-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for price math operations
pub type Result<T> = std::result::Result<T, MathError>;
