//! Magnitude-dependent price rounding
//!
//! Market prices are quoted in coarser steps as they grow, so a repaired
//! price is snapped to the step of the band it falls in.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Round `value` to the nearest multiple of `unit`, ties to even.
///
/// `round_half_even(125.0, 50.0)` is `100.0`, `round_half_even(175.0, 50.0)` is `200.0`.
pub fn round_half_even(value: f64, unit: f64) -> f64 {
    (value / unit).round_ties_even() * unit
}

/// Price range `[lower, upper)` quoted in steps of `unit`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundingBand {
    pub lower: f64,
    pub upper: f64,
    pub unit: f64,
}

impl RoundingBand {
    /// Create a new rounding band
    pub fn new(lower: f64, upper: f64, unit: f64) -> Result<Self> {
        let band = Self { lower, upper, unit };
        band.validate()?;
        Ok(band)
    }

    /// Check the band bounds and unit
    pub fn validate(&self) -> Result<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower >= self.upper {
            return Err(MathError::InvalidInput(format!(
                "Rounding band bounds must be finite with lower < upper, got [{}, {})",
                self.lower, self.upper
            )));
        }
        if !self.unit.is_finite() || self.unit <= 0.0 {
            return Err(MathError::InvalidInput(format!(
                "Rounding unit must be positive, got {}",
                self.unit
            )));
        }
        Ok(())
    }

    /// True when `price` lies in `[lower, upper)`
    pub fn contains(&self, price: f64) -> bool {
        price >= self.lower && price < self.upper
    }

    /// Snap `price` to this band's unit
    pub fn round(&self, price: f64) -> f64 {
        round_half_even(price, self.unit)
    }
}

/// Round `price` with the first band containing it.
///
/// Prices outside every band are returned at full precision.
pub fn round_in_bands(price: f64, bands: &[RoundingBand]) -> f64 {
    bands
        .iter()
        .find(|band| band.contains(price))
        .map_or(price, |band| band.round(price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(125.0, 50.0, 100.0)]
    #[case(175.0, 50.0, 200.0)]
    #[case(130.0, 50.0, 150.0)]
    #[case(1250.0, 100.0, 1200.0)]
    #[case(1350.0, 100.0, 1400.0)]
    #[case(1949.0, 100.0, 1900.0)]
    fn test_round_half_even(#[case] value: f64, #[case] unit: f64, #[case] expected: f64) {
        assert_eq!(round_half_even(value, unit), expected);
    }

    #[test]
    fn test_first_matching_band_wins() {
        let bands = vec![
            RoundingBand::new(0.0, 1000.0, 50.0).unwrap(),
            RoundingBand::new(500.0, 10000.0, 100.0).unwrap(),
        ];

        assert_eq!(round_in_bands(730.0, &bands), 750.0);
        assert_eq!(round_in_bands(1730.0, &bands), 1700.0);
    }

    #[test]
    fn test_upper_bound_is_exclusive() {
        let bands = vec![
            RoundingBand::new(0.0, 1000.0, 50.0).unwrap(),
            RoundingBand::new(1000.0, 10000.0, 100.0).unwrap(),
        ];

        assert_eq!(round_in_bands(1000.0, &bands), 1000.0);
        assert_eq!(round_in_bands(999.0, &bands), 1000.0);
    }

    #[test]
    fn test_outside_all_bands_keeps_precision() {
        let bands = vec![RoundingBand::new(0.0, 1000.0, 50.0).unwrap()];
        assert_eq!(round_in_bands(12345.67, &bands), 12345.67);
        assert_eq!(round_in_bands(-3.3, &bands), -3.3);
    }

    #[test]
    fn test_invalid_bands() {
        assert!(RoundingBand::new(10.0, 10.0, 1.0).is_err());
        assert!(RoundingBand::new(0.0, 10.0, 0.0).is_err());
        assert!(RoundingBand::new(0.0, f64::INFINITY, 1.0).is_err());
    }
}
