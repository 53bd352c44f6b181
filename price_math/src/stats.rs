//! Window statistics for local outlier detection
//!
//! Contains:
//! - Mean and population standard deviation over a window of prices
//! - Deviation bands (mean ± k standard deviations)

use statrs::statistics::Statistics;

/// Summary statistics for a window of prices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    mean: f64,
    std_dev: f64,
    count: usize,
}

impl WindowStats {
    /// Compute the mean and population standard deviation of `prices`.
    ///
    /// Returns `None` for an empty window, where neither statistic exists.
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }

        Some(Self {
            mean: prices.iter().mean(),
            std_dev: prices.iter().population_std_dev(),
            count: prices.len(),
        })
    }

    /// Mean of the window
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation of the window
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Number of prices in the window
    pub fn count(&self) -> usize {
        self.count
    }

    /// Band of `sigmas` standard deviations either side of the mean
    pub fn band(&self, sigmas: f64) -> DeviationBand {
        let width = sigmas * self.std_dev;
        DeviationBand {
            lower: self.mean - width,
            upper: self.mean + width,
        }
    }
}

/// Closed interval `[lower, upper]` around a window mean
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationBand {
    pub lower: f64,
    pub upper: f64,
}

impl DeviationBand {
    /// True when `price` lies strictly outside the band.
    ///
    /// A zero-width band never flags a price equal to its mean.
    pub fn is_outside(&self, price: f64) -> bool {
        price < self.lower || price > self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_stats() {
        let stats = WindowStats::from_prices(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();

        assert_relative_eq!(stats.mean(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev(), 2.0, epsilon = 1e-12);
        assert_eq!(stats.count(), 8);
    }

    #[test]
    fn test_empty_window() {
        assert!(WindowStats::from_prices(&[]).is_none());
    }

    #[test]
    fn test_single_price_window() {
        let stats = WindowStats::from_prices(&[42.0]).unwrap();
        assert_relative_eq!(stats.mean(), 42.0);
        assert_eq!(stats.std_dev(), 0.0);
    }

    #[test]
    fn test_band_is_strict() {
        let stats = WindowStats::from_prices(&[50.0, 50.0, 50.0]).unwrap();
        let band = stats.band(2.0);

        assert!(!band.is_outside(50.0));
        assert!(band.is_outside(50.5));
        assert!(band.is_outside(49.5));
    }

    #[test]
    fn test_band_width() {
        let stats = WindowStats::from_prices(&[90.0, 110.0]).unwrap();
        let band = stats.band(2.0);

        assert_relative_eq!(band.lower, 80.0);
        assert_relative_eq!(band.upper, 120.0);
        assert!(!band.is_outside(120.0));
        assert!(band.is_outside(120.1));
    }
}
