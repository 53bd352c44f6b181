//! Local outlier repair for per-item price series
//!
//! Each point is compared against the prices around it (excluding itself).
//! A point that falls outside `mean ± k·std` of that window is replaced,
//! then capped at the price ceiling and snapped to the price band's unit.
//! All decisions read the input snapshot, so one pass is deterministic and
//! never sees its own replacements.

use crate::data::{concat_series, partition_by_item, Observation, Series};
use crate::error::{PriceError, Result};
use log::debug;
use price_math::{round_in_bands, RoundingBand, WindowStats};
use serde::{Deserialize, Serialize};

/// How a flagged point is replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Replacement {
    /// Average of the two temporally nearest neighbours
    #[default]
    NeighborAverage,
    /// Mean of the local window
    LocalMean,
}

/// Configuration of the repair pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairPolicy {
    /// Neighbouring points on each side that form the local window
    pub window_radius: usize,
    /// Hard cap applied to replaced prices
    pub price_ceiling: f64,
    /// Magnitude-dependent rounding, first match wins
    pub rounding_bands: Vec<RoundingBand>,
    /// Width of the acceptance band in local standard deviations
    pub threshold_sigmas: f64,
    /// Replacement rule for flagged points
    pub replacement: Replacement,
    /// Also cap points that were never flagged
    pub clamp_unflagged: bool,
}

impl Default for RepairPolicy {
    fn default() -> Self {
        Self {
            window_radius: 10,
            price_ceiling: 5000.0,
            rounding_bands: vec![
                RoundingBand {
                    lower: 0.0,
                    upper: 1000.0,
                    unit: 50.0,
                },
                RoundingBand {
                    lower: 1000.0,
                    upper: 10000.0,
                    unit: 100.0,
                },
            ],
            threshold_sigmas: 2.0,
            replacement: Replacement::NeighborAverage,
            clamp_unflagged: false,
        }
    }
}

impl RepairPolicy {
    /// Create a threshold-gated policy with a 2σ band and neighbour-average replacement
    pub fn new(
        window_radius: usize,
        price_ceiling: f64,
        rounding_bands: Vec<RoundingBand>,
    ) -> Result<Self> {
        let policy = Self {
            window_radius,
            price_ceiling,
            rounding_bands,
            ..Self::default()
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Policy that overwrites every point that differs from its local mean
    pub fn local_mean(
        window_radius: usize,
        price_ceiling: f64,
        rounding_bands: Vec<RoundingBand>,
    ) -> Result<Self> {
        Self::new(window_radius, price_ceiling, rounding_bands)?
            .with_threshold(0.0)
            .map(|p| p.with_replacement(Replacement::LocalMean))
    }

    /// Set the band width in standard deviations
    pub fn with_threshold(mut self, sigmas: f64) -> Result<Self> {
        self.threshold_sigmas = sigmas;
        self.validate()?;
        Ok(self)
    }

    /// Set the replacement rule
    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }

    /// Cap unflagged points at the ceiling too
    pub fn with_clamp_unflagged(mut self, clamp: bool) -> Self {
        self.clamp_unflagged = clamp;
        self
    }

    /// Reject malformed settings instead of substituting defaults
    pub fn validate(&self) -> Result<()> {
        if self.window_radius < 1 {
            return Err(PriceError::InvalidConfiguration(
                "window_radius must be at least 1".to_string(),
            ));
        }
        if !self.price_ceiling.is_finite() {
            return Err(PriceError::InvalidConfiguration(format!(
                "price_ceiling must be finite, got {}",
                self.price_ceiling
            )));
        }
        if !self.threshold_sigmas.is_finite() || self.threshold_sigmas < 0.0 {
            return Err(PriceError::InvalidConfiguration(format!(
                "threshold_sigmas must be a non-negative number, got {}",
                self.threshold_sigmas
            )));
        }
        for band in &self.rounding_bands {
            band.validate()?;
        }
        Ok(())
    }
}

/// Counts gathered during one repair pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Points outside their local band
    pub flagged: usize,
    /// Flagged points that received a replacement
    pub replaced: usize,
    /// Flagged points left as observed because no replacement could be formed
    pub unreplaced: usize,
    /// Points capped at the ceiling
    pub clamped: usize,
}

/// Outlier repair engine bound to a validated policy
#[derive(Debug, Clone)]
pub struct RepairEngine {
    policy: RepairPolicy,
}

impl RepairEngine {
    /// Create an engine, validating the policy once
    pub fn new(policy: RepairPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// The policy this engine applies
    pub fn policy(&self) -> &RepairPolicy {
        &self.policy
    }

    /// Repair a single item's series
    pub fn repair(&self, series: &Series) -> Series {
        self.repair_with_report(series).0
    }

    /// Repair a single item's series and report what changed
    pub fn repair_with_report(&self, series: &Series) -> (Series, RepairReport) {
        let prices = series.prices();
        let mut report = RepairReport::default();
        let mut repaired = Vec::with_capacity(prices.len());

        for (index, &price) in prices.iter().enumerate() {
            let window = local_window(prices, index, self.policy.window_radius);
            let stats = match WindowStats::from_prices(&window) {
                Some(stats) => stats,
                None => {
                    repaired.push(price);
                    continue;
                }
            };

            if !stats.band(self.policy.threshold_sigmas).is_outside(price) {
                let kept = if self.policy.clamp_unflagged {
                    self.cap(price, &mut report)
                } else {
                    price
                };
                repaired.push(kept);
                continue;
            }

            report.flagged += 1;
            let replacement = match self.policy.replacement {
                Replacement::NeighborAverage => neighbor_average(prices, index),
                Replacement::LocalMean => Some(stats.mean()),
            };

            match replacement {
                Some(value) => {
                    report.replaced += 1;
                    repaired.push(self.finish(value, &mut report));
                }
                None => {
                    report.unreplaced += 1;
                    repaired.push(price);
                }
            }
        }

        debug!(
            "Repaired '{}': {} points, {} flagged, {} replaced, {} clamped",
            series.item_id(),
            prices.len(),
            report.flagged,
            report.replaced,
            report.clamped
        );

        (series.with_prices(repaired), report)
    }

    /// Partition mixed observations by item, repair each group and concatenate
    pub fn repair_observations(
        &self,
        observations: impl IntoIterator<Item = Observation>,
    ) -> Result<Vec<Observation>> {
        let partition = partition_by_item(observations)?;
        let repaired: Vec<Series> = partition.values().map(|s| self.repair(s)).collect();
        Ok(concat_series(&repaired))
    }

    fn cap(&self, price: f64, report: &mut RepairReport) -> f64 {
        if price > self.policy.price_ceiling {
            report.clamped += 1;
            self.policy.price_ceiling
        } else {
            price
        }
    }

    // Ceiling, then band rounding. Rounding up may cross the ceiling again,
    // so the cap is re-applied to the rounded value.
    fn finish(&self, value: f64, report: &mut RepairReport) -> f64 {
        let capped = self.cap(value, report);
        round_in_bands(capped, &self.policy.rounding_bands).min(self.policy.price_ceiling)
    }
}

/// Repair one series with `policy`
pub fn repair(series: &Series, policy: &RepairPolicy) -> Result<Series> {
    Ok(RepairEngine::new(policy.clone())?.repair(series))
}

/// Prices within `radius` positions of `index`, excluding `index` itself.
///
/// Falls back to every other price in the series when the clipped window is
/// empty; the result is empty only for a single-point series.
fn local_window(prices: &[f64], index: usize, radius: usize) -> Vec<f64> {
    let start = index.saturating_sub(radius);
    let end = prices.len().min(index.saturating_add(radius).saturating_add(1));

    let window: Vec<f64> = prices[start..index]
        .iter()
        .chain(&prices[index + 1..end])
        .copied()
        .collect();

    if !window.is_empty() {
        return window;
    }

    prices[..index]
        .iter()
        .chain(&prices[index + 1..])
        .copied()
        .collect()
}

/// Average of the two nearest neighbours; edges use the two points on their inner side
fn neighbor_average(prices: &[f64], index: usize) -> Option<f64> {
    let n = prices.len();
    if n < 3 {
        return None;
    }

    let (a, b) = if index == 0 {
        (prices[1], prices[2])
    } else if index == n - 1 {
        (prices[n - 2], prices[n - 3])
    } else {
        (prices[index - 1], prices[index + 1])
    };

    Some((a + b) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_window_excludes_point() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(local_window(&prices, 2, 1), vec![2.0, 4.0]);
        assert_eq!(local_window(&prices, 0, 2), vec![2.0, 3.0]);
        assert_eq!(local_window(&prices, 4, 2), vec![3.0, 4.0]);
        assert_eq!(local_window(&prices, 2, 100), vec![1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_local_window_single_point() {
        assert!(local_window(&[7.0], 0, 3).is_empty());
    }

    #[test]
    fn test_neighbor_average_edges() {
        let prices = [10.0, 20.0, 40.0, 80.0];
        assert_eq!(neighbor_average(&prices, 0), Some(30.0));
        assert_eq!(neighbor_average(&prices, 1), Some(25.0));
        assert_eq!(neighbor_average(&prices, 3), Some(30.0));
        assert_eq!(neighbor_average(&prices[..2], 0), None);
    }

    #[test]
    fn test_invalid_policies() {
        assert!(RepairPolicy::new(0, 5000.0, vec![]).is_err());
        assert!(RepairPolicy::new(2, f64::NAN, vec![]).is_err());
        assert!(RepairPolicy::default().with_threshold(-1.0).is_err());

        let mut policy = RepairPolicy::default();
        policy.rounding_bands.push(RoundingBand {
            lower: 5.0,
            upper: 1.0,
            unit: 1.0,
        });
        assert!(matches!(
            RepairEngine::new(policy),
            Err(PriceError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_local_mean_policy() {
        let policy = RepairPolicy::local_mean(3, 5000.0, vec![]).unwrap();
        assert_eq!(policy.threshold_sigmas, 0.0);
        assert_eq!(policy.replacement, Replacement::LocalMean);
    }
}
