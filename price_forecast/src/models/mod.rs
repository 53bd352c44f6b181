//! Forecasting models for per-item price series

use crate::data::{Series, Timestamp};
use crate::error::{PriceError, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod features;
pub mod seasonal_trend;

pub use features::{FeatureBuilder, SeasonalFeatures, SeasonalVocabulary};
pub use seasonal_trend::{NumericDegeneracy, SeasonalTrend, TrainedSeasonalTrend};

/// Spacing between successive forecast points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[default]
    Daily,
    Hourly,
}

impl Cadence {
    /// Duration of one step
    pub fn step(&self) -> Duration {
        match self {
            Cadence::Daily => Duration::days(1),
            Cadence::Hourly => Duration::hours(1),
        }
    }

    /// Number of steps covering `horizon`.
    ///
    /// Fails unless `horizon` is a positive whole multiple of the step.
    pub fn steps_in(&self, horizon: Duration) -> Result<usize> {
        let step = self.step().num_milliseconds();
        let total = horizon.num_milliseconds();

        if total <= 0 || total % step != 0 || horizon != Duration::milliseconds(total) {
            return Err(PriceError::InvalidConfiguration(format!(
                "Horizon of {} is not a positive multiple of the {:?} step",
                horizon, self
            )));
        }

        Ok((total / step) as usize)
    }

    /// Future timestamps after `last`, one step apart.
    ///
    /// Fails when the horizon runs past the latest representable timestamp.
    pub fn schedule(&self, last: Timestamp, horizon: Duration) -> Result<Vec<Timestamp>> {
        let steps = self.steps_in(horizon)?;
        let step = self.step();
        let beyond_range = || {
            PriceError::InvalidConfiguration(format!(
                "Horizon of {} after {} is past the last representable timestamp",
                horizon, last
            ))
        };

        last.checked_add_signed(horizon).ok_or_else(beyond_range)?;

        let mut schedule = Vec::with_capacity(steps);
        let mut next = last;
        for _ in 0..steps {
            next = next.checked_add_signed(step).ok_or_else(beyond_range)?;
            schedule.push(next);
        }
        Ok(schedule)
    }
}

/// One predicted price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: Timestamp,
    pub predicted_price: f64,
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    item_id: String,
    cadence: Cadence,
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Create a new forecast result.
    ///
    /// Timestamps must be strictly increasing.
    pub fn new(item_id: impl Into<String>, cadence: Cadence, points: Vec<ForecastPoint>) -> Result<Self> {
        if points.windows(2).any(|w| w[0].timestamp >= w[1].timestamp) {
            return Err(PriceError::DataError(
                "Forecast timestamps must be strictly increasing".to_string(),
            ));
        }

        Ok(Self {
            item_id: item_id.into(),
            cadence,
            points,
        })
    }

    /// Item the forecast was produced for
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Spacing of the forecast points
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Forecast points in time order
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Get the forecasted values
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_price).collect()
    }

    /// Get the forecast timestamps
    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Number of forecast points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the forecast is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Calculate mean absolute error between forecast and actual values
    pub fn mean_absolute_error(&self, actual: &[f64]) -> Result<f64> {
        if self.points.len() != actual.len() || actual.is_empty() {
            return Err(PriceError::DataError(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                self.points.len(),
                actual.len()
            )));
        }

        let sum: f64 = self
            .points
            .iter()
            .zip(actual)
            .map(|(f, a)| (f.predicted_price - a).abs())
            .sum();

        Ok(sum / actual.len() as f64)
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Forecast `horizon` past the last training timestamp at `cadence` spacing
    fn forecast(&self, horizon: Duration, cadence: Cadence) -> Result<ForecastResult>;

    /// Fitted values for the timestamps of `series`
    fn predict(&self, series: &Series) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a series
    fn train(&self, series: &Series) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Forecast settings carried in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Total forward span in hours
    pub horizon_hours: i64,
    pub cadence: Cadence,
    pub seasonal_features: SeasonalFeatures,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon_hours: 14 * 24,
            cadence: Cadence::Daily,
            seasonal_features: SeasonalFeatures::DayOfWeek,
        }
    }
}

impl ForecastSettings {
    /// Horizon as a duration; fails when `horizon_hours` is out of range
    pub fn horizon(&self) -> Result<Duration> {
        Duration::try_hours(self.horizon_hours).ok_or_else(|| {
            PriceError::InvalidConfiguration(format!(
                "horizon_hours of {} is out of range",
                self.horizon_hours
            ))
        })
    }

    /// Check the horizon against the cadence
    pub fn validate(&self) -> Result<()> {
        self.cadence.steps_in(self.horizon()?).map(|_| ())
    }
}

/// A complete forecast request for one series
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub series: Series,
    pub horizon: Duration,
    pub cadence: Cadence,
    pub seasonal_features: SeasonalFeatures,
}

impl ForecastRequest {
    /// Build a request from configured settings
    pub fn from_settings(series: Series, settings: &ForecastSettings) -> Result<Self> {
        Ok(Self {
            series,
            horizon: settings.horizon()?,
            cadence: settings.cadence,
            seasonal_features: settings.seasonal_features,
        })
    }

    /// Fit the seasonal trend model and extrapolate
    pub fn execute(&self) -> Result<ForecastResult> {
        forecast(&self.series, self.horizon, self.cadence, self.seasonal_features)
    }
}

/// Fit a trend-plus-seasonal model on `series` and forecast `horizon` ahead
pub fn forecast(
    series: &Series,
    horizon: Duration,
    cadence: Cadence,
    seasonal_features: SeasonalFeatures,
) -> Result<ForecastResult> {
    cadence.steps_in(horizon)?;
    SeasonalTrend::new(seasonal_features)
        .train(series)?
        .forecast(horizon, cadence)
}
