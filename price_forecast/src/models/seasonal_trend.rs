//! Linear trend plus seasonal indicator regression

use crate::data::{Series, Timestamp};
use crate::error::{PriceError, Result};
use crate::models::features::{FeatureBuilder, SeasonalFeatures};
use crate::models::{Cadence, ForecastModel, ForecastPoint, ForecastResult, TrainedForecastModel};
use chrono::Duration;
use log::{debug, warn};
use price_math::{DesignMatrix, LeastSquaresFit};

/// Rank-deficient design matrix, solved with the minimum-norm solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericDegeneracy {
    pub rank: usize,
    pub columns: usize,
}

/// Seasonal trend model
#[derive(Debug, Clone)]
pub struct SeasonalTrend {
    /// Name of the model
    name: String,
    /// Calendar indicators to include
    features: SeasonalFeatures,
}

/// Trained seasonal trend model
#[derive(Debug, Clone)]
pub struct TrainedSeasonalTrend {
    /// Name of the model
    name: String,
    /// Item the model was fitted on
    item_id: String,
    /// Origin and fit-time vocabulary
    builder: FeatureBuilder,
    /// Regression coefficients and rank
    fit: LeastSquaresFit,
    /// Last training timestamp
    last_timestamp: Timestamp,
    /// Present when the design matrix was rank deficient
    degeneracy: Option<NumericDegeneracy>,
    /// In-sample coefficient of determination, when defined
    r_squared: Option<f64>,
}

impl SeasonalTrend {
    /// Create a new seasonal trend model
    pub fn new(features: SeasonalFeatures) -> Self {
        Self {
            name: format!("Seasonal Trend (features={:?})", features),
            features,
        }
    }

    /// Calendar indicators used by this model
    pub fn features(&self) -> SeasonalFeatures {
        self.features
    }
}

impl ForecastModel for SeasonalTrend {
    type Trained = TrainedSeasonalTrend;

    fn train(&self, series: &Series) -> Result<Self::Trained> {
        if series.is_empty() {
            return Err(PriceError::EmptySeries(format!(
                "Cannot fit a trend for '{}' without observations",
                series.item_id()
            )));
        }
        if series.distinct_timestamps() < 2 {
            return Err(PriceError::InsufficientData(format!(
                "Need at least 2 distinct timestamps to fit a trend for '{}'",
                series.item_id()
            )));
        }

        let builder = FeatureBuilder::fit(series.timestamps(), self.features).ok_or_else(|| {
            PriceError::EmptySeries(format!("No timestamps for '{}'", series.item_id()))
        })?;

        let rows: Vec<Vec<f64>> = series.timestamps().iter().map(|ts| builder.row(*ts)).collect();
        let design = DesignMatrix::from_rows(&rows)?;
        let fit = LeastSquaresFit::solve(&design, series.prices())?;

        let degeneracy = if fit.is_rank_deficient() {
            let degeneracy = NumericDegeneracy {
                rank: fit.rank(),
                columns: design.columns(),
            };
            warn!(
                "Rank-deficient design for '{}' (rank {} of {} columns); using minimum-norm solution",
                series.item_id(),
                degeneracy.rank,
                degeneracy.columns
            );
            Some(degeneracy)
        } else {
            None
        };

        let r_squared = fit.r_squared(&design, series.prices()).ok();
        debug!(
            "Fitted {} on '{}' with {} rows, columns {:?}, r_squared {:?}",
            self.name,
            series.item_id(),
            design.rows(),
            builder.column_names(),
            r_squared
        );

        let last_timestamp = series.last_timestamp().ok_or_else(|| {
            PriceError::EmptySeries(format!("No timestamps for '{}'", series.item_id()))
        })?;

        Ok(TrainedSeasonalTrend {
            name: self.name.clone(),
            item_id: series.item_id().to_string(),
            builder,
            fit,
            last_timestamp,
            degeneracy,
            r_squared,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeasonalTrend {
    /// Predicted price at any timestamp
    pub fn predict_at(&self, ts: Timestamp) -> Result<f64> {
        Ok(self.fit.predict(&self.builder.row(ts))?)
    }

    /// Coefficients in the order of [`TrainedSeasonalTrend::column_names`]
    pub fn coefficients(&self) -> &[f64] {
        self.fit.coefficients()
    }

    /// Names of the design columns
    pub fn column_names(&self) -> Vec<String> {
        self.builder.column_names()
    }

    /// Origin and fit-time vocabulary
    pub fn features(&self) -> &FeatureBuilder {
        &self.builder
    }

    /// Rank deficiency diagnostic, if any
    pub fn degeneracy(&self) -> Option<NumericDegeneracy> {
        self.degeneracy
    }

    /// In-sample R², undefined for a constant series
    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }

    /// Last timestamp seen during training
    pub fn last_timestamp(&self) -> Timestamp {
        self.last_timestamp
    }
}

impl TrainedForecastModel for TrainedSeasonalTrend {
    fn forecast(&self, horizon: Duration, cadence: Cadence) -> Result<ForecastResult> {
        let points = cadence
            .schedule(self.last_timestamp, horizon)?
            .into_iter()
            .map(|timestamp| {
                Ok(ForecastPoint {
                    timestamp,
                    predicted_price: self.predict_at(timestamp)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        ForecastResult::new(self.item_id.clone(), cadence, points)
    }

    fn predict(&self, series: &Series) -> Result<Vec<f64>> {
        series
            .timestamps()
            .iter()
            .map(|ts| self.predict_at(*ts))
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
