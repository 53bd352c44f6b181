//! # Price Forecast
//!
//! Outlier repair and seasonal trend forecasting for irregularly captured
//! market price series.
//!
//! ## Features
//!
//! - Per-item series built from `(item, timestamp, price)` observations
//! - Local outlier repair with a price ceiling and band rounding
//! - Linear trend forecasting with optional weekday and hour-of-day indicators
//! - Parallel multi-item pipeline
//! - CSV ingestion of raw exports and normalized CSV output
//!
//! ## Cadence Support
//!
//! Forecasts are produced at a fixed [`Cadence`](models::Cadence), either
//! `Daily` or `Hourly`. The horizon must be a positive whole number of
//! cadence steps, e.g. two weeks at daily cadence gives 14 points.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, NaiveDate};
//! use price_forecast::models::{forecast, Cadence, SeasonalFeatures};
//! use price_forecast::repair::{repair, RepairPolicy};
//! use price_forecast::Series;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let prices = [100.0, 100.0, 100.0, 9000.0, 100.0, 100.0];
//! let points = prices
//!     .iter()
//!     .enumerate()
//!     .map(|(i, p)| (start + Duration::days(i as i64), *p))
//!     .collect();
//! let series = Series::new("Anchor", points)?;
//!
//! let policy = RepairPolicy::new(2, 5000.0, vec![])?;
//! let repaired = repair(&series, &policy)?;
//! assert!(repaired.prices().iter().all(|p| *p == 100.0));
//!
//! let result = forecast(&repaired, Duration::weeks(1), Cadence::Daily, SeasonalFeatures::None)?;
//! assert_eq!(result.len(), 7);
//! # Ok::<(), price_forecast::PriceError>(())
//! ```

pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod repair;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, Observation, Series, Timestamp};
pub use crate::error::{PriceError, Result};
pub use crate::models::{
    forecast, Cadence, ForecastModel, ForecastResult, SeasonalFeatures, TrainedForecastModel,
};
pub use crate::repair::{repair, RepairEngine, RepairPolicy, Replacement};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
