//! # Market Prices
//!
//! Facade over the workspace crates: `price_math` holds the numeric building
//! blocks, `price_forecast` the per-item repair engine, forecaster and the
//! CSV pipeline around them.
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use market_prices_workspace::forecast::{repair, RepairPolicy, Series};
//!
//! let t0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let series = Series::new(
//!     "Basic",
//!     (0..10).map(|d| (t0 + Duration::days(d), 50.0)).collect(),
//! )
//! .unwrap();
//!
//! let repaired = repair(&series, &RepairPolicy::default()).unwrap();
//! assert_eq!(repaired, series);
//! ```

pub use price_forecast as forecast;
pub use price_math as math;

/// Rounding bands used by the default repair policy
pub fn default_rounding_bands() -> Vec<math::RoundingBand> {
    forecast::RepairPolicy::default().rounding_bands
}
