//! Pipeline configuration loaded from JSON

use crate::error::{PriceError, Result};
use crate::models::ForecastSettings;
use crate::repair::RepairPolicy;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::fs;
use std::path::Path;

/// Repair and forecast settings for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub repair: RepairPolicy,
    pub forecast: ForecastSettings,
}

impl PipelineConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    ///
    /// Malformed JSON is a `ConfigError`. Well-formed JSON carrying a value the
    /// settings cannot hold (a negative radius, an unknown cadence) is an
    /// `InvalidConfiguration`, as are values that fail [`PipelineConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json).map_err(|e| match e.classify() {
            Category::Data => PriceError::InvalidConfiguration(e.to_string()),
            _ => PriceError::ConfigError(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject malformed settings
    pub fn validate(&self) -> Result<()> {
        self.repair.validate()?;
        self.forecast.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cadence, SeasonalFeatures};
    use crate::repair::Replacement;

    #[test]
    fn test_partial_document_uses_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "repair": { "window_radius": 5 }, "forecast": { "cadence": "hourly" } }"#,
        )
        .unwrap();

        assert_eq!(config.repair.window_radius, 5);
        assert_eq!(config.repair.price_ceiling, 5000.0);
        assert_eq!(config.repair.replacement, Replacement::NeighborAverage);
        assert_eq!(config.forecast.cadence, Cadence::Hourly);
        assert_eq!(config.forecast.seasonal_features, SeasonalFeatures::DayOfWeek);
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = PipelineConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let zero_radius = PipelineConfig::from_json_str(r#"{ "repair": { "window_radius": 0 } }"#);
        assert!(matches!(zero_radius, Err(PriceError::InvalidConfiguration(_))));

        let misaligned =
            PipelineConfig::from_json_str(r#"{ "forecast": { "horizon_hours": 30 } }"#);
        assert!(matches!(misaligned, Err(PriceError::InvalidConfiguration(_))));

        let negative = PipelineConfig::from_json_str(r#"{ "repair": { "window_radius": -3 } }"#);
        assert!(matches!(negative, Err(PriceError::InvalidConfiguration(_))));

        let unknown_cadence =
            PipelineConfig::from_json_str(r#"{ "forecast": { "cadence": "weekly" } }"#);
        assert!(matches!(unknown_cadence, Err(PriceError::InvalidConfiguration(_))));

        let truncated = PipelineConfig::from_json_str(r#"{ "repair": "#);
        assert!(matches!(truncated, Err(PriceError::ConfigError(_))));
    }

    #[test]
    fn test_oversized_horizon_is_rejected() {
        let result = PipelineConfig::from_json_str(
            r#"{ "forecast": { "horizon_hours": 9223372036854775807 } }"#,
        );
        assert!(matches!(result, Err(PriceError::InvalidConfiguration(_))));
    }
}
