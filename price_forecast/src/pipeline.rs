//! Multi-item repair and forecasting
//!
//! Observations are partitioned by item, and each item is repaired and
//! forecast on its own rayon task. Nothing is shared between items, and
//! results come back ordered by item id.

use crate::config::PipelineConfig;
use crate::data::{partition_by_item, Observation, Series};
use crate::error::Result;
use crate::models::{ForecastRequest, ForecastResult, ForecastSettings};
use crate::repair::{RepairEngine, RepairPolicy, RepairReport};
use log::{info, warn};
use rayon::prelude::*;

/// Outcome of the pipeline for one item
#[derive(Debug)]
pub struct ItemReport {
    pub item_id: String,
    pub raw: Series,
    pub repaired: Series,
    pub repair: RepairReport,
    /// A failed forecast for one item does not affect the others
    pub forecast: Result<ForecastResult>,
}

/// Repair every item in parallel
pub fn repair_all(observations: Vec<Observation>, policy: &RepairPolicy) -> Result<Vec<Series>> {
    let engine = RepairEngine::new(policy.clone())?;
    let partition: Vec<Series> = partition_by_item(observations)?.into_values().collect();

    Ok(partition
        .into_par_iter()
        .map(|series| engine.repair(&series))
        .collect())
}

/// Forecast every series in parallel, keyed by item id
pub fn forecast_all(
    series: &[Series],
    settings: &ForecastSettings,
) -> Result<Vec<(String, Result<ForecastResult>)>> {
    settings.validate()?;

    Ok(series
        .par_iter()
        .map(|s| {
            let forecast =
                ForecastRequest::from_settings(s.clone(), settings).and_then(|r| r.execute());
            (s.item_id().to_string(), forecast)
        })
        .collect())
}

/// Repair then forecast every item
pub fn run(observations: Vec<Observation>, config: &PipelineConfig) -> Result<Vec<ItemReport>> {
    config.validate()?;
    let engine = RepairEngine::new(config.repair.clone())?;
    let partition: Vec<Series> = partition_by_item(observations)?.into_values().collect();
    info!("Running pipeline over {} items", partition.len());

    let reports: Vec<ItemReport> = partition
        .into_par_iter()
        .map(|raw| {
            let (repaired, repair) = engine.repair_with_report(&raw);
            let forecast = ForecastRequest::from_settings(repaired.clone(), &config.forecast)
                .and_then(|r| r.execute());
            ItemReport {
                item_id: raw.item_id().to_string(),
                raw,
                repaired,
                repair,
                forecast,
            }
        })
        .collect();

    for report in &reports {
        if let Err(e) = &report.forecast {
            warn!("No forecast for '{}': {}", report.item_id, e);
        }
    }

    Ok(reports)
}
