//! Merging history and forecast for charting

use crate::data::{Series, Timestamp};
use crate::models::ForecastResult;
use serde::{Deserialize, Serialize};

/// Where a charted point came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    Historical,
    Forecast,
}

/// One point on a price chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub item_id: String,
    pub timestamp: Timestamp,
    pub price: f64,
    pub provenance: Provenance,
}

/// Historical points followed by forecast points, each tagged with its provenance
pub fn merge_for_chart(history: &Series, forecast: &ForecastResult) -> Vec<ChartPoint> {
    let historical = history.points().map(|(timestamp, price)| ChartPoint {
        item_id: history.item_id().to_string(),
        timestamp,
        price,
        provenance: Provenance::Historical,
    });

    let predicted = forecast.points().iter().map(|p| ChartPoint {
        item_id: forecast.item_id().to_string(),
        timestamp: p.timestamp,
        price: p.predicted_price,
        provenance: Provenance::Forecast,
    });

    historical.chain(predicted).collect()
}
