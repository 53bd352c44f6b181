//! Price observations, per-item series and the raw CSV collaborators

use crate::error::{PriceError, Result};
use chrono::NaiveDateTime;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Instant of an observation, in the exporter's local clock
pub type Timestamp = NaiveDateTime;

/// Formats accepted for the `date time` pair of a raw export row
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Format used when writing normalized rows
const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single price reading for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub item_id: String,
    pub timestamp: Timestamp,
    pub price: f64,
}

impl Observation {
    /// Create a new observation
    pub fn new(item_id: impl Into<String>, timestamp: Timestamp, price: f64) -> Self {
        Self {
            item_id: item_id.into(),
            timestamp,
            price,
        }
    }
}

/// Chronologically ordered prices for a single item.
///
/// A series is never mutated after construction; repair and forecasting
/// build new values from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    item_id: String,
    timestamps: Vec<Timestamp>,
    prices: Vec<f64>,
}

impl Series {
    /// Create a series from `(timestamp, price)` points.
    ///
    /// Points are stably sorted by timestamp, so duplicate timestamps keep
    /// their input order. Non-finite prices are rejected.
    pub fn new(item_id: impl Into<String>, mut points: Vec<(Timestamp, f64)>) -> Result<Self> {
        let item_id = item_id.into();

        if let Some((ts, price)) = points.iter().find(|(_, p)| !p.is_finite()) {
            return Err(PriceError::DataError(format!(
                "Non-finite price {} for '{}' at {}",
                price, item_id, ts
            )));
        }

        points.sort_by_key(|(ts, _)| *ts);
        let (timestamps, prices) = points.into_iter().unzip();

        Ok(Self {
            item_id,
            timestamps,
            prices,
        })
    }

    /// Create a series from observations that all share one item id
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self> {
        let item_id = match observations.first() {
            Some(first) => first.item_id.clone(),
            None => {
                return Err(PriceError::EmptySeries(
                    "Cannot infer an item id from zero observations".to_string(),
                ))
            }
        };

        if let Some(other) = observations.iter().find(|o| o.item_id != item_id) {
            return Err(PriceError::DataError(format!(
                "Mixed item ids in one series: '{}' and '{}'",
                item_id, other.item_id
            )));
        }

        let points = observations
            .into_iter()
            .map(|o| (o.timestamp, o.price))
            .collect();
        Self::new(item_id, points)
    }

    /// Same timestamps with a replacement price vector
    pub(crate) fn with_prices(&self, prices: Vec<f64>) -> Self {
        debug_assert_eq!(prices.len(), self.prices.len());
        Self {
            item_id: self.item_id.clone(),
            timestamps: self.timestamps.clone(),
            prices,
        }
    }

    /// Item this series belongs to
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Observation timestamps in ascending order
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Prices aligned with [`Series::timestamps`]
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Iterate `(timestamp, price)` pairs in order
    pub fn points(&self) -> impl Iterator<Item = (Timestamp, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.prices.iter().copied())
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Earliest timestamp
    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.first().copied()
    }

    /// Latest timestamp
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.last().copied()
    }

    /// Number of distinct timestamps
    pub fn distinct_timestamps(&self) -> usize {
        self.timestamps.iter().collect::<HashSet<_>>().len()
    }

    /// Points with `start <= timestamp <= end`
    pub fn between(&self, start: Timestamp, end: Timestamp) -> Self {
        let (timestamps, prices) = self
            .points()
            .filter(|(ts, _)| *ts >= start && *ts <= end)
            .unzip();

        Self {
            item_id: self.item_id.clone(),
            timestamps,
            prices,
        }
    }

    /// Flatten back into observations
    pub fn to_observations(&self) -> Vec<Observation> {
        self.points()
            .map(|(ts, price)| Observation::new(self.item_id.clone(), ts, price))
            .collect()
    }
}

/// Group observations by item id into ordered series
pub fn partition_by_item(
    observations: impl IntoIterator<Item = Observation>,
) -> Result<BTreeMap<String, Series>> {
    let mut groups: BTreeMap<String, Vec<(Timestamp, f64)>> = BTreeMap::new();
    for o in observations {
        groups
            .entry(o.item_id)
            .or_default()
            .push((o.timestamp, o.price));
    }

    groups
        .into_iter()
        .map(|(item_id, points)| Ok((item_id.clone(), Series::new(item_id, points)?)))
        .collect()
}

/// Concatenate series back into a flat observation list, group by group
pub fn concat_series<'a>(series: impl IntoIterator<Item = &'a Series>) -> Vec<Observation> {
    series.into_iter().flat_map(Series::to_observations).collect()
}

/// Parse a timestamp from the raw export's separate date and time fields
pub fn parse_timestamp(date: &str, time: &str) -> Result<Timestamp> {
    let joined = format!("{} {}", date.trim(), time.trim());
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&joined, fmt).ok())
        .ok_or_else(|| PriceError::ParseError(format!("Unrecognised timestamp '{}'", joined)))
}

/// One row of the raw export: `name, date, delay, price, time`
#[derive(Debug, Deserialize)]
struct RawRow {
    name: String,
    date: String,
    #[allow(dead_code)]
    delay: String,
    price: String,
    time: String,
}

impl RawRow {
    fn into_observation(self) -> Result<Observation> {
        let timestamp = parse_timestamp(&self.date, &self.time)?;
        let price: f64 = self.price.parse()?;
        Ok(Observation::new(self.name, timestamp, price))
    }
}

/// Normalized row written for persistence
#[derive(Debug, Serialize)]
struct NormalizedRow<'a> {
    #[serde(rename = "Item_name")]
    item_name: &'a str,
    #[serde(rename = "Date_time")]
    date_time: String,
    #[serde(rename = "Price")]
    price: f64,
}

/// Data loader for raw price exports
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Read raw export rows from any reader. The first line is a header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Observation>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut observations = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let row: RawRow = record.deserialize(None)?;
            observations.push(row.into_observation()?);
        }

        Ok(observations)
    }

    /// Load raw export rows from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let path = path.as_ref();
        let observations = Self::from_reader(File::open(path)?)?;
        debug!(
            "Loaded {} observations from {}",
            observations.len(),
            path.display()
        );
        Ok(observations)
    }

    /// Load every `*.csv` file in a directory, in file name order
    pub fn from_directory<P: AsRef<Path>>(dir: P) -> Result<Vec<Observation>> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(PriceError::DataError(format!(
                "No csv files found in {}",
                dir.display()
            )));
        }

        files.sort();
        let mut observations = Vec::new();
        for file in &files {
            observations.extend(Self::from_csv(file)?);
        }

        info!(
            "Loaded {} observations from {} files in {}",
            observations.len(),
            files.len(),
            dir.display()
        );
        Ok(observations)
    }

    /// Load a single file or a directory of files
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::from_directory(path)
        } else {
            Self::from_csv(path)
        }
    }
}

/// Write observations with the normalized `Item_name,Date_time,Price` header
pub fn write_csv<W: Write>(writer: W, observations: &[Observation]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for o in observations {
        wtr.serialize(NormalizedRow {
            item_name: &o.item_id,
            date_time: o.timestamp.format(OUTPUT_TIMESTAMP_FORMAT).to_string(),
            price: o.price,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write observations to a CSV file, replacing any existing file
pub fn write_csv_file<P: AsRef<Path>>(path: P, observations: &[Observation]) -> Result<()> {
    write_csv(File::create(path)?, observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_series_sorts_stably() {
        let series = Series::new(
            "Anchor",
            vec![(ts(3, 0), 3.0), (ts(1, 0), 1.0), (ts(2, 0), 2.0), (ts(1, 0), 1.5)],
        )
        .unwrap();

        assert_eq!(series.prices(), &[1.0, 1.5, 2.0, 3.0]);
        assert_eq!(series.distinct_timestamps(), 3);
        assert_eq!(series.first_timestamp(), Some(ts(1, 0)));
        assert_eq!(series.last_timestamp(), Some(ts(3, 0)));
    }

    #[test]
    fn test_non_finite_price_rejected() {
        let result = Series::new("Anchor", vec![(ts(1, 0), f64::NAN)]);
        assert!(matches!(result, Err(PriceError::DataError(_))));
    }

    #[test]
    fn test_mixed_items_rejected() {
        let result = Series::from_observations(vec![
            Observation::new("Anchor", ts(1, 0), 1.0),
            Observation::new("Basic", ts(2, 0), 1.0),
        ]);
        assert!(matches!(result, Err(PriceError::DataError(_))));
    }

    #[test]
    fn test_between_is_inclusive() {
        let series = Series::new(
            "Anchor",
            (1..=5).map(|d| (ts(d, 12), d as f64)).collect(),
        )
        .unwrap();

        let window = series.between(ts(2, 12), ts(4, 12));
        assert_eq!(window.prices(), &[2.0, 3.0, 4.0]);
        assert_eq!(window.item_id(), "Anchor");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-01-02", "13:00:00").unwrap(), ts(2, 13));
        assert_eq!(parse_timestamp("2024-01-02", "13:00").unwrap(), ts(2, 13));
        assert_eq!(parse_timestamp("02/01/2024", " 13:00 ").unwrap(), ts(2, 13));
        assert!(parse_timestamp("yesterday", "noon").is_err());
    }
}
