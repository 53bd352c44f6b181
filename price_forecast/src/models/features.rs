//! Feature rows for the seasonal trend regression
//!
//! Row layout: `[1, days_since_start, weekday indicators.., hour indicators..]`.
//! Indicator columns come from a vocabulary captured at fit time, so rows
//! built later for future timestamps always have the fitted width.

use crate::data::Timestamp;
use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Which calendar indicators enter the regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalFeatures {
    /// Trend only
    None,
    /// Trend plus one indicator per weekday
    #[default]
    DayOfWeek,
    /// Trend plus weekday and hour-of-day indicators
    DayOfWeekAndHour,
}

impl SeasonalFeatures {
    pub fn uses_weekday(&self) -> bool {
        matches!(self, SeasonalFeatures::DayOfWeek | SeasonalFeatures::DayOfWeekAndHour)
    }

    pub fn uses_hour(&self) -> bool {
        matches!(self, SeasonalFeatures::DayOfWeekAndHour)
    }
}

/// Categories seen at fit time, in calendar order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeasonalVocabulary {
    weekdays: Vec<Weekday>,
    hours: Vec<u32>,
}

impl SeasonalVocabulary {
    /// Collect the distinct weekdays and hours present in `timestamps`
    pub fn fit(timestamps: &[Timestamp], features: SeasonalFeatures) -> Self {
        let mut weekdays = Vec::new();
        let mut hours = Vec::new();

        if features.uses_weekday() {
            let mut seen = [false; 7];
            for ts in timestamps {
                seen[ts.weekday().num_days_from_monday() as usize] = true;
            }
            weekdays = WEEK
                .iter()
                .copied()
                .filter(|d| seen[d.num_days_from_monday() as usize])
                .collect();
        }

        if features.uses_hour() {
            let mut seen = [false; 24];
            for ts in timestamps {
                seen[ts.hour() as usize] = true;
            }
            hours = (0..24u32).filter(|h| seen[*h as usize]).collect();
        }

        Self { weekdays, hours }
    }

    /// Weekday categories, Monday first
    pub fn weekdays(&self) -> &[Weekday] {
        &self.weekdays
    }

    /// Hour-of-day categories, ascending
    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    /// Number of indicator columns
    pub fn width(&self) -> usize {
        self.weekdays.len() + self.hours.len()
    }

    /// Append the one-hot indicators for `ts`.
    ///
    /// A weekday or hour that was not seen at fit time leaves its group all zero.
    pub fn encode_into(&self, ts: Timestamp, row: &mut Vec<f64>) {
        let weekday = ts.weekday();
        row.extend(
            self.weekdays
                .iter()
                .map(|d| if *d == weekday { 1.0 } else { 0.0 }),
        );

        let hour = ts.hour();
        row.extend(self.hours.iter().map(|h| if *h == hour { 1.0 } else { 0.0 }));
    }

    /// Column names of the indicators, e.g. `Day_Monday`, `Hour_13`
    pub fn column_names(&self) -> Vec<String> {
        self.weekdays
            .iter()
            .map(|d| format!("Day_{}", weekday_name(*d)))
            .chain(self.hours.iter().map(|h| format!("Hour_{}", h)))
            .collect()
    }
}

/// Builds design rows relative to a fixed origin
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBuilder {
    origin: Timestamp,
    vocabulary: SeasonalVocabulary,
}

impl FeatureBuilder {
    /// Capture the origin and vocabulary from the training timestamps.
    ///
    /// `timestamps` must be sorted and non-empty; the first one is the origin.
    pub fn fit(timestamps: &[Timestamp], features: SeasonalFeatures) -> Option<Self> {
        let origin = *timestamps.first()?;
        Some(Self {
            origin,
            vocabulary: SeasonalVocabulary::fit(timestamps, features),
        })
    }

    /// Earliest training timestamp
    pub fn origin(&self) -> Timestamp {
        self.origin
    }

    /// Fit-time indicator vocabulary
    pub fn vocabulary(&self) -> &SeasonalVocabulary {
        &self.vocabulary
    }

    /// Fractional days from the origin to `ts`
    pub fn days_since_start(&self, ts: Timestamp) -> f64 {
        (ts - self.origin).num_milliseconds() as f64 / MILLIS_PER_DAY
    }

    /// Number of columns in every row, intercept included
    pub fn width(&self) -> usize {
        2 + self.vocabulary.width()
    }

    /// Design row for one timestamp
    pub fn row(&self, ts: Timestamp) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(self.days_since_start(ts));
        self.vocabulary.encode_into(ts, &mut row);
        row
    }

    /// Column names matching [`FeatureBuilder::row`]
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec!["intercept".to_string(), "days_since_start".to_string()];
        names.extend(self.vocabulary.column_names());
        names
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
