//! Daily reduction of the 3-hourly forecast feed.

use std::collections::HashSet;

use crate::model::{ForecastPoint, RawForecastEntry};

/// Collapse a chronological list of forecast entries into one point per date.
///
/// The first reading seen for a date wins; later readings for the same date
/// are dropped. Output order is the order in which dates first appear.
/// Timestamps without a space are bucketed under their whole text.
pub fn reduce_daily(entries: &[RawForecastEntry]) -> Vec<ForecastPoint> {
    let mut seen = HashSet::new();

    entries
        .iter()
        .filter(|&entry| seen.insert(entry.date_key()))
        .map(|entry| ForecastPoint {
            date: entry.date_key().to_string(),
            temperature: entry.temperature,
        })
        .collect()
}
