use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Display format for observation timestamps.
pub const OBSERVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Snapshot of current conditions for a city. Values are metric.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub city: String,
    pub temperature: f64,
    pub humidity: u8,
    pub condition: String,
    pub wind_speed: f64,
    pub icon_url: String,
    pub observed_at: DateTime<Utc>,
}

impl CurrentWeather {
    /// Observation time as `YYYY-MM-DD HH:MM:SS` (UTC).
    pub fn observed_at_text(&self) -> String {
        self.observed_at.format(OBSERVED_AT_FORMAT).to_string()
    }
}

/// One 3-hourly forecast reading as delivered by the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecastEntry {
    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp_text: String,
    pub temperature: f64,
}

impl RawForecastEntry {
    pub fn new(timestamp_text: impl Into<String>, temperature: f64) -> Self {
        Self { timestamp_text: timestamp_text.into(), temperature }
    }

    /// Everything before the first space of the timestamp, or the whole
    /// text when there is no space.
    pub fn date_key(&self) -> &str {
        self.timestamp_text
            .split_once(' ')
            .map_or(self.timestamp_text.as_str(), |(date, _)| date)
    }
}

/// Representative reading for one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: String,
    pub temperature: f64,
}

impl ForecastPoint {
    /// The date bucket parsed as a calendar date, if it is one.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Unit used when presenting temperatures. Records always hold Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
            TemperatureUnit::Kelvin => "kelvin",
        }
    }

    pub const fn all() -> &'static [TemperatureUnit] {
        &[TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit, TemperatureUnit::Kelvin]
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => "K",
        }
    }

    /// Convert a Celsius reading into this unit.
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            TemperatureUnit::Kelvin => celsius + 273.15,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "celsius" | "c" | "metric" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" | "f" | "imperial" => Ok(TemperatureUnit::Fahrenheit),
            "kelvin" | "k" => Ok(TemperatureUnit::Kelvin),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: celsius, fahrenheit, kelvin."
            )),
        }
    }
}
