use std::{fmt, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    Config, CurrentWeather, RawForecastEntry, WeatherError,
    provider::{Endpoint, validate_city},
};

use super::WeatherProvider;

/// Unit system requested from the API. Records are always metric.
const UNITS: &str = "metric";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    icon_base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// Build a provider using the endpoints and timeout from `config`.
    ///
    /// The same timeout bounds both current-conditions and forecast requests.
    pub fn new(api_key: String, config: &Config) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(WeatherError::Client)?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            icon_base_url: config.icon_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn icon_url(&self, icon: &str) -> String {
        format!("{}/{icon}@2x.png", self.icon_base_url)
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint, city: &str) -> Result<T, WeatherError> {
        let city = validate_city(city)?;
        let url = format!("{}/{}", self.base_url, endpoint.path());

        debug!(%url, city, "Requesting OpenWeather {endpoint}");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", UNITS)])
            .send()
            .await
            .map_err(|source| WeatherError::Network { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Network { endpoint, source })?;

        if !status.is_success() {
            return Err(WeatherError::Upstream { endpoint, status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::malformed(endpoint, e))
    }
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .field("icon_base_url", &self.icon_base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl OpenWeatherProvider {
    fn map_current(&self, parsed: OwCurrentResponse) -> Result<CurrentWeather, WeatherError> {
        let weather = parsed
            .weather
            .first()
            .ok_or_else(|| WeatherError::malformed(Endpoint::Current, "no weather condition present"))?;

        let observed_at = unix_to_utc(parsed.dt).ok_or_else(|| {
            WeatherError::malformed(Endpoint::Current, format!("timestamp {} out of range", parsed.dt))
        })?;

        Ok(CurrentWeather {
            city: parsed.name,
            temperature: parsed.main.temp,
            humidity: parsed.main.humidity,
            condition: title_case(&weather.description),
            wind_speed: parsed.wind.speed,
            icon_url: self.icon_url(&weather.icon),
            observed_at,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let parsed: OwCurrentResponse = self.fetch(Endpoint::Current, city).await?;
        self.map_current(parsed)
    }

    async fn forecast(&self, city: &str) -> Result<Vec<RawForecastEntry>, WeatherError> {
        let parsed: OwForecastResponse = self.fetch(Endpoint::Forecast, city).await?;

        Ok(parsed
            .list
            .into_iter()
            .map(|entry| RawForecastEntry::new(entry.dt_txt, entry.main.temp))
            .collect())
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
