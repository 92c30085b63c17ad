use crate::{
    Config, CurrentWeather, RawForecastEntry, WeatherError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::{self, Debug};

pub mod openweather;

/// Remote endpoints queried by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    /// Path segment appended to the provider base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current weather",
            Endpoint::Forecast => "5-day forecast",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `city`.
    async fn current(&self, city: &str) -> Result<CurrentWeather, WeatherError>;

    /// Raw 3-hourly forecast entries for `city`, in the order the service sent them.
    async fn forecast(&self, city: &str) -> Result<Vec<RawForecastEntry>, WeatherError>;
}

/// Reject blank city names before going to the network.
pub(crate) fn validate_city(city: &str) -> Result<&str, WeatherError> {
    let trimmed = city.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::EmptyCity);
    }
    Ok(trimmed)
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `skycast configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider = OpenWeatherProvider::new(api_key.to_owned(), config)?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Current.path(), "weather");
        assert_eq!(Endpoint::Forecast.path(), "forecast");
        assert_eq!(Endpoint::Forecast.to_string(), "5-day forecast");
    }

    #[test]
    fn blank_city_is_rejected() {
        assert!(matches!(validate_city(""), Err(WeatherError::EmptyCity)));
        assert!(matches!(validate_city("   "), Err(WeatherError::EmptyCity)));
        assert_eq!(validate_city("  Oslo ").unwrap(), "Oslo");
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("Hint: run `skycast configure`"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
