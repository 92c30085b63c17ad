//! Failure reporting boundary between the weather client and the display layer.
//!
//! Every query either yields a record or `None`. A `None` is always preceded
//! by exactly one error-level log entry describing what went wrong; successful
//! queries log nothing at error level.

use tracing::{error, instrument};

use crate::{
    forecast::reduce_daily,
    model::{CurrentWeather, ForecastPoint},
    provider::WeatherProvider,
};

#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Current conditions, or `None` when the weather is unavailable.
    #[instrument(skip(self))]
    pub async fn current_weather(&self, city: &str) -> Option<CurrentWeather> {
        match self.provider.current(city).await {
            Ok(weather) => Some(weather),
            Err(e) => {
                error!(error = %e, "API request failed");
                None
            }
        }
    }

    /// One forecast point per date, or `None` when the forecast is unavailable.
    #[instrument(skip(self))]
    pub async fn daily_forecast(&self, city: &str) -> Option<Vec<ForecastPoint>> {
        match self.provider.forecast(city).await {
            Ok(entries) => Some(reduce_daily(&entries)),
            Err(e) => {
                error!(error = %e, "API request failed");
                None
            }
        }
    }
}
