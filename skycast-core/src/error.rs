use reqwest::StatusCode;
use thiserror::Error;

use crate::provider::Endpoint;

/// Failure of a single weather query.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City name must not be empty")]
    EmptyCity,

    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Failed to send request to OpenWeather ({endpoint}): {source}")]
    Network {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Upstream { endpoint: Endpoint, status: StatusCode, body: String },

    #[error("Failed to parse OpenWeather {endpoint} response: {reason}")]
    MalformedResponse { endpoint: Endpoint, reason: String },
}

impl WeatherError {
    pub(crate) fn malformed(endpoint: Endpoint, reason: impl ToString) -> Self {
        WeatherError::MalformedResponse { endpoint, reason: reason.to_string() }
    }
}
