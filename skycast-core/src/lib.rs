//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap client behind the `WeatherProvider` trait
//! - Daily reduction of the 3-hourly forecast feed
//! - Text and HTML renderers for the normalized records
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod render;
pub mod service;

pub use config::Config;
pub use error::WeatherError;
pub use forecast::reduce_daily;
pub use model::{CurrentWeather, ForecastPoint, RawForecastEntry, TemperatureUnit};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use render::{Background, HtmlRenderer, Render, TextRenderer};
pub use service::WeatherService;
