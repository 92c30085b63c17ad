//! Presentation of weather records.
//!
//! Renderers take the normalized records and return the finished output as a
//! string; writing it anywhere is up to the caller.

use crate::model::{CurrentWeather, ForecastPoint, TemperatureUnit};

pub mod html;
pub mod text;

pub use html::{Background, HtmlRenderer};
pub use text::TextRenderer;

pub trait Render {
    /// Card for the current conditions.
    fn current(&self, weather: &CurrentWeather) -> String;

    /// Chart of one temperature per day.
    fn forecast(&self, points: &[ForecastPoint]) -> String;

    /// Placeholder shown when a query returned no result.
    fn unavailable(&self, what: &str, city: &str) -> String;

    /// Card followed by chart, substituting placeholders for missing records.
    fn dashboard(
        &self,
        city: &str,
        current: Option<&CurrentWeather>,
        forecast: Option<&[ForecastPoint]>,
    ) -> String {
        let card = match current {
            Some(weather) => self.current(weather),
            None => self.unavailable("Weather data", city),
        };
        let chart = match forecast {
            Some(points) => self.forecast(points),
            None => self.unavailable("Forecast", city),
        };
        format!("{card}\n{chart}")
    }
}

/// Temperature converted to `unit` with two decimals and its symbol.
pub(crate) fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{:.2}{}", unit.convert(celsius), unit.symbol())
}

pub(crate) fn axis_label(unit: TemperatureUnit) -> String {
    format!("Temperature ({})", unit.symbol())
}
