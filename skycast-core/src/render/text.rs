use std::fmt::Write;

use crate::model::{CurrentWeather, ForecastPoint, TemperatureUnit};

use super::{Render, axis_label, format_temperature};

const CHART_WIDTH: usize = 40;

/// Plain-text renderer for terminals.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    unit: TemperatureUnit,
}

impl TextRenderer {
    pub fn new(unit: TemperatureUnit) -> Self {
        Self { unit }
    }
}

impl Render for TextRenderer {
    fn current(&self, weather: &CurrentWeather) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", weather.city);
        let _ = writeln!(out, "{}", "=".repeat(weather.city.chars().count().max(1)));
        let _ = writeln!(out, "{}", weather.condition);
        let _ = writeln!(out, "Temperature: {}", format_temperature(weather.temperature, self.unit));
        let _ = writeln!(out, "Humidity:    {}%", weather.humidity);
        let _ = writeln!(out, "Wind Speed:  {} m/s", weather.wind_speed);
        let _ = writeln!(out, "Icon:        {}", weather.icon_url);
        let _ = writeln!(out, "Last Updated: {} UTC", weather.observed_at_text());
        out
    }

    fn forecast(&self, points: &[ForecastPoint]) -> String {
        let mut out = String::from("Daily Forecast\n");
        let _ = writeln!(out, "{}", axis_label(self.unit));

        if points.is_empty() {
            out.push_str("(no forecast data)\n");
            return out;
        }

        let temps: Vec<f64> = points.iter().map(|p| self.unit.convert(p.temperature)).collect();
        let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
        let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let label_width = points.iter().map(|p| p.date.chars().count()).max().unwrap_or(0);

        for (point, temp) in points.iter().zip(&temps) {
            let _ = writeln!(
                out,
                "{:<label_width$} |{:<CHART_WIDTH$} {:.2}{}",
                point.date,
                "#".repeat(bar_len(*temp, min, max)),
                temp,
                self.unit.symbol(),
            );
        }

        out
    }

    fn unavailable(&self, what: &str, city: &str) -> String {
        format!("{what} unavailable for '{city}'.\n")
    }
}

/// Bar length in `1..=CHART_WIDTH`, scaled between the coldest and warmest day.
fn bar_len(temp: f64, min: f64, max: f64) -> usize {
    let span = max - min;
    if span <= f64::EPSILON {
        return CHART_WIDTH;
    }
    let scaled = (temp - min) / span * (CHART_WIDTH - 1) as f64;
    1 + scaled.round() as usize
}
