use std::{fs, path::Path};

use anyhow::{Context, Result};
use askama::Template;
use base64::Engine;
use plotters::prelude::*;
use thiserror::Error;
use tracing::warn;

use crate::model::{CurrentWeather, ForecastPoint, TemperatureUnit};

use super::{Render, axis_label, format_temperature};

const CHART_SIZE: (u32, u32) = (800, 500);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to draw forecast chart: {0}")]
    Plotter(String),
}

/// Image embedded into the page as a CSS `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Background {
    mime: &'static str,
    encoded: String,
}

impl Background {
    pub fn from_bytes(bytes: &[u8], mime: &'static str) -> Self {
        Self { mime, encoded: base64::engine::general_purpose::STANDARD.encode(bytes) }
    }

    /// Read an image file; the MIME type is guessed from its extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read background image: {}", path.display()))?;
        Ok(Self::from_bytes(&bytes, mime_for(path)))
    }

    pub fn css(&self) -> String {
        format!(
            "body {{\n    background-image: url(\"data:{};base64,{}\");\n    \
             background-size: cover;\n    background-position: center;\n    \
             background-repeat: no-repeat;\n}}\n",
            self.mime, self.encoded
        )
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    }
}

#[derive(Template)]
#[template(path = "card.html")]
struct CardTemplate<'a> {
    weather: &'a CurrentWeather,
    temperature: String,
    updated: String,
}

#[derive(Template)]
#[template(path = "notice.html")]
struct NoticeTemplate<'a> {
    class: &'a str,
    message: String,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    city: &'a str,
    background_css: String,
    body: String,
}

/// Renders cards and charts as HTML fragments, or a whole page via [`HtmlRenderer::page`].
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    unit: TemperatureUnit,
    background: Option<Background>,
}

impl HtmlRenderer {
    pub fn new(unit: TemperatureUnit) -> Self {
        Self { unit, background: None }
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    /// Standalone HTML document containing the dashboard for `city`.
    pub fn page(
        &self,
        city: &str,
        current: Option<&CurrentWeather>,
        forecast: Option<&[ForecastPoint]>,
    ) -> String {
        PageTemplate {
            city,
            background_css: self.background.as_ref().map(Background::css).unwrap_or_default(),
            body: self.dashboard(city, current, forecast),
        }
        .to_string()
    }

    /// Line chart of the daily temperatures as an SVG document.
    pub fn chart_svg(&self, points: &[ForecastPoint]) -> Result<String, ChartError> {
        let temps: Vec<f64> = points.iter().map(|p| self.unit.convert(p.temperature)).collect();
        let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
        let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let pad = ((max - min) * 0.1).max(1.0);

        let series: Vec<(SegmentValue<usize>, f64)> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| (SegmentValue::CenterOf(i), *t))
            .collect();

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(plotter_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("5-Day Forecast", ("sans-serif", 20))
                .margin(20)
                .x_label_area_size(90)
                .y_label_area_size(60)
                .build_cartesian_2d((0..points.len()).into_segmented(), (min - pad)..(max + pad))
                .map_err(plotter_error)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(points.len())
                .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
                .x_label_formatter(&|v| match v {
                    SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                        points.get(*i).map(|p| p.date.clone()).unwrap_or_default()
                    }
                    SegmentValue::Last => String::new(),
                })
                .x_desc("Date")
                .y_desc(axis_label(self.unit))
                .axis_desc_style(("sans-serif", 15))
                .draw()
                .map_err(plotter_error)?;

            chart
                .draw_series(LineSeries::new(series.iter().cloned(), &BLUE))
                .map_err(plotter_error)?;
            chart
                .draw_series(
                    series.iter().map(|(x, y)| Circle::new((x.clone(), *y), 4, BLUE.filled())),
                )
                .map_err(plotter_error)?;

            root.present().map_err(plotter_error)?;
        }

        Ok(svg)
    }

    fn notice(&self, class: &str, message: String) -> String {
        NoticeTemplate { class, message }.to_string()
    }
}

fn plotter_error(e: impl std::fmt::Display) -> ChartError {
    ChartError::Plotter(e.to_string())
}

impl Render for HtmlRenderer {
    fn current(&self, weather: &CurrentWeather) -> String {
        CardTemplate {
            weather,
            temperature: format_temperature(weather.temperature, self.unit),
            updated: weather.observed_at_text(),
        }
        .to_string()
    }

    fn forecast(&self, points: &[ForecastPoint]) -> String {
        if points.is_empty() {
            return self.notice("forecast-empty", "No forecast data.".to_string());
        }

        match self.chart_svg(points) {
            Ok(svg) => svg,
            Err(e) => {
                warn!(error = %e, "Falling back to a notice");
                self.notice("unavailable", "Forecast chart could not be drawn.".to_string())
            }
        }
    }

    fn unavailable(&self, what: &str, city: &str) -> String {
        self.notice("unavailable", format!("{what} unavailable for {city}."))
    }
}
