use std::{fs, path::PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use skycast_core::{
    Background, Config, HtmlRenderer, Render, TemperatureUnit, TextRenderer, WeatherService,
    provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather and daily forecast")]
pub struct Cli {
    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and display preferences.
    Configure {
        /// API key; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,

        /// Default display unit: celsius, fahrenheit or kelvin.
        #[arg(long)]
        unit: Option<TemperatureUnit>,
    },

    /// Show current conditions for a city.
    Current {
        city: String,

        /// Display unit; defaults to the configured one.
        #[arg(long)]
        unit: Option<TemperatureUnit>,
    },

    /// Show one temperature per day for the coming days.
    Forecast {
        city: String,

        /// Display unit; defaults to the configured one.
        #[arg(long)]
        unit: Option<TemperatureUnit>,
    },

    /// Show current conditions and the daily forecast together.
    Show {
        city: String,

        /// Display unit; defaults to the configured one.
        #[arg(long)]
        unit: Option<TemperatureUnit>,

        /// Write an HTML dashboard to this path instead of printing text.
        #[arg(long)]
        html: Option<PathBuf>,

        /// Image embedded as the page background (HTML output only).
        #[arg(long, requires = "html")]
        background: Option<PathBuf>,
    },
}

pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key, unit } => configure(api_key, unit),
            Command::Current { city, unit } => {
                let (config, service) = connect()?;
                let renderer = TextRenderer::new(unit.unwrap_or(config.unit));

                let output = match service.current_weather(&city).await {
                    Some(weather) => renderer.current(&weather),
                    None => renderer.unavailable("Weather data", &city),
                };
                print!("{output}");
                Ok(())
            }
            Command::Forecast { city, unit } => {
                let (config, service) = connect()?;
                let renderer = TextRenderer::new(unit.unwrap_or(config.unit));

                let output = match service.daily_forecast(&city).await {
                    Some(points) => renderer.forecast(&points),
                    None => renderer.unavailable("Forecast", &city),
                };
                print!("{output}");
                Ok(())
            }
            Command::Show { city, unit, html, background } => {
                let (config, service) = connect()?;
                let unit = unit.unwrap_or(config.unit);

                let current = service.current_weather(&city).await;
                let forecast = service.daily_forecast(&city).await;

                match html {
                    Some(path) => {
                        let mut renderer = HtmlRenderer::new(unit);
                        if let Some(image) = background {
                            renderer = renderer.with_background(Background::from_file(&image)?);
                        }

                        let page = renderer.page(&city, current.as_ref(), forecast.as_deref());
                        fs::write(&path, page).with_context(|| {
                            format!("Failed to write dashboard: {}", path.display())
                        })?;
                        println!("Dashboard written to {}", path.display());
                    }
                    None => {
                        let renderer = TextRenderer::new(unit);
                        print!("{}", renderer.dashboard(&city, current.as_ref(), forecast.as_deref()));
                    }
                }
                Ok(())
            }
        }
    }
}

fn connect() -> anyhow::Result<(Config, WeatherService)> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    Ok((config, WeatherService::new(provider)))
}

fn configure(api_key: Option<String>, unit: Option<TemperatureUnit>) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let interactive = api_key.is_none();

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("OpenWeather API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key);

    config.unit = match unit {
        Some(unit) => unit,
        None if interactive => Select::new("Temperature unit:", TemperatureUnit::all().to_vec())
            .with_starting_cursor(starting_cursor(config.unit))
            .prompt()
            .context("Failed to read temperature unit")?,
        None => config.unit,
    };

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn starting_cursor(unit: TemperatureUnit) -> usize {
    TemperatureUnit::all().iter().position(|u| *u == unit).unwrap_or(0)
}
