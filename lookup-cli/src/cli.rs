use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use lookup_core::{Config, LookupOutcome, OpenWeatherApi, SearchQuery, WeatherLookup};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about = "City weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "Lima".
        city: String,

        /// Country code, e.g. "PE".
        country: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, country } => show(city, country).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

async fn show(city: String, country: String) -> anyhow::Result<()> {
    let config = Config::load()?;

    // Environment variable wins over the config file.
    let api_key = std::env::var("OPENWEATHER_API_KEY")
        .ok()
        .or_else(|| config.api_key().map(str::to_owned))
        .context(
            "No API key configured.\n\
             Hint: run `weather-lookup configure` or set OPENWEATHER_API_KEY.",
        )?;

    let http = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let lookup = WeatherLookup::new(OpenWeatherApi::with_client(api_key, http));

    match lookup.fetch_weather(SearchQuery::new(city, country)).await {
        LookupOutcome::Found => {
            let report = lookup.weather().await;
            println!("{}", report.name);
            println!("  temperature: {:.1} °C", kelvin_to_celsius(report.main.temp));
            println!(
                "  min / max:   {:.1} / {:.1} °C",
                kelvin_to_celsius(report.main.temp_min),
                kelvin_to_celsius(report.main.temp_max),
            );
            Ok(())
        }
        LookupOutcome::NotFound => {
            println!("No match for that city/country.");
            Ok(())
        }
        LookupOutcome::ValidationFailed => {
            anyhow::bail!("Weather service returned an unexpected payload")
        }
        LookupOutcome::TransportFailed => {
            anyhow::bail!("Weather request failed; re-run with RUST_LOG=debug for details")
        }
        // A single sequential call is never overtaken.
        LookupOutcome::Superseded => Ok(()),
    }
}

fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - 273.15
}
