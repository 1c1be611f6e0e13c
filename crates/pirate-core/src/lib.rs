pub mod config;

pub use config::{Config, ConfigIssue, LocationConfig, Severity, ValidationResult, API_KEY_ENV};

use anyhow::{Context, Result};
use pirate_weather::WeatherClient;

/// Initialize tracing/logging. `RUST_LOG` overrides the default `info` level.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Pirate Weather client initialized");
    Ok(())
}

/// Build an HTTP-backed client from configuration.
pub fn build_client(config: &Config) -> Result<WeatherClient> {
    let api_key = config.resolved_api_key().with_context(|| {
        format!(
            "{} environment variable is not set and no api_key is configured",
            API_KEY_ENV
        )
    })?;

    WeatherClient::with_config(&api_key, config.client.clone())
        .context("Failed to create weather client")
}
