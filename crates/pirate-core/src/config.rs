use anyhow::{Context, Result};
use pirate_weather::{ClientConfig, Units};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "PIRATE_WEATHER_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The client cannot be built from this config
    Error,
    Warning,
}

/// One problem found by [`Config::validate`], keyed by its TOML path.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    issues: Vec<ConfigIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.with_severity(Severity::Warning)
    }

    /// Errors joined with `; `, empty when valid.
    pub fn error_summary(&self) -> String {
        self.errors()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    fn push(&mut self, severity: Severity, field: &'static str, message: impl Into<String>) {
        self.issues.push(ConfigIssue {
            severity,
            field,
            message: message.into(),
        });
    }

    fn error(&mut self, field: &'static str, message: impl Into<String>) {
        self.push(Severity::Error, field, message);
    }

    fn warn(&mut self, field: &'static str, message: impl Into<String>) {
        self.push(Severity::Warning, field, message);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Falls back to `PIRATE_WEATHER_API_KEY` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub client: ClientConfig,

    /// Location used by the example program
    #[serde(default)]
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub units: Units,
}

impl Default for LocationConfig {
    fn default() -> Self {
        // Ottawa
        Self {
            latitude: 45.42,
            longitude: -75.69,
            units: Units::Si,
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating the
    /// default file if it doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged. Critical errors fail the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in validation.warnings() {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_url(&self.client.base_url, "client.base_url", &mut result);

        if self.client.daily_capacity == 0 {
            result.error(
                "client.daily_capacity",
                "Daily capacity must be greater than 0",
            );
        }

        if self.client.max_attempts == 0 {
            result.error("client.max_attempts", "At least one attempt is required");
        } else if self.client.max_attempts > 10 {
            result.warn(
                "client.max_attempts",
                "More than 10 attempts per request will burn through the quota",
            );
        }

        if self.client.forecast_ttl_secs == 0 {
            result.warn("client.forecast_ttl_secs", "Forecast caching disabled (0 seconds)");
        }
        if self.client.time_machine_ttl_secs == 0 {
            result.warn(
                "client.time_machine_ttl_secs",
                "Time machine caching disabled (0 seconds)",
            );
        }

        if self.client.timeout_secs == 0 {
            result.error("client.timeout_secs", "Request timeout must be greater than 0");
        }

        if !(-90.0..=90.0).contains(&self.location.latitude) {
            result.error("location.latitude", "Latitude must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            result.error("location.longitude", "Longitude must be within [-180, 180]");
        }

        if self.resolved_api_key().is_none() {
            result.warn(
                "api_key",
                format!("No API key configured and {} is not set", API_KEY_ENV),
            );
        }

        result
    }

    /// The API key to use, preferring the environment over the file.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    fn validate_url(url_str: &str, field_name: &'static str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the user config directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("pirate");

        Ok(config_dir.join("config.toml"))
    }
}

fn resolve_api_key(from_env: Option<String>, from_file: Option<&str>) -> Option<String> {
    from_env
        .filter(|k| !k.trim().is_empty())
        .or_else(|| from_file.filter(|k| !k.trim().is_empty()).map(str::to_string))
}
