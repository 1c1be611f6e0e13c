//! Query parameters for the forecast and time machine endpoints.
//!
//! A [`Query`] builds both the outbound URL and the cache key, so the two can
//! never disagree about which options make a request distinct.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::WeatherError;

/// Unit system for the returned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Imperial
    Us,
    /// SI
    Si,
    /// SI with km/h wind speed
    Ca,
    /// SI with mph wind speed and miles visibility
    Uk,
}

impl Units {
    pub const ALL: [Units; 4] = [Units::Si, Units::Us, Units::Uk, Units::Ca];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Si => "si",
            Self::Ca => "ca",
            Self::Uk => "uk",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Self::Us),
            "si" => Ok(Self::Si),
            "ca" => Ok(Self::Ca),
            "uk" | "uk2" => Ok(Self::Uk),
            other => Err(WeatherError::InvalidQuery(format!("unknown unit system: {}", other))),
        }
    }
}

/// Response sections that can be left out with `exclude`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Block {
    Currently,
    Minutely,
    Hourly,
    Daily,
    Alerts,
}

impl Block {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Currently => "currently",
            Self::Minutely => "minutely",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Alerts => "alerts",
        }
    }
}

/// Optional request parameters. Unset options are omitted from the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastOptions {
    pub units: Option<Units>,
    pub exclude: BTreeSet<Block>,
    pub extend_hourly: bool,
    pub version: Option<u32>,
}

impl ForecastOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    pub fn exclude(mut self, blocks: impl IntoIterator<Item = Block>) -> Self {
        self.exclude.extend(blocks);
        self
    }

    /// Request 168 hours of hourly data instead of 48.
    pub fn extend_hourly(mut self) -> Self {
        self.extend_hourly = true;
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(units) = self.units {
            pairs.push(("units", units.as_str().to_string()));
        }
        if !self.exclude.is_empty() {
            pairs.push(("exclude", self.exclude_list()));
        }
        if self.extend_hourly {
            pairs.push(("extend", "hourly".to_string()));
        }
        if let Some(version) = self.version {
            pairs.push(("version", version.to_string()));
        }
        pairs
    }

    fn exclude_list(&self) -> String {
        self.exclude
            .iter()
            .map(Block::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Which endpoint a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Forecast,
    TimeMachine(DateTime<Utc>),
}

/// An immutable request description.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub kind: QueryKind,
    pub latitude: f64,
    pub longitude: f64,
    pub options: ForecastOptions,
}

impl Query {
    pub fn forecast(latitude: f64, longitude: f64, options: ForecastOptions) -> Self {
        Self {
            kind: QueryKind::Forecast,
            latitude,
            longitude,
            options,
        }
    }

    pub fn time_machine(latitude: f64, longitude: f64, at: DateTime<Utc>, options: ForecastOptions) -> Self {
        Self {
            kind: QueryKind::TimeMachine(at),
            latitude,
            longitude,
            options,
        }
    }

    /// Reject coordinates the API cannot answer for.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(WeatherError::InvalidQuery(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(WeatherError::InvalidQuery(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Deterministic key over the endpoint, coordinates, timestamp and every
    /// option slot. Unset options are written as `-` so no two distinct
    /// option sets render the same.
    pub fn cache_key(&self) -> String {
        let endpoint = match self.kind {
            QueryKind::Forecast => "forecast".to_string(),
            QueryKind::TimeMachine(at) => format!("timemachine@{}", at.timestamp()),
        };
        let opts = &self.options;
        format!(
            "{}:{}:{}:units={}:exclude={}:extend={}:version={}",
            endpoint,
            normalize(self.latitude),
            normalize(self.longitude),
            opts.units.map_or("-", |u| u.as_str()),
            if opts.exclude.is_empty() { "-".to_string() } else { opts.exclude_list() },
            if opts.extend_hourly { "hourly" } else { "-" },
            opts.version.map_or_else(|| "-".to_string(), |v| v.to_string()),
        )
    }

    /// `{base}/{api_key}/{lat},{lon}[,{unix_time}]?{options}`
    pub fn url(&self, base: &Url, api_key: &str) -> Result<Url, WeatherError> {
        let mut location = format!("{},{}", normalize(self.latitude), normalize(self.longitude));
        if let QueryKind::TimeMachine(at) = self.kind {
            location.push_str(&format!(",{}", at.timestamp()));
        }

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| WeatherError::Config(format!("base URL cannot take a path: {}", base)))?
            .pop_if_empty()
            .push(api_key)
            .push(&location);

        let pairs = self.options.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}

/// Fold `-0.0` into `0.0`; otherwise `Display` is the shortest exact form.
fn normalize(coordinate: f64) -> f64 {
    coordinate + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> Url {
        Url::parse("https://api.pirateweather.net/forecast").unwrap()
    }

    #[test]
    fn test_forecast_url_without_options() {
        let query = Query::forecast(45.42, -75.69, ForecastOptions::new());
        let url = query.url(&base(), "KEY").unwrap();
        assert_eq!(url.as_str(), "https://api.pirateweather.net/forecast/KEY/45.42,-75.69");
    }

    #[test]
    fn test_forecast_url_with_all_options() {
        let options = ForecastOptions::new()
            .units(Units::Si)
            .exclude([Block::Minutely])
            .extend_hourly()
            .version(2);
        let url = Query::forecast(45.42, -75.69, options).url(&base(), "KEY").unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("units".to_string(), "si".to_string()),
                ("exclude".to_string(), "minutely".to_string()),
                ("extend".to_string(), "hourly".to_string()),
                ("version".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_time_machine_url_has_timestamp() {
        let at = Utc.timestamp_opt(1_620_000_000, 0).unwrap();
        let query = Query::time_machine(45.42, -75.69, at, ForecastOptions::new().units(Units::Us));
        let url = query.url(&base(), "KEY").unwrap();
        assert_eq!(url.path(), "/forecast/KEY/45.42,-75.69,1620000000");
        assert_eq!(url.query(), Some("units=us"));
    }

    #[test]
    fn test_exclude_is_comma_joined() {
        let options = ForecastOptions::new().exclude([Block::Hourly, Block::Minutely]);
        let url = Query::forecast(1.0, 2.0, options).url(&base(), "KEY").unwrap();
        let exclude = url
            .query_pairs()
            .find(|(k, _)| k == "exclude")
            .map(|(_, v)| v.into_owned());
        assert_eq!(exclude.as_deref(), Some("minutely,hourly"));
    }

    #[test]
    fn test_cache_key_differs_by_units() {
        let si = Query::forecast(45.42, -75.69, ForecastOptions::new().units(Units::Si));
        let us = Query::forecast(45.42, -75.69, ForecastOptions::new().units(Units::Us));
        assert_ne!(si.cache_key(), us.cache_key());
    }

    #[test]
    fn test_cache_key_differs_by_endpoint_and_time() {
        let at = Utc.timestamp_opt(1_620_000_000, 0).unwrap();
        let forecast = Query::forecast(45.42, -75.69, ForecastOptions::new());
        let past = Query::time_machine(45.42, -75.69, at, ForecastOptions::new());
        let later = Query::time_machine(45.42, -75.69, at + chrono::Duration::seconds(1), ForecastOptions::new());

        assert_ne!(forecast.cache_key(), past.cache_key());
        assert_ne!(past.cache_key(), later.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_close_coordinates() {
        let a = Query::forecast(45.42, -75.69, ForecastOptions::new());
        let b = Query::forecast(45.420_000_1, -75.69, ForecastOptions::new());
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_ignores_exclude_order() {
        let a = ForecastOptions::new().exclude([Block::Minutely, Block::Hourly]);
        let b = ForecastOptions::new().exclude([Block::Hourly, Block::Minutely, Block::Hourly]);
        assert_eq!(
            Query::forecast(1.0, 2.0, a).cache_key(),
            Query::forecast(1.0, 2.0, b).cache_key()
        );
    }

    #[test]
    fn test_cache_key_negative_zero() {
        let a = Query::forecast(0.0, 10.0, ForecastOptions::new());
        let b = Query::forecast(-0.0, 10.0, ForecastOptions::new());
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Query::forecast(91.0, 0.0, ForecastOptions::new()).validate().is_err());
        assert!(Query::forecast(0.0, -180.5, ForecastOptions::new()).validate().is_err());
        assert!(Query::forecast(f64::NAN, 0.0, ForecastOptions::new()).validate().is_err());
        assert!(Query::forecast(-90.0, 180.0, ForecastOptions::new()).validate().is_ok());
    }

    #[test]
    fn test_units_from_str() {
        assert_eq!("SI".parse::<Units>().unwrap(), Units::Si);
        assert_eq!("uk2".parse::<Units>().unwrap(), Units::Uk);
        assert!("metric".parse::<Units>().is_err());
    }
}
