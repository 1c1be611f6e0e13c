use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};

pub const DEFAULT_BASE_URL: &str = "https://api.pirateweather.net/forecast";

/// Requests per day granted to a free key.
pub const DEFAULT_DAILY_CAPACITY: u32 = 10_000 / 30;

pub const DEFAULT_FORECAST_TTL_SECS: u64 = 60 * 60;

/// History does not change once recorded, so it is kept longer than forecasts.
pub const DEFAULT_TIME_MACHINE_TTL_SECS: u64 = 24 * 60 * 60;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Tunables for [`WeatherClient`](crate::WeatherClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Local token bucket size, refilled over 24 hours until the server says otherwise
    pub daily_capacity: u32,
    pub forecast_ttl_secs: u64,
    pub time_machine_ttl_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            daily_capacity: DEFAULT_DAILY_CAPACITY,
            forecast_ttl_secs: DEFAULT_FORECAST_TTL_SECS,
            time_machine_ttl_secs: DEFAULT_TIME_MACHINE_TTL_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn forecast_ttl(&self) -> Duration {
        Duration::from_secs(self.forecast_ttl_secs)
    }

    pub fn time_machine_ttl(&self) -> Duration {
        Duration::from_secs(self.time_machine_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.daily_capacity, 333);
        assert_eq!(config.forecast_ttl(), Duration::from_secs(3600));
        assert!(config.time_machine_ttl() >= config.forecast_ttl());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"max_attempts": 5}"#).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
