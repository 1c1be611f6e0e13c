//! Pirate Weather API client.
//!
//! Every query runs the same pipeline: cache lookup, local rate-limit
//! admission, GET with bounded retry on 5xx, then limiter resync and cache
//! population on success. Concurrent identical queries are not coalesced;
//! each one that misses the cache makes its own request.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::Url;

use crate::cache::ResponseCache;
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::error::WeatherError;
use crate::query::{ForecastOptions, Query, QueryKind};
use crate::rate_limiter::RateLimiter;
use crate::retry::{classify_status, RetryPolicy, StatusClass};
use crate::transport::{HttpTransport, Transport};
use crate::types::ForecastResponse;

pub struct WeatherClient<T = HttpTransport> {
    transport: T,
    api_key: String,
    base_url: Url,
    limiter: RateLimiter,
    cache: ResponseCache<Arc<ForecastResponse>>,
    forecast_ttl: Duration,
    time_machine_ttl: Duration,
    retry: RetryPolicy,
    shutdown: CancellationToken,
}

impl WeatherClient<HttpTransport> {
    /// Create a client with default settings.
    pub fn new(api_key: &str) -> Result<Self, WeatherError> {
        Self::with_config(api_key, ClientConfig::default())
    }

    pub fn with_config(api_key: &str, config: ClientConfig) -> Result<Self, WeatherError> {
        let transport = HttpTransport::new(config.timeout())?;
        Self::with_transport(api_key, config, transport, Arc::new(SystemClock))
    }
}

impl<T: Transport> WeatherClient<T> {
    /// Create a client over any transport and time source.
    pub fn with_transport(
        api_key: &str,
        config: ClientConfig,
        transport: T,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WeatherError> {
        if api_key.trim().is_empty() {
            return Err(WeatherError::Config("API key is required".to_string()));
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| WeatherError::Config(format!("invalid base URL {}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(WeatherError::Config(format!(
                "base URL cannot take a path: {}",
                config.base_url
            )));
        }

        Ok(Self {
            transport,
            api_key: api_key.to_string(),
            base_url,
            limiter: RateLimiter::per_day(config.daily_capacity, Arc::clone(&clock)),
            cache: ResponseCache::new(clock),
            forecast_ttl: config.forecast_ttl(),
            time_machine_ttl: config.time_machine_ttl(),
            retry: config.retry_policy(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Current conditions and forecast for a location.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        options: ForecastOptions,
    ) -> Result<Arc<ForecastResponse>, WeatherError> {
        self.execute(&Query::forecast(latitude, longitude, options))
            .await
    }

    /// Observed weather for a location at a past instant.
    #[instrument(skip(self), level = "info")]
    pub async fn time_machine(
        &self,
        latitude: f64,
        longitude: f64,
        at: DateTime<Utc>,
        options: ForecastOptions,
    ) -> Result<Arc<ForecastResponse>, WeatherError> {
        self.execute(&Query::time_machine(latitude, longitude, at, options))
            .await
    }

    /// Run a query, aborting only if the client is shut down.
    pub async fn execute(&self, query: &Query) -> Result<Arc<ForecastResponse>, WeatherError> {
        self.execute_with_cancel(query, &self.shutdown).await
    }

    /// Run a query that also stops when `cancel` fires, whether waiting on
    /// the network or between retries.
    pub async fn execute_with_cancel(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<Arc<ForecastResponse>, WeatherError> {
        query.validate()?;

        let key = query.cache_key();
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(%key, "Cache hit");
            return Ok(cached);
        }
        tracing::debug!(%key, "Cache miss");

        let url = query.url(&self.base_url, &self.api_key)?;
        let max_attempts = self.retry.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            if cancel.is_cancelled() || self.shutdown.is_cancelled() {
                return Err(WeatherError::Cancelled);
            }

            // Denial is a local decision and ends the call without a retry.
            if !self.limiter.try_consume() {
                tracing::warn!("Local rate limit exhausted, request not sent");
                return Err(WeatherError::RateLimitExceeded);
            }

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WeatherError::Cancelled),
                _ = self.shutdown.cancelled() => return Err(WeatherError::Cancelled),
                result = self.transport.get(&url) => result?,
            };

            match classify_status(response.status) {
                StatusClass::Success => {
                    let forecast: ForecastResponse = serde_json::from_slice(&response.body)?;
                    self.limiter.resynchronize_from_headers(&response.headers);

                    let forecast = Arc::new(forecast);
                    self.cache.set(key, Arc::clone(&forecast), self.ttl_for(query.kind));

                    if attempt > 1 {
                        tracing::info!("Request succeeded after {} retries", attempt - 1);
                    }
                    return Ok(forecast);
                }
                StatusClass::Client(kind) => {
                    tracing::debug!("Client error ({}), not retryable", response.status);
                    return Err(WeatherError::ClientRequest(kind));
                }
                StatusClass::Server if attempt < max_attempts => {
                    tracing::warn!(
                        "Server error {}, attempt {} of {}, retrying in {:?}",
                        response.status,
                        attempt,
                        max_attempts,
                        self.retry.delay
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(WeatherError::Cancelled),
                        _ = self.shutdown.cancelled() => return Err(WeatherError::Cancelled),
                        _ = tokio::time::sleep(self.retry.delay) => {}
                    }
                }
                StatusClass::Server => {
                    tracing::error!(
                        "All {} attempts exhausted, last status {}",
                        max_attempts,
                        response.status
                    );
                    return Err(WeatherError::ServerUnavailable {
                        attempts: max_attempts,
                        status: response.status.as_u16(),
                    });
                }
                StatusClass::Unexpected => {
                    return Err(WeatherError::Api(response.status.as_u16()));
                }
            }
        }
    }

    /// Cancel every in-flight and future query on this client.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down weather client");
        self.shutdown.cancel();
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn cache(&self) -> &ResponseCache<Arc<ForecastResponse>> {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn ttl_for(&self, kind: QueryKind) -> Duration {
        match kind {
            QueryKind::Forecast => self.forecast_ttl,
            QueryKind::TimeMachine(_) => self.time_machine_ttl,
        }
    }
}
