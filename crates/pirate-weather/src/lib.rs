//! Pirate Weather API client
//!
//! Fetches forecasts and historical ("time machine") observations while
//! staying inside the account's request quota. Responses are cached per
//! query, requests pass a local token bucket that follows the server's
//! `Ratelimit-*` headers, and 5xx responses are retried a bounded number of
//! times.

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod query;
pub mod rate_limiter;
pub mod retry;
pub mod transport;
pub mod types;
pub mod units;

pub use cache::ResponseCache;
pub use client::WeatherClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ClientConfig;
pub use error::{ClientErrorKind, TransportError, WeatherError};
pub use query::{Block, ForecastOptions, Query, QueryKind, Units};
pub use rate_limiter::{RateLimitSnapshot, RateLimiter};
pub use retry::{classify_status, RetryPolicy, StatusClass};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::*;
pub use tokio_util::sync::CancellationToken;
