//! Weather client error types.

use std::fmt;

use thiserror::Error;

/// Non-retryable 4xx responses the API documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    BadRequest,
    Unauthorized,
    NotFound,
    QuotaExceeded,
}

impl ClientErrorKind {
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::QuotaExceeded => 429,
        }
    }
}

impl fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::BadRequest => "bad request: invalid latitude or longitude",
            Self::Unauthorized => "unauthorized: invalid API key or insufficient permissions",
            Self::NotFound => "not found: invalid route or missing latitude/longitude",
            Self::QuotaExceeded => "rate limit exceeded: API key has hit the quota for the month",
        };
        f.write_str(message)
    }
}

/// Failure to reach the server or read its response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),
}

#[derive(Error, Debug)]
pub enum WeatherError {
    /// The local token bucket is empty. No request was sent.
    #[error("Rate limit exceeded: local request budget is exhausted")]
    RateLimitExceeded,

    #[error("{0}")]
    ClientRequest(ClientErrorKind),

    #[error("API request failed after {attempts} attempts: server error {status}")]
    ServerUnavailable { attempts: u32, status: u16 },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Error decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API request failed with unexpected status code: {0}")]
    Api(u16),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl WeatherError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimitExceeded => "Too many requests. Please wait a moment.".to_string(),
            Self::ClientRequest(ClientErrorKind::Unauthorized) => {
                "The weather API key was rejected. Check your configuration.".to_string()
            }
            Self::ClientRequest(ClientErrorKind::QuotaExceeded) => {
                "The monthly weather quota has been used up.".to_string()
            }
            Self::ClientRequest(kind) => format!("Weather request rejected: {}", kind),
            Self::ServerUnavailable { .. } => {
                "The weather service is unavailable. Please try again later.".to_string()
            }
            Self::Transport(_) => "Network error. Check your connection.".to_string(),
            Self::Decode(_) | Self::Api(_) => {
                "Received an unexpected response from the weather service.".to_string()
            }
            Self::InvalidQuery(msg) => format!("Invalid location: {}", msg),
            Self::Config(msg) => format!("Weather client misconfigured: {}", msg),
            Self::Cancelled => "The request was cancelled.".to_string(),
        }
    }

    /// Whether trying again later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded
                | Self::ServerUnavailable { .. }
                | Self::Transport(_)
                | Self::ClientRequest(ClientErrorKind::QuotaExceeded)
        )
    }
}
