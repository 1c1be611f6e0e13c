//! Token-bucket admission gate for outbound API calls.
//!
//! The bucket refills continuously rather than resetting at window
//! boundaries. After each successful response the server's quota headers
//! replace the local model, so usage from other clients sharing the same key
//! is accounted for.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;

use crate::clock::Clock;

pub const HEADER_LIMIT: &str = "ratelimit-limit";
pub const HEADER_REMAINING: &str = "ratelimit-remaining";
pub const HEADER_RESET: &str = "ratelimit-reset";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Shortest refill window accepted on resync, in seconds.
const MIN_RESYNC_WINDOW_SECS: f64 = 1.0;

/// Point-in-time view of the bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitSnapshot {
    pub capacity: u32,
    pub tokens: f64,
    pub refill_per_second: f64,
}

#[derive(Debug)]
struct Bucket {
    capacity: u32,
    tokens: f64,
    refill_per_second: f64,
    last_refill: DateTime<Utc>,
}

impl Bucket {
    fn refill(&mut self, now: DateTime<Utc>) {
        let gap = now - self.last_refill;
        let elapsed = match gap.num_nanoseconds() {
            Some(nanos) => nanos as f64 / 1e9,
            None => gap.num_milliseconds() as f64 / 1000.0,
        };
        // A clock that moved backwards adds nothing; keep the old mark so the
        // forward gap is still credited later.
        if elapsed <= 0.0 {
            return;
        }
        self.tokens = (self.tokens + elapsed * self.refill_per_second).min(f64::from(self.capacity));
        self.last_refill = now;
    }
}

/// Client-side token bucket, shared by every query issued through one client.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a full bucket holding `capacity` tokens.
    pub fn new(capacity: u32, refill_per_second: f64, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            bucket: Mutex::new(Bucket {
                capacity,
                tokens: f64::from(capacity),
                refill_per_second: refill_per_second.max(0.0),
                last_refill: now,
            }),
            clock,
        }
    }

    /// Create a bucket that refills `capacity` tokens over 24 hours.
    pub fn per_day(capacity: u32, clock: Arc<dyn Clock>) -> Self {
        Self::new(capacity, f64::from(capacity) / SECONDS_PER_DAY, clock)
    }

    /// Take one token if available.
    ///
    /// Refills lazily from the time elapsed since the last check. Denial has
    /// no side effect beyond that refill.
    pub fn try_consume(&self) -> bool {
        let now = self.clock.now();
        let mut bucket = self.bucket.lock();
        bucket.refill(now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            tracing::debug!(tokens = bucket.tokens, "Rate limiter admitted request");
            true
        } else {
            tracing::debug!(tokens = bucket.tokens, "Rate limiter denied request");
            false
        }
    }

    /// Replace the local model with the server's ledger.
    ///
    /// The refill rate becomes `limit / seconds_until(reset_at)`, with the
    /// interval clamped to at least one second. `remaining` is capped at
    /// `limit`, so a zero limit denies even when `remaining` is positive.
    pub fn resynchronize(&self, limit: u32, remaining: u32, reset_at: DateTime<Utc>) {
        let now = self.clock.now();
        let window = ((reset_at - now).num_milliseconds() as f64 / 1000.0).max(MIN_RESYNC_WINDOW_SECS);

        let mut bucket = self.bucket.lock();
        bucket.capacity = limit;
        bucket.tokens = f64::from(remaining.min(limit));
        bucket.refill_per_second = f64::from(limit) / window;
        bucket.last_refill = now;

        tracing::debug!(
            limit,
            remaining,
            refill_per_second = bucket.refill_per_second,
            "Rate limiter resynchronized"
        );
    }

    /// Resynchronize from `Ratelimit-*` response headers.
    ///
    /// Returns `false` and leaves the bucket untouched unless all three
    /// headers are present and parse.
    pub fn resynchronize_from_headers(&self, headers: &HeaderMap) -> bool {
        let limit = header_i64(headers, HEADER_LIMIT);
        let remaining = header_i64(headers, HEADER_REMAINING);
        let reset = header_i64(headers, HEADER_RESET).and_then(|secs| DateTime::from_timestamp(secs, 0));

        match (limit, remaining, reset) {
            (Some(limit), Some(remaining), Some(reset_at)) => {
                self.resynchronize(clamp_u32(limit), clamp_u32(remaining), reset_at);
                true
            }
            _ => {
                tracing::debug!("Quota headers missing or malformed, keeping local budget");
                false
            }
        }
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        let bucket = self.bucket.lock();
        RateLimitSnapshot {
            capacity: bucket.capacity,
            tokens: bucket.tokens,
            refill_per_second: bucket.refill_per_second,
        }
    }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
