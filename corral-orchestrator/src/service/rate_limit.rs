//! Per-caller rate limiting
//!
//! One token bucket per verified login. Buckets refill continuously at the
//! configured rate up to the burst size.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use super::{OrchestratorError, Result};

const LIMIT_REACHED: &str =
    "You have reached maximum request limit. Please try again in a few seconds.";

/// Table size past which idle buckets are swept
const MAX_TRACKED_CALLERS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    refreshed: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    burst: f64,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    /// `rate` tokens per second, at most `burst` banked
    ///
    /// Non-positive values are raised to the smallest usable setting.
    pub fn new(rate: f64, burst: u32) -> Self {
        Self {
            rate: if rate.is_finite() && rate > 0.0 { rate } else { f64::MIN_POSITIVE },
            burst: f64::from(burst.max(1)),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Take one token for `login`
    pub fn admit(&self, login: &str) -> Result<()> {
        self.admit_at(login, Instant::now())
    }

    fn admit_at(&self, login: &str, now: Instant) -> Result<()> {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);

        if buckets.len() >= MAX_TRACKED_CALLERS && !buckets.contains_key(login) {
            self.evict_idle(&mut buckets, now);
        }

        let bucket = buckets.entry(login.to_string()).or_insert(Bucket {
            tokens: self.burst,
            refreshed: now,
        });
        self.refill(bucket, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            tracing::warn!(login, "Rate limit reached");
            Err(OrchestratorError::TooManyRequests(LIMIT_REACHED.to_string()))
        }
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        let elapsed = now.saturating_duration_since(bucket.refreshed).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.refreshed = now;
    }

    /// Drop buckets that would be full by now; they carry no information
    fn evict_idle(&self, buckets: &mut HashMap<String, Bucket>, now: Instant) {
        let before = buckets.len();
        buckets.retain(|_, bucket| {
            let elapsed = now.saturating_duration_since(bucket.refreshed).as_secs_f64();
            bucket.tokens + elapsed * self.rate < self.burst
        });
        tracing::debug!(evicted = before - buckets.len(), "Swept idle rate limit buckets");
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
