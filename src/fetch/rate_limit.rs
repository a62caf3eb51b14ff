//! Per-indexer request rate limiting
//!
//! Each indexer instance owns one limiter; candidates within a run are
//! processed sequentially against the limiter's clock. The limiter is not
//! safe to share across concurrent callers; concurrent indexers for
//! different platforms each get their own instance.

use std::time::{Duration, Instant};

/// Enforces a minimum interval between consecutive requests
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between requests; None disables limiting
    min_interval: Option<Duration>,

    /// When the previous `wait_if_needed` call returned
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter for the given requests-per-second budget
    ///
    /// A zero or negative rate disables limiting entirely.
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second > 0.0 && requests_per_second.is_finite() {
            Some(Duration::from_secs_f64(1.0 / requests_per_second))
        } else {
            None
        };

        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Blocks until the minimum interval since the previous call has elapsed
    ///
    /// The first call never waits.
    pub async fn wait_if_needed(&mut self) {
        if let (Some(interval), Some(last)) = (self.min_interval, self.last_request) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }

        self.last_request = Some(Instant::now());
    }

    /// Whether limiting is active
    pub fn is_enabled(&self) -> bool {
        self.min_interval.is_some()
    }
}
