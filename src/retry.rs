//! Whole-call retry for one source fetch.
//!
//! A source that fails outright (a strict date that no longer parses, a
//! blocked JSON endpoint, a dropped connection) is retried as a whole after a
//! fixed pause. Failures are logged with attempt counters and timings; after
//! the last attempt the caller gets `None` and moves on to the next source.

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Default number of attempts, first try included.
pub const DEFAULT_ATTEMPTS: usize = 2;
/// Default pause between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Fixed-delay retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first; zero is treated as one.
    pub attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: usize, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// # Arguments
    ///
    /// * `label` - Name logged with every failure (usually the source name)
    /// * `op` - Builds a fresh future for each attempt
    ///
    /// # Returns
    ///
    /// The first successful value, or `None` once every attempt failed.
    #[instrument(level = "info", skip_all, fields(%label, attempts = self.attempts))]
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Option<T>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max = self.attempts.max(1);
        let total_t0 = Instant::now();

        for attempt in 1..=max {
            let attempt_t0 = Instant::now();
            match op().await {
                Ok(value) => return Some(value),
                Err(e) if attempt < max => {
                    warn!(
                        attempt,
                        max,
                        elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64,
                        delay = ?self.delay,
                        error = %e,
                        "Attempt failed; retrying"
                    );
                    sleep(self.delay).await;
                }
                Err(e) => {
                    error!(
                        attempt,
                        max,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        error = %e,
                        "All attempts failed"
                    );
                }
            }
        }
        None
    }
}
