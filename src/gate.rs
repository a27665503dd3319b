//! Process-wide cap on simultaneously open rendering sessions.
//!
//! Every orchestration holds a [`GatePermit`] from just before it opens a
//! session until just after it closes it. Dropping the permit releases the
//! slot, so early returns and error paths give it back too.

use rand::{Rng, rng};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Default number of sessions allowed at once.
pub const DEFAULT_CAPACITY: usize = 3;

/// Counting admission control shared by all orchestrations.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    jitter: Option<RangeInclusive<Duration>>,
}

/// A held slot. Released on drop.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGate {
    /// A gate admitting `capacity` sessions (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            jitter: None,
        }
    }

    /// Sleep a random duration in `range` after admission, before the
    /// session is opened, so concurrent launches do not fire in lockstep.
    pub fn with_launch_jitter(mut self, range: RangeInclusive<Duration>) -> Self {
        self.jitter = Some(range);
        self
    }

    /// Wait for a free slot, then apply the launch jitter.
    #[instrument(level = "debug", skip_all, fields(capacity = self.capacity))]
    pub async fn acquire(&self) -> GatePermit {
        let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            // The semaphore is never closed while a gate handle exists.
            Err(_) => unreachable!("concurrency gate semaphore closed"),
        };
        if let Some(range) = &self.jitter {
            let delay = random_between(range);
            debug!(?delay, "Launch jitter");
            sleep(delay).await;
        }
        GatePermit { _permit: permit }
    }
}

impl Default for ConcurrencyGate {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn random_between(range: &RangeInclusive<Duration>) -> Duration {
    let (lo, hi) = (range.start().as_millis() as u64, range.end().as_millis() as u64);
    if hi <= lo {
        return Duration::from_millis(lo);
    }
    let ms: u64 = rng().random_range(lo..=hi);
    Duration::from_millis(ms)
}
