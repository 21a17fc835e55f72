use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::error::Result;

/// Bounded retry with exponential backoff and jitter.
///
/// Retries only transient errors (`Contention`); every other failure is
/// returned to the caller on the first occurrence. Replaces fixed
/// iteration caps baked into call sites with one tunable policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
    backoff_cap: Duration,
}

impl RetryPolicy {
    /// Creates a policy with at least one attempt.
    pub fn new(max_attempts: u32, backoff_base: Duration, backoff_cap: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
            backoff_cap,
        }
    }

    /// Maximum number of attempts, counting the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `op`, retrying transient failures until the attempt budget is
    /// spent. The delay doubles per retry up to the cap, with up to 50%
    /// random jitter added to decorrelate competing workers.
    pub fn run<T>(&self, label: &'static str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut delay = self.backoff_base;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op() {
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let jitter_ms = rand::thread_rng().gen_range(0..=delay.as_millis() as u64 / 2);
                    let wait = delay + Duration::from_millis(jitter_ms);
                    debug!(
                        op = label,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "contention, backing off"
                    );
                    thread::sleep(wait);
                    delay = (delay * 2).min(self.backoff_cap);
                }
                result => return result,
            }
        }
    }
}
