use std::time::Duration;

use crate::retry::RetryPolicy;

/// Engine tuning knobs.
///
/// The defaults are suitable for moderately contended in-process use; the
/// presets trade lock patience against retry pressure.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bounded wait for the engine write lock before a mutation fails with
    /// `Contention`.
    pub lock_wait: Duration,
    /// Maximum attempts made by the default retry policy.
    pub max_retries: u32,
    /// Initial backoff delay of the default retry policy.
    pub backoff_base: Duration,
    /// Backoff ceiling of the default retry policy.
    pub backoff_cap: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_wait: Duration::from_millis(200),
            max_retries: 8,
            backoff_base: Duration::from_millis(1),
            backoff_cap: Duration::from_millis(50),
        }
    }
}

impl Config {
    /// Patient preset: long lock waits, few retries. Suits workloads with a
    /// small number of long-running writers.
    pub fn contended() -> Self {
        Self {
            lock_wait: Duration::from_secs(2),
            max_retries: 4,
            backoff_base: Duration::from_millis(5),
            backoff_cap: Duration::from_millis(200),
        }
    }

    /// Impatient preset: short lock waits, many retries. Suits stress tests
    /// with many small mutations.
    pub fn stress() -> Self {
        Self {
            lock_wait: Duration::from_millis(20),
            max_retries: 32,
            backoff_base: Duration::from_micros(200),
            backoff_cap: Duration::from_millis(10),
        }
    }

    /// Builds the retry policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.backoff_base, self.backoff_cap)
    }
}
