//! Retry policy: when to re-attempt a failed fetch and how long to wait
//!
//! The policy is a pure function of the configuration plus an injected
//! random source, so tests can make delay selection deterministic.

use crate::config::Config;
use rand::Rng;
use std::time::Duration;

/// Decides whether a failed fetch gets another attempt and how long the
/// worker sleeps before it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per URL (including the first)
    pub max_attempts: u32,
    /// Fixed inter-attempt delay, used when `random_sleep` is off
    pub sleep: Duration,
    /// Lower bound for the randomized delay
    pub min_sleep: Duration,
    /// Upper bound for the randomized delay
    pub max_sleep: Duration,
    /// Draw each delay uniformly from `[min_sleep, max_sleep]`
    pub random_sleep: bool,
}

impl RetryPolicy {
    /// Build the policy from a validated [`Config`]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts,
            sleep: config.fixed_sleep(),
            min_sleep: config.min_sleep(),
            max_sleep: config.max_sleep(),
            random_sleep: config.random_sleep_time,
        }
    }

    /// True while another attempt should be scheduled
    ///
    /// `attempts` is the number of attempts already made. With
    /// `max_attempts == 1` this is false after the first attempt: exactly
    /// one attempt, no retry.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Delay before the next attempt
    ///
    /// Uniformly random in `[min_sleep, max_sleep]` when `random_sleep` is
    /// set, otherwise the fixed `sleep`. The random source is a parameter
    /// rather than ambient state.
    pub fn next_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.random_sleep {
            let secs = rng.gen_range(self.min_sleep.as_secs_f64()..=self.max_sleep.as_secs_f64());
            Duration::from_secs_f64(secs)
        } else {
            self.sleep
        }
    }
}
