//! Configuration types for image-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Run configuration
///
/// An immutable snapshot of the run parameters. Every field has a default so
/// `Config::default()` works out of the box; deserialization fills missing
/// fields the same way. Call [`Config::validate`] before starting a run —
/// an invalid combination is the only fatal error class.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Log debug information (consumed by the subscriber setup, not the engine)
    #[serde(default)]
    pub debug: bool,

    /// Text file containing one URL per line (default: empty; reading fails fast)
    #[serde(default)]
    pub input_urls: PathBuf,

    /// Folder where downloaded images are saved (default: "images")
    #[serde(default = "default_output_folder")]
    pub output_folder: PathBuf,

    /// Maximum fetch attempts per URL before it is marked failed (default: 5, must be >= 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-worker cap on successfully downloaded images; non-positive = unbounded (default: -1)
    #[serde(default = "default_max_images")]
    pub max_images: i64,

    /// Number of concurrent workers pulling from the shared queue (default: 1, must be >= 1)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Fixed delay in seconds between attempts when `random_sleep_time` is off (default: 1)
    #[serde(default = "default_sleep_time")]
    pub sleep_time: u64,

    /// Lower bound in seconds for the randomized inter-attempt delay (default: 0)
    #[serde(default)]
    pub min_sleep_time: u64,

    /// Upper bound in seconds for the randomized inter-attempt delay (default: 5)
    #[serde(default = "default_max_sleep_time")]
    pub max_sleep_time: u64,

    /// Draw each inter-attempt delay uniformly from `[min_sleep_time, max_sleep_time]`
    /// instead of using the fixed `sleep_time` (default: false)
    #[serde(default)]
    pub random_sleep_time: bool,

    /// Shuffle the URL list before enqueueing (default: false)
    #[serde(default)]
    pub shuffle_urls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            input_urls: PathBuf::new(),
            output_folder: default_output_folder(),
            max_attempts: default_max_attempts(),
            max_images: default_max_images(),
            max_workers: default_max_workers(),
            sleep_time: default_sleep_time(),
            min_sleep_time: 0,
            max_sleep_time: default_max_sleep_time(),
            random_sleep_time: false,
            shuffle_urls: false,
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `max_attempts` or `max_workers` is zero,
    /// or if `random_sleep_time` is set with `min_sleep_time > max_sleep_time`.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::config(
                "max_attempts must be at least 1",
                "max_attempts",
            ));
        }
        if self.max_workers == 0 {
            return Err(Error::config(
                "max_workers must be at least 1",
                "max_workers",
            ));
        }
        if self.random_sleep_time && self.min_sleep_time > self.max_sleep_time {
            return Err(Error::config(
                format!(
                    "min_sleep_time ({}) must not exceed max_sleep_time ({})",
                    self.min_sleep_time, self.max_sleep_time
                ),
                "min_sleep_time",
            ));
        }
        Ok(())
    }

    /// The per-worker download cap, if one is configured
    ///
    /// Non-positive `max_images` means unbounded.
    pub fn per_worker_cap(&self) -> Option<u64> {
        (self.max_images > 0).then_some(self.max_images as u64)
    }

    /// Fixed inter-attempt delay
    pub fn fixed_sleep(&self) -> Duration {
        Duration::from_secs(self.sleep_time)
    }

    /// Lower bound of the randomized inter-attempt delay
    pub fn min_sleep(&self) -> Duration {
        Duration::from_secs(self.min_sleep_time)
    }

    /// Upper bound of the randomized inter-attempt delay
    pub fn max_sleep(&self) -> Duration {
        Duration::from_secs(self.max_sleep_time)
    }
}

fn default_output_folder() -> PathBuf {
    PathBuf::from("images")
}

fn default_max_attempts() -> u32 {
    5
}

fn default_max_images() -> i64 {
    -1
}

fn default_max_workers() -> usize {
    1
}

fn default_sleep_time() -> u64 {
    1
}

fn default_max_sleep_time() -> u64 {
    5
}
