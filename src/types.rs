//! Core types for image-dl

use crate::error::FailureReason;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One URL pending or in-progress download
///
/// A task is owned by the shared queue until claimed, then exclusively by
/// the worker that claimed it, until it resolves to an [`Outcome`]. Tasks
/// are never re-inserted into the queue; retries stay inside the owning
/// worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// The URL to download
    pub url: String,
    /// Number of fetch attempts made so far
    pub attempts: u32,
}

impl Task {
    /// Create a fresh task with no attempts made
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attempts: 0,
        }
    }
}

/// Terminal result for one task
///
/// Immutable once produced. Every task resolves to exactly one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The image was fetched and persisted
    Success {
        /// The URL that was downloaded
        url: String,
        /// Where the bytes were written
        path: PathBuf,
        /// Total fetch attempts made (1 = first attempt succeeded)
        attempts: u32,
    },

    /// The URL could not be downloaded
    Failure {
        /// The URL that failed
        url: String,
        /// Why it failed
        reason: FailureReason,
        /// Total fetch attempts made before giving up
        attempts: u32,
    },

    /// The derived output file already existed; no fetch was attempted
    Skipped {
        /// The URL that was skipped
        url: String,
        /// Where the existing file lives
        path: PathBuf,
    },
}

/// One failed URL in the final [`Summary`], with enough context to re-run
/// against a filtered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUrl {
    /// The URL that failed
    pub url: String,
    /// Why it failed
    pub reason: FailureReason,
    /// Total fetch attempts made
    pub attempts: u32,
}

/// Aggregated result of a run
///
/// Invariant: `downloaded + failed.len() + skipped.len()` equals the number
/// of input URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of URLs successfully downloaded and persisted
    pub downloaded: u64,
    /// Every URL that ended in failure, with its reason
    pub failed: Vec<FailedUrl>,
    /// URLs skipped because their output file already existed
    pub skipped: Vec<String>,
}

impl Summary {
    /// True if no URL ended in failure
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// The plain list of failed URLs, e.g. for dumping to a re-run file
    pub fn failed_urls(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.url.clone()).collect()
    }

    /// Total number of terminal outcomes in this summary
    pub fn total(&self) -> u64 {
        self.downloaded + self.failed.len() as u64 + self.skipped.len() as u64
    }
}

/// Progress events broadcast during a run
///
/// Consumers subscribe via [`Engine::subscribe`](crate::engine::Engine::subscribe);
/// no polling required. Events are best-effort: if no subscriber is listening
/// they are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum Event {
    /// One fetch attempt failed; the worker may retry
    AttemptFailed {
        /// The URL being attempted
        url: String,
        /// The attempt number that just failed (1-based)
        attempt: u32,
        /// The configured attempt limit
        max_attempts: u32,
        /// The attempt's error message
        error: String,
    },

    /// The image was downloaded and persisted
    Downloaded {
        /// The URL that was downloaded
        url: String,
        /// Where the bytes were written
        path: PathBuf,
        /// Total fetch attempts made
        attempts: u32,
    },

    /// The URL ended in terminal failure
    Failed {
        /// The URL that failed
        url: String,
        /// Why it failed
        reason: FailureReason,
    },

    /// The URL was skipped (output file already existed)
    Skipped {
        /// The URL that was skipped
        url: String,
        /// Where the existing file lives
        path: PathBuf,
    },
}
