//! Error types for image-dl
//!
//! The error taxonomy mirrors the engine's recovery boundaries:
//! - [`FetchError`] - one failed network attempt, contained by the worker's retry loop
//! - [`StoreError`] - persistence of already-fetched bytes failed, terminal per URL
//! - [`FailureReason`] - why a URL ended in a terminal failure
//! - [`Error`] - fatal crate-level errors (bad configuration, unreadable input)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for image-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for image-dl
///
/// Only these errors abort a run. Per-URL fetch and storage failures are
/// collected into the final [`Summary`](crate::types::Summary) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "min_sleep_time")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error (HTTP client construction)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Input file contained no URLs
    #[error("no URLs found in input file: {path}")]
    EmptyInput {
        /// The input file that was read
        path: PathBuf,
    },
}

impl Error {
    /// Convenience constructor for configuration errors
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// A single failed fetch attempt
///
/// Always recoverable from the engine's point of view: the worker's retry
/// loop decides whether to try again. Never surfaces past the worker.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    HttpStatus {
        /// The status code returned by the server
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Any other per-attempt failure
    ///
    /// The retry policy has no finer taxonomy to act on, so unclassified
    /// errors count as ordinary failed attempts.
    #[error("{0}")]
    Other(String),
}

/// Persistence of already-fetched bytes failed
///
/// Terminal for the URL: the engine reports it as a storage failure and
/// never re-fetches.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error while writing the image
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable filename could be derived from the URL
    #[error("cannot derive a filename from URL: {url}")]
    NoFilename {
        /// The URL that yielded no filename
        url: String,
    },
}

/// Why a URL ended in a terminal failure
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FailureReason {
    /// Every attempt up to `max_attempts` failed
    #[error("exhausted retries: {last_error}")]
    Exhausted {
        /// The error from the final attempt
        last_error: String,
    },

    /// The image was fetched but could not be persisted
    #[error("storage: {error}")]
    Storage {
        /// The persistence error
        error: String,
    },

    /// The run was cancelled while this URL was held by a worker
    #[error("cancelled")]
    Cancelled,
}
