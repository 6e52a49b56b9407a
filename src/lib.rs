//! # image-dl
//!
//! Concurrent image download engine: a bounded pool of workers pulls URLs
//! from a shared FIFO queue, retries each failed fetch up to a configurable
//! attempt limit with an optional randomized inter-attempt delay, and
//! aggregates per-URL outcomes into a final summary.
//!
//! ## Design Philosophy
//!
//! image-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Failure-tolerant** - A URL that keeps failing is reported, never fatal
//! - **Observable** - Consumers subscribe to events, no polling required
//! - **Testable at the seams** - Fetching and persistence sit behind traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use image_dl::{Config, Engine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         max_workers: 4,
//!         max_attempts: 3,
//!         output_folder: "images".into(),
//!         ..Default::default()
//!     };
//!
//!     let engine = Engine::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = engine.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = engine
//!         .run(vec!["http://example.com/cat.jpg".to_string()])
//!         .await;
//!     println!("downloaded {} images", summary.downloaded);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Dispatcher owning the queue, the worker pool, and result aggregation
pub mod engine;
/// Error types
pub mod error;
/// Network retrieval seam and the HTTP fetcher
pub mod fetch;
/// URL list input and failed-URL dumps
pub mod input;
/// Shared FIFO task queue
pub mod queue;
/// Retry policy (attempt limits and inter-attempt delays)
pub mod retry;
/// Image persistence seam and the disk store
pub mod store;
/// Core types, outcomes, and events
pub mod types;

mod worker;

// Re-export commonly used types
pub use config::Config;
pub use engine::Engine;
pub use error::{Error, FailureReason, FetchError, Result, StoreError};
pub use fetch::{Fetcher, HttpFetcher};
pub use input::{read_urls, write_failed_urls};
pub use queue::TaskQueue;
pub use retry::RetryPolicy;
pub use store::{DiskStore, ImageStore};
pub use types::{Event, FailedUrl, Outcome, Summary, Task};

/// Helper function to run the engine with graceful signal handling.
///
/// Runs the download to completion while listening for a termination signal;
/// on signal, the engine is cancelled cooperatively so workers stop after
/// their in-flight attempt and still-held tasks are reported as cancelled
/// failures. The summary covers everything that resolved before the stop.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use image_dl::{Config, Engine, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let engine = Engine::new(Config::default())?;
///     let urls = vec!["http://example.com/cat.jpg".to_string()];
///     let summary = run_with_shutdown(&engine, urls).await;
///     println!("downloaded {}", summary.downloaded);
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(engine: &Engine, urls: Vec<String>) -> Summary {
    let cancel = engine.cancellation_token();
    let signal_task = tokio::spawn(async move {
        wait_for_signal().await;
        cancel.cancel();
    });

    let summary = engine.run(urls).await;
    signal_task.abort();
    summary
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Handler registration can fail in restricted environments (containers,
    // test sandboxes); degrade to whichever signal is available, then to
    // ctrl_c as a last resort.
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("SIGTERM received, cancelling run"),
                _ = sigint.recv() => tracing::info!("SIGINT received, cancelling run"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "SIGINT handler unavailable, listening for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("SIGTERM received, cancelling run");
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for SIGINT only");
            sigint.recv().await;
            tracing::info!("SIGINT received, cancelling run");
        }
        (Err(term_err), Err(int_err)) => {
            tracing::warn!(
                sigterm_error = %term_err,
                sigint_error = %int_err,
                "no Unix signal handlers available, falling back to ctrl_c"
            );
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Ctrl+C received, cancelling run");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Ctrl+C received, cancelling run");
}
