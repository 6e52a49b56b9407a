//! Dispatcher: owns the shared queue, spawns workers, aggregates outcomes
//!
//! [`Engine::run`] populates the queue with one task per input URL, spawns
//! exactly `max_workers` workers, waits for all of them to stop, and merges
//! their outcomes into a [`Summary`]. Individual URL failures never abort
//! the run; the only fatal errors happen before the run starts.

use crate::config::Config;
use crate::error::{Error, FetchError, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::input;
use crate::queue::TaskQueue;
use crate::retry::RetryPolicy;
use crate::store::{DiskStore, ImageStore};
use crate::types::{Event, FailedUrl, Outcome, Summary, Task};
use crate::worker::{WorkerContext, run_worker};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Concurrent image download engine
///
/// Cloneable: all fields are `Arc`-wrapped or cheap handles, so an engine
/// can be shared with a task that watches for shutdown signals.
#[derive(Clone)]
pub struct Engine {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ImageStore>,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
}

impl Engine {
    /// Create an engine with the production collaborators: an HTTP fetcher
    /// and a disk store rooted at `config.output_folder`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::error::Error::Config) if the
    /// configuration is invalid, or a network error if the HTTP client
    /// cannot be built. Configuration errors are fatal: the run never
    /// begins.
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(DiskStore::new(config.output_folder.clone()));
        let fetcher = Arc::new(HttpFetcher::new().map_err(|e| match e {
            FetchError::Network(e) => Error::Network(e),
            other => Error::Config {
                message: other.to_string(),
                key: None,
            },
        })?);
        Self::with_collaborators(config, fetcher, store)
    }

    /// Create an engine with injected fetcher and store, e.g. test doubles
    /// or alternative storage backends
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::error::Error::Config) if the
    /// configuration is invalid.
    pub fn with_collaborators(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn ImageStore>,
    ) -> Result<Self> {
        config.validate()?;
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            store,
            event_tx,
            cancel: CancellationToken::new(),
        })
    }

    /// Subscribe to progress events
    ///
    /// Multiple subscribers are supported; each receives every event
    /// independently.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The engine's cancellation token
    ///
    /// Cancelling it makes workers stop after their in-flight attempt
    /// resolves; a task held during cancellation is reported as a cancelled
    /// failure.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cooperative cancellation of the current run
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The configuration this engine runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read URLs from `config.input_urls` and run the engine over them
    ///
    /// # Errors
    ///
    /// Fails fast if the input file is missing, unreadable, or empty.
    pub async fn run_from_file(&self) -> Result<Summary> {
        let urls = input::read_urls(&self.config.input_urls).await?;
        Ok(self.run(urls).await)
    }

    /// Download every URL, returning the aggregated summary
    ///
    /// Duplicate URLs are each a distinct task; no deduplication happens
    /// here. An empty input yields an empty summary without spawning
    /// claims against the queue.
    pub async fn run(&self, urls: Vec<String>) -> Summary {
        let total = urls.len();
        tracing::info!(
            urls = total,
            workers = self.config.max_workers,
            max_attempts = self.config.max_attempts,
            "starting download run"
        );

        let mut tasks: Vec<Task> = urls.into_iter().map(Task::new).collect();
        if self.config.shuffle_urls {
            tasks.shuffle(&mut rand::thread_rng());
        }

        let queue = Arc::new(TaskQueue::new(tasks));
        let policy = RetryPolicy::from_config(&self.config);
        let max_images = self.config.per_worker_cap();

        let mut handles = Vec::with_capacity(self.config.max_workers);
        for id in 0..self.config.max_workers {
            let ctx = WorkerContext {
                id,
                queue: Arc::clone(&queue),
                fetcher: Arc::clone(&self.fetcher),
                store: Arc::clone(&self.store),
                policy,
                max_images,
                event_tx: self.event_tx.clone(),
                cancel: self.cancel.clone(),
            };
            handles.push(tokio::spawn(run_worker(ctx)));
        }

        // All workers have stopped once join_all returns, so aggregation
        // needs no further synchronization.
        let mut summary = Summary::default();
        for result in futures::future::join_all(handles).await {
            match result {
                Ok(outcomes) => merge_outcomes(&mut summary, outcomes),
                Err(e) => {
                    tracing::error!(error = %e, "worker task failed to join");
                }
            }
        }

        tracing::info!(
            downloaded = summary.downloaded,
            failed = summary.failed.len(),
            skipped = summary.skipped.len(),
            "download run finished"
        );

        summary
    }
}

fn merge_outcomes(summary: &mut Summary, outcomes: Vec<Outcome>) {
    for outcome in outcomes {
        match outcome {
            Outcome::Success { .. } => summary.downloaded += 1,
            Outcome::Failure {
                url,
                reason,
                attempts,
            } => summary.failed.push(FailedUrl {
                url,
                reason,
                attempts,
            }),
            Outcome::Skipped { url, .. } => summary.skipped.push(url),
        }
    }
}
