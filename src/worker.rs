//! Worker: one concurrent execution unit pulling tasks from the shared queue
//!
//! Each worker loops claim -> attempt -> (retry | resolve) until the queue is
//! exhausted, its per-worker image cap is reached, or the run is cancelled.
//! Retries for a claimed task never leave the worker, so per-URL attempts are
//! strictly sequential and no two workers ever attempt the same URL.

use crate::error::FailureReason;
use crate::fetch::Fetcher;
use crate::queue::TaskQueue;
use crate::retry::RetryPolicy;
use crate::store::ImageStore;
use crate::types::{Event, Outcome, Task};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Everything one worker needs, bundled to reduce parameter passing
pub(crate) struct WorkerContext {
    /// Worker index, for log correlation only
    pub(crate) id: usize,
    pub(crate) queue: Arc<TaskQueue>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) store: Arc<dyn ImageStore>,
    pub(crate) policy: RetryPolicy,
    /// Per-worker cap on successful downloads; `None` = unbounded
    pub(crate) max_images: Option<u64>,
    pub(crate) event_tx: broadcast::Sender<Event>,
    pub(crate) cancel: CancellationToken,
}

/// Run one worker to completion, returning its locally-owned outcomes
///
/// Outcomes are merged by the dispatcher only after every worker has
/// stopped, so no synchronization is needed on the way out.
pub(crate) async fn run_worker(ctx: WorkerContext) -> Vec<Outcome> {
    let mut rng = StdRng::from_entropy();
    let mut outcomes = Vec::new();
    let mut downloaded: u64 = 0;

    loop {
        if ctx.max_images.is_some_and(|cap| downloaded >= cap) {
            tracing::info!(
                worker = ctx.id,
                downloaded,
                "per-worker image cap reached, stopping"
            );
            break;
        }

        if ctx.cancel.is_cancelled() {
            tracing::info!(worker = ctx.id, "cancellation requested, stopping");
            break;
        }

        let Some(mut task) = ctx.queue.claim().await else {
            tracing::debug!(worker = ctx.id, "queue exhausted, stopping");
            break;
        };

        if let Some(path) = ctx.store.existing(&task.url).await {
            tracing::warn!(
                worker = ctx.id,
                url = %task.url,
                path = %path.display(),
                "image already downloaded, skipping"
            );
            let _ = ctx.event_tx.send(Event::Skipped {
                url: task.url.clone(),
                path: path.clone(),
            });
            outcomes.push(Outcome::Skipped {
                url: task.url,
                path,
            });
            continue;
        }

        let outcome = attempt_until_resolved(&ctx, &mut task, &mut rng).await;

        match &outcome {
            Outcome::Success { url, path, attempts } => {
                downloaded += 1;
                tracing::info!(
                    worker = ctx.id,
                    url = %url,
                    attempts,
                    path = %path.display(),
                    "saved image to disk"
                );
                let _ = ctx.event_tx.send(Event::Downloaded {
                    url: url.clone(),
                    path: path.clone(),
                    attempts: *attempts,
                });
            }
            Outcome::Failure { url, reason, attempts } => {
                tracing::error!(
                    worker = ctx.id,
                    url = %url,
                    attempts,
                    reason = %reason,
                    "giving up on URL"
                );
                let _ = ctx.event_tx.send(Event::Failed {
                    url: url.clone(),
                    reason: reason.clone(),
                });
            }
            Outcome::Skipped { .. } => {}
        }

        outcomes.push(outcome);
    }

    outcomes
}

/// Drive one claimed task to a terminal outcome
///
/// The retry sleep is the sole suspension point; it suspends only this
/// worker. Cancellation during the sleep resolves the held task as a
/// cancelled failure rather than leaving it unaccounted for.
async fn attempt_until_resolved<R: Rng>(
    ctx: &WorkerContext,
    task: &mut Task,
    rng: &mut R,
) -> Outcome {
    loop {
        task.attempts += 1;

        match ctx.fetcher.fetch(&task.url).await {
            Ok(bytes) => {
                tracing::debug!(
                    worker = ctx.id,
                    url = %task.url,
                    attempt = task.attempts,
                    max_attempts = ctx.policy.max_attempts,
                    bytes = bytes.len(),
                    "fetch succeeded"
                );
                return match ctx.store.persist(&task.url, &bytes).await {
                    Ok(path) => Outcome::Success {
                        url: task.url.clone(),
                        path,
                        attempts: task.attempts,
                    },
                    // Storage failures are terminal: the bytes were fetched,
                    // so re-fetching would not help.
                    Err(e) => Outcome::Failure {
                        url: task.url.clone(),
                        reason: FailureReason::Storage {
                            error: e.to_string(),
                        },
                        attempts: task.attempts,
                    },
                };
            }
            Err(e) => {
                tracing::warn!(
                    worker = ctx.id,
                    url = %task.url,
                    attempt = task.attempts,
                    max_attempts = ctx.policy.max_attempts,
                    error = %e,
                    "fetch attempt failed"
                );
                let _ = ctx.event_tx.send(Event::AttemptFailed {
                    url: task.url.clone(),
                    attempt: task.attempts,
                    max_attempts: ctx.policy.max_attempts,
                    error: e.to_string(),
                });

                if !ctx.policy.should_retry(task.attempts) {
                    return Outcome::Failure {
                        url: task.url.clone(),
                        reason: FailureReason::Exhausted {
                            last_error: e.to_string(),
                        },
                        attempts: task.attempts,
                    };
                }

                let delay = ctx.policy.next_delay(rng);
                tracing::debug!(
                    worker = ctx.id,
                    url = %task.url,
                    delay_ms = delay.as_millis(),
                    "sleeping before next attempt"
                );
                tokio::select! {
                    _ = ctx.cancel.cancelled() => {
                        return Outcome::Failure {
                            url: task.url.clone(),
                            reason: FailureReason::Cancelled,
                            attempts: task.attempts,
                        };
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
