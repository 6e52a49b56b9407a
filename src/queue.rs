//! Shared FIFO task queue
//!
//! Populated once at construction, then drained concurrently by workers via
//! [`TaskQueue::claim`]. The mutex guarantees no two workers ever receive
//! the same task. There is no push after construction: retries stay local
//! to the worker holding the task, preserving per-URL attempt locality.

use crate::types::Task;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// FIFO sequence of pending tasks, safe for concurrent claiming
#[derive(Debug)]
pub struct TaskQueue {
    inner: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    /// Build the queue from the initial set of tasks
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            inner: Mutex::new(tasks.into_iter().collect()),
        }
    }

    /// Atomically remove and return the head task, or `None` if the queue
    /// is exhausted
    pub async fn claim(&self) -> Option<Task> {
        let mut queue = self.inner.lock().await;
        queue.pop_front()
    }

    /// Number of tasks still waiting to be claimed
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// True if no tasks remain
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
