use std::{future::Future, time::Duration};

use tokio::task::JoinSet;
use tracing::warn;

use crate::foundation::error::StageResult;

pub const DEFAULT_PRELOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded-concurrency task queue for asset downloads.
///
/// Tasks start as soon as they are added; the caller is the one that waits once `max` tasks are
/// outstanding. A task that fails or exceeds the timeout settles as `None`, so consumers always
/// get one result per task and must tolerate gaps.
#[derive(Debug)]
pub struct PreloadQueue<T> {
    max: usize,
    timeout: Duration,
    tasks: JoinSet<Option<T>>,
    results: Vec<Option<T>>,
}

impl<T: Send + 'static> PreloadQueue<T> {
    pub fn new(max_queue_length: usize, timeout: Duration) -> Self {
        Self {
            max: max_queue_length.max(1),
            timeout,
            tasks: JoinSet::new(),
            results: Vec::new(),
        }
    }

    pub fn max_queue_length(&self) -> usize {
        self.max
    }

    /// Unsettled tasks.
    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }

    /// Start `task` once a slot is free.
    pub async fn add<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = StageResult<T>> + Send + 'static,
    {
        self.add_then(label, task, |_| {}).await;
    }

    /// Like [`PreloadQueue::add`], calling `on_settle` with the task's outcome once it settles.
    pub async fn add_then<F, S>(&mut self, label: impl Into<String>, task: F, on_settle: S)
    where
        F: Future<Output = StageResult<T>> + Send + 'static,
        S: FnOnce(Option<&T>) + Send + 'static,
    {
        self.wait(false).await;
        let label = label.into();
        let timeout = self.timeout;
        self.tasks.spawn(async move {
            let out = match tokio::time::timeout(timeout, task).await {
                Ok(Ok(v)) => Some(v),
                Ok(Err(err)) => {
                    warn!(asset = %label, error = %err, "preload failed");
                    None
                }
                Err(_) => {
                    warn!(asset = %label, ?timeout, "preload timed out");
                    None
                }
            };
            on_settle(out.as_ref());
            out
        });
    }

    /// Resolve once fewer than `max` tasks are outstanding, or none when `wait_all`.
    pub async fn wait(&mut self, wait_all: bool) {
        let limit = if wait_all { 1 } else { self.max };
        while self.tasks.len() >= limit {
            match self.tasks.join_next().await {
                Some(Ok(out)) => self.results.push(out),
                Some(Err(err)) => {
                    warn!(error = %err, "preload task aborted");
                    self.results.push(None);
                }
                None => break,
            }
        }
    }

    /// Drain every task and return all results in completion order, leaving the queue empty.
    pub async fn all(&mut self) -> Vec<Option<T>> {
        self.wait(true).await;
        std::mem::take(&mut self.results)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/preload.rs"]
mod tests;
