//! Bounded worker pool draining a shared queue
//!
//! A fixed number of workers pop items off a shared queue until it is empty.
//! Failures are logged and recorded per item and never stop the pool. The
//! completion signal fires exactly once, from the worker whose increment of the
//! shared counter reaches the item total.

use futures::FutureExt;
use indicatif::ProgressBar;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use super::pipeline::TrackOutcome;
use crate::error::Result;

/// Default number of concurrent workers per playlist
pub const DEFAULT_WORKERS: usize = 15;

/// Something the pool can name in logs and failure records
pub trait PoolItem: Send + 'static {
    fn label(&self) -> &str;
}

/// Why a single item failed
#[derive(Debug, Clone, PartialEq)]
pub struct PoolFailure {
    pub label: String,
    pub kind: &'static str,
    pub reason: String,
}

/// Result of draining one queue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolReport {
    pub total: usize,
    pub exported: usize,
    pub skipped: usize,
    pub failures: Vec<PoolFailure>,
}

impl PoolReport {
    /// Number of items that were attempted, whatever the outcome
    pub fn attempted(&self) -> usize {
        self.exported + self.skipped + self.failures.len()
    }

    fn merge(&mut self, other: PoolReport) {
        self.exported += other.exported;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }
}

/// Counts finished items and fires the completion signal on the last one
struct CompletionLatch {
    total: usize,
    completed: AtomicUsize,
    done: std::sync::Mutex<Option<oneshot::Sender<()>>>,
}

impl CompletionLatch {
    fn new(total: usize, done: oneshot::Sender<()>) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            done: std::sync::Mutex::new(Some(done)),
        }
    }

    /// Record one finished item; returns true only for the call that completed the pool
    fn record(&self) -> bool {
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        if completed != self.total {
            return false;
        }

        let sender = match self.done.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }
}

/// Fixed-size pool of workers
pub struct WorkerPool {
    workers: usize,
    progress: ProgressBar,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            progress: ProgressBar::hidden(),
        }
    }

    /// Advance this bar once per finished item
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run `work` over every item with at most `workers` items in flight
    ///
    /// Returns once every item has been attempted.
    pub async fn run<T, F, Fut>(&self, items: Vec<T>, work: F) -> PoolReport
    where
        T: PoolItem,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TrackOutcome>> + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return PoolReport::default();
        }

        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let (done_tx, done_rx) = oneshot::channel();
        let latch = Arc::new(CompletionLatch::new(total, done_tx));
        let work = Arc::new(work);

        let mut workers = JoinSet::new();
        for worker_id in 0..self.workers.min(total) {
            let queue = queue.clone();
            let latch = latch.clone();
            let work = work.clone();
            let progress = self.progress.clone();

            workers.spawn(async move {
                let mut report = PoolReport::default();
                loop {
                    // Lock is held only for the pop
                    let next = queue.lock().await.pop_front();
                    let Some(item) = next else {
                        break;
                    };
                    let label = item.label().to_string();

                    match AssertUnwindSafe((*work)(item)).catch_unwind().await {
                        Ok(Ok(TrackOutcome::Exported)) => report.exported += 1,
                        Ok(Ok(TrackOutcome::Skipped)) => report.skipped += 1,
                        Ok(Err(e)) => {
                            warn!("Failed to download \"{}\": {}", label, e);
                            report.failures.push(PoolFailure {
                                label,
                                kind: e.kind(),
                                reason: e.to_string(),
                            });
                        }
                        Err(_) => {
                            error!("Worker panicked while processing \"{}\"", label);
                            report.failures.push(PoolFailure {
                                label,
                                kind: "panic",
                                reason: "worker panicked".to_string(),
                            });
                        }
                    }

                    progress.inc(1);
                    if latch.record() {
                        debug!("Worker {} finished the last item", worker_id);
                    }
                }
                report
            });
        }
        drop(latch);

        if done_rx.await.is_err() {
            error!("Workers stopped before all {} items were attempted", total);
        }

        let mut report = PoolReport {
            total,
            ..PoolReport::default()
        };
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(partial) => report.merge(partial),
                Err(e) => error!("Worker task failed: {}", e),
            }
        }
        report
    }
}
