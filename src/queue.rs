//! Serial Queue
//!
//! FIFO, single-worker execution of a handle's operations. Each handle owns one
//! queue; the queue owns one tokio task that pulls work items off an unbounded
//! channel and drives each one to completion, outcome delivery included, before
//! pulling the next. Mutual exclusion comes from there being exactly one
//! consumer, not from a lock.
//!
//! ```text
//!   FileHandle::write()        mpsc        worker task (one per handle)
//!   ┌──────────────────┐   ──────────▶   ┌──────────────────────────────┐
//!   │ submit(work)     │                 │ recv -> run -> reply -> recv │
//!   │ -> Pending<T>    │   ◀──────────   │                              │
//!   └──────────────────┘     oneshot     └──────────────────────────────┘
//! ```

use crate::error::FileError;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// Whether a queue's worker is executing an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueState {
    #[default]
    Idle,
    Running,
}

/// Queue statistics
#[derive(Debug, Clone, Default)]
pub struct QueueStats {
    /// Items submitted but not yet started
    pub pending: usize,
    /// Idle or running one item
    pub state: QueueState,
    /// Items that settled successfully
    pub completed: usize,
    /// Items that settled with an error
    pub failed: usize,
}

/// One queued unit of work.
///
/// `work` already carries its reply sender and resolves once the outcome has
/// been handed to the waiter and recorded in the stats.
struct WorkItem {
    op: &'static str,
    work: BoxFuture<'static, ()>,
}

/// Result of a submitted operation.
///
/// The work is enqueued when the operation is called, not when this future is
/// first polled. Dropping a `Pending` without awaiting it does not cancel the
/// operation; it still runs in its place in the queue.
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T, FileError>>,
}

impl<T> Pending<T> {
    fn settled(outcome: Result<T, FileError>) -> Self {
        let (reply, rx) = oneshot::channel();
        let _ = reply.send(outcome);
        Self { rx }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, FileError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| Err(FileError::unexpected("queue worker dropped the operation")))
        })
    }
}

/// Per-handle FIFO worker.
pub(crate) struct SerialQueue {
    path: PathBuf,
    tx: mpsc::UnboundedSender<WorkItem>,
    stats: Arc<RwLock<QueueStats>>,
}

impl SerialQueue {
    /// Spawn the worker for `path` onto `runtime`.
    pub(crate) fn spawn(runtime: &tokio::runtime::Handle, path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = Arc::new(RwLock::new(QueueStats::default()));
        runtime.spawn(Self::worker_loop(rx, Arc::clone(&stats), path.clone()));
        Self { path, tx, stats }
    }

    /// Append `work` to the queue.
    ///
    /// `work` is not polled until every previously submitted item has settled.
    pub(crate) fn submit<T, F>(&self, op: &'static str, work: F) -> Pending<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, FileError>> + Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let path = self.path.clone();
        let stats = Arc::clone(&self.stats);
        let item = WorkItem {
            op,
            work: Box::pin(async move {
                let outcome = AssertUnwindSafe(work)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        error!(path = %path.display(), op, "Operation panicked");
                        Err(FileError::unexpected(format!("{} panicked", op)))
                    });
                let succeeded = outcome.is_ok();
                // The caller may have dropped its Pending; the work still counts.
                let _ = reply.send(outcome);
                // Running -> Idle only once the outcome is delivered
                {
                    let mut stats = stats.write();
                    stats.state = QueueState::Idle;
                    if succeeded {
                        stats.completed += 1;
                    } else {
                        stats.failed += 1;
                    }
                }
                debug!(path = %path.display(), op, succeeded, "Operation settled");
            }),
        };

        let pending = {
            let mut stats = self.stats.write();
            stats.pending += 1;
            stats.pending
        };

        if self.tx.send(item).is_err() {
            self.stats.write().pending -= 1;
            warn!(path = %self.path.display(), op, "Queue worker is gone, rejecting operation");
            return Pending::settled(Err(FileError::unexpected(format!(
                "queue for {} is no longer running",
                self.path.display()
            ))));
        }

        debug!(path = %self.path.display(), op, pending, "Enqueued operation");
        Pending { rx }
    }

    pub(crate) fn stats(&self) -> QueueStats {
        self.stats.read().clone()
    }

    async fn worker_loop(
        mut rx: mpsc::UnboundedReceiver<WorkItem>,
        stats: Arc<RwLock<QueueStats>>,
        path: PathBuf,
    ) {
        debug!(path = %path.display(), "Queue worker started");

        while let Some(item) = rx.recv().await {
            {
                let mut stats = stats.write();
                stats.pending = stats.pending.saturating_sub(1);
                stats.state = QueueState::Running;
            }

            debug!(path = %path.display(), op = item.op, "Running operation");
            item.work.await;
        }

        debug!(path = %path.display(), "Queue worker stopped");
    }
}
