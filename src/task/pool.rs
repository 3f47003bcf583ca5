//! Fixed-size task pool with rendezvous submission.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

/// Errors returned by [`TaskPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("task pool must have at least one worker")]
    EmptyPool,
    #[error("task pool is shut down")]
    Closed,
    /// No worker took the task although the pool was never shut down.
    #[error("task pool has no live workers")]
    Unavailable,
}

/// A unit of fire-and-forget work executed by a pool worker.
///
/// The token is cancelled when the owning pool shuts down. Implementations
/// should check it before any blocking hand-off and abandon the hand-off
/// once it fires.
#[async_trait]
pub trait Task: Send + 'static {
    async fn run(self: Box<Self>, cancel: CancellationToken);
}

/// Adapts a closure into a [`Task`].
pub struct FnTask<F>(pub F);

#[async_trait]
impl<F, Fut> Task for FnTask<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn run(self: Box<Self>, cancel: CancellationToken) {
        (self.0)(cancel).await
    }
}

struct Dispatch {
    task: Box<dyn Task>,
    accepted: oneshot::Sender<()>,
}

/// Bounded-concurrency executor.
///
/// `size` workers share one dispatch channel. [`TaskPool::add`] completes only
/// after a worker has taken the task, so callers are held back while every
/// worker is busy. Each worker runs one task at a time.
///
/// The pool does no error handling of its own. Each task runs in a separate
/// tokio task, so a panic unwinds only that task: the worker logs it and
/// takes the next one, and the pool keeps its size.
///
/// Must be created inside a tokio runtime.
pub struct TaskPool {
    name: Arc<str>,
    size: usize,
    sender: mpsc::Sender<Dispatch>,
    cancel: CancellationToken,
    workers: TaskTracker,
}

impl TaskPool {
    /// Starts `size` workers.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::EmptyPool`] if `size` is zero.
    pub fn new(name: &str, size: usize) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::EmptyPool);
        }

        let name: Arc<str> = Arc::from(name);
        let (sender, receiver) = mpsc::channel(1);
        let receiver = Arc::new(Mutex::new(receiver));
        let cancel = CancellationToken::new();
        let workers = TaskTracker::new();

        for id in 0..size {
            workers.spawn(run_worker(
                name.clone(),
                id,
                receiver.clone(),
                cancel.clone(),
                workers.clone(),
            ));
        }

        debug!(pool = %name, size, "Task pool started");

        Ok(Self {
            name,
            size,
            sender,
            cancel,
            workers,
        })
    }

    /// Hands `task` to a free worker, waiting until one accepts it.
    ///
    /// Waits indefinitely while all workers are busy. Callers that must not
    /// wait should submit from inside another task.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] once [`TaskPool::shutdown`] has been
    /// called, or [`PoolError::Unavailable`] if the workers are gone without
    /// a shutdown. The task is dropped without running.
    pub async fn add<T: Task>(&self, task: T) -> Result<(), PoolError> {
        if self.cancel.is_cancelled() {
            return Err(PoolError::Closed);
        }

        let (accepted, ack) = oneshot::channel();
        let sent = self
            .sender
            .send(Dispatch {
                task: Box::new(task),
                accepted,
            })
            .await;

        if sent.is_err() || ack.await.is_err() {
            return Err(self.rejection());
        }
        Ok(())
    }

    fn rejection(&self) -> PoolError {
        if self.cancel.is_cancelled() {
            PoolError::Closed
        } else {
            error!(pool = %self.name, "Task rejected, no live workers");
            PoolError::Unavailable
        }
    }

    /// Closure form of [`TaskPool::add`].
    pub async fn add_fn<F, Fut>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.add(FnTask(f)).await
    }

    /// Cancels the shared token, stops accepting tasks and waits for every
    /// worker to return.
    ///
    /// Tasks already accepted run to completion (or to their next cancellation
    /// checkpoint). Intended to be called once.
    pub async fn shutdown(&self) {
        info!(pool = %self.name, "Shutting down task pool");
        self.cancel.cancel();
        self.workers.close();
        self.workers.wait().await;
        debug!(pool = %self.name, "Task pool stopped");
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

async fn run_worker(
    pool: Arc<str>,
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Dispatch>>>,
    cancel: CancellationToken,
    tracker: TaskTracker,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            dispatch = async { receiver.lock().await.recv().await } => dispatch,
        };

        let Some(Dispatch { task, accepted }) = next else {
            break;
        };

        // The submitter may have given up waiting; the task still runs.
        let _ = accepted.send(());

        if let Err(e) = tracker.spawn(task.run(cancel.clone())).await {
            if e.is_panic() {
                error!(pool = %pool, worker = id, error = %e, "Task panicked");
            } else {
                debug!(pool = %pool, worker = id, error = %e, "Task aborted");
            }
        }
    }

    debug!(pool = %pool, worker = id, "Worker exited");
}
