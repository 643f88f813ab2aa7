//! Serial execution context.
//!
//! A [`Dispatcher`] owns one tokio task that drains a queue of jobs in FIFO
//! order and runs each to completion before starting the next. Code that
//! touches bridge state after an off-thread callback is funnelled through
//! here, so every such mutation is observed from one logical thread.

use log::{debug, info};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::{BridgeError, BridgeResult};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Debug, Clone)]
pub struct Dispatcher {
    label: Arc<str>,
    sender: mpsc::UnboundedSender<Job>,
    shutdown: CancellationToken,
}

impl Dispatcher {
    /// Spawns the dispatcher loop on the current tokio runtime.
    ///
    /// Panics when called outside a runtime, like `tokio::spawn`.
    pub fn new(label: &str) -> Self {
        Self::on(&Handle::current(), label)
    }

    /// Spawns the dispatcher loop on `handle`.
    pub fn on(handle: &Handle, label: &str) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let label: Arc<str> = Arc::from(label);

        handle.spawn(run(Arc::clone(&label), receiver, shutdown.clone()));

        Self {
            label,
            sender,
            shutdown,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Queues `job` on the serial context and returns a future for its
    /// output. The job is queued before this returns, so jobs run in the
    /// order `dispatch` was called.
    pub fn dispatch<F, T>(&self, job: F) -> impl Future<Output = BridgeResult<T>> + Send + 'static
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let label = Arc::clone(&self.label);
        let queued = self.submit(job);

        async move {
            let rx = queued?;
            rx.await
                .map_err(|_| BridgeError::dispatch(format!("dispatcher '{}' dropped the job", label)))
        }
    }

    fn submit<F, T>(&self, job: F) -> BridgeResult<oneshot::Receiver<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.shutdown.is_cancelled() {
            return Err(BridgeError::dispatch(format!("dispatcher '{}' is shut down", self.label)));
        }

        let (tx, rx) = oneshot::channel();
        let wrapped: Job = Box::pin(async move {
            let _ = tx.send(job.await);
        });

        self.sender
            .send(wrapped)
            .map_err(|_| BridgeError::dispatch(format!("dispatcher '{}' is not running", self.label)))?;
        Ok(rx)
    }

    /// Stops the loop. Queued jobs that have not started are dropped.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

async fn run(label: Arc<str>, mut receiver: mpsc::UnboundedReceiver<Job>, shutdown: CancellationToken) {
    info!("Dispatcher '{}' started", label);

    loop {
        tokio::select! {
            job = receiver.recv() => {
                match job {
                    Some(job) => job.await,
                    None => {
                        debug!("Dispatcher '{}' has no remaining senders", label);
                        break;
                    }
                }
            }
            _ = shutdown.cancelled() => {
                info!("Shutdown signal received, stopping dispatcher '{}'", label);
                break;
            }
        }
    }

    info!("Dispatcher '{}' stopped", label);
}
