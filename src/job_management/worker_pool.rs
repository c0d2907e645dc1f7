use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info};
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::error_handling::types::GenerationError;
use crate::job_management::job::JobId;
use crate::job_management::job_runner::JobRunner;
use crate::rendering::types::PosterRequest;

/// Default number of concurrent generation workers.
pub const DEFAULT_WORKERS: usize = 2;

type QueuedJob = (JobId, PosterRequest);

/// Fixed set of tokio workers consuming the job queue.
///
/// - `submit` never waits; the queue is unbounded.
/// - `request_shutdown` stops workers from taking new jobs.
/// - `shutdown_and_join` also waits for the jobs already running.
pub struct WorkerPool {
    sender: mpsc::UnboundedSender<QueuedJob>,
    shutdown_tx: watch::Sender<bool>,
    joins: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawn `n` workers. Must be called inside a tokio runtime.
    pub fn spawn(n: usize, runner: Arc<JobRunner>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let receiver = Arc::new(AsyncMutex::new(receiver));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let rx = Arc::clone(&receiver);
            let runner = Arc::clone(&runner);
            let mut shutdown = shutdown_rx.clone();
            joins.push(tokio::spawn(async move {
                worker_loop(worker_id, rx, runner, &mut shutdown).await;
            }));
        }
        info!("Started {} generation worker(s)", n);

        Self {
            sender,
            shutdown_tx,
            joins: Mutex::new(joins),
        }
    }

    /// Queue a job for the next free worker.
    pub fn submit(&self, id: JobId, request: PosterRequest) -> Result<(), GenerationError> {
        if *self.shutdown_tx.borrow() {
            return Err(GenerationError::QueueClosed);
        }
        self.sender
            .send((id, request))
            .map_err(|_| GenerationError::QueueClosed)
    }

    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(&self) {
        self.request_shutdown();
        let joins: Vec<JoinHandle<()>> = {
            let mut guard = self.joins.lock().unwrap_or_else(PoisonError::into_inner);
            guard.drain(..).collect()
        };
        for join in joins {
            let _ = join.await;
        }
        info!("Generation workers stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<AsyncMutex<mpsc::UnboundedReceiver<QueuedJob>>>,
    runner: Arc<JobRunner>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let next = tokio::select! {
            biased;
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            next = async { queue.lock().await.recv().await } => next,
        };

        let Some((id, request)) = next else {
            break;
        };
        debug!("[worker-{}] picked up job {}", worker_id, id);
        runner.run(id, request).await;
    }
    debug!("[worker-{}] exiting", worker_id);
}
