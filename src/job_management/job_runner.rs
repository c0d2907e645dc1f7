use std::sync::Arc;

use log::{error, info, warn};

use crate::generation::pipeline::PosterPipeline;
use crate::job_management::job::{JobId, JobState};
use crate::job_management::job_store::JobStore;
use crate::rendering::types::PosterRequest;

/// Message recorded when a job dies without returning a result.
pub const JOB_CRASHED: &str = "Poster generation crashed unexpectedly.";

/// Drives a single job from `running` to a terminal state.
pub struct JobRunner {
    store: Arc<JobStore>,
    pipeline: Arc<PosterPipeline>,
}

impl JobRunner {
    pub fn new(store: Arc<JobStore>, pipeline: Arc<PosterPipeline>) -> Self {
        Self { store, pipeline }
    }

    /// Runs the job to completion and records the outcome.
    ///
    /// The work happens on its own task; a panic there is recorded as an
    /// error instead of leaving the job `running`.
    pub async fn run(&self, id: JobId, request: PosterRequest) {
        self.store.update(&id, JobState::Running);

        let pipeline = Arc::clone(&self.pipeline);
        let task = tokio::spawn(async move { pipeline.produce(&request).await });

        let state = match task.await {
            Ok(Ok(poster)) => {
                info!("Job {} done: {}", id, poster.filename);
                JobState::Done {
                    filename: poster.filename,
                    path: poster.path,
                }
            }
            Ok(Err(e)) => {
                if e.is_upstream() {
                    warn!("Job {} failed: {}", id, e);
                } else {
                    error!("Job {} failed: {}", id, e);
                }
                JobState::failed(e)
            }
            Err(join_err) => {
                warn!("Job {} crashed: {}", id, join_err);
                JobState::failed(JOB_CRASHED)
            }
        };
        self.store.update(&id, state);
    }
}
