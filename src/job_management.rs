//! Job management
//!
//! Background generation jobs and their ephemeral status records.
//!
//! - `job`: identifiers, states and the record returned to pollers.
//! - `job_store`: the TTL-pruned registry.
//! - `job_runner`: runs one job and writes its terminal state.
//! - `worker_pool`: the fixed set of workers feeding the runner.

pub mod job;
pub mod job_runner;
pub mod job_store;
pub mod worker_pool;


pub use job::{JobId, JobRecord, JobState};
pub use job_runner::JobRunner;
pub use job_store::JobStore;
pub use worker_pool::WorkerPool;
