use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Duration;
use log::debug;

use crate::clock::Clock;
use crate::job_management::job::{JobId, JobRecord, JobState};

/// Default time-to-live of a job record: six hours.
pub const DEFAULT_JOB_TTL_SECS: u64 = 6 * 60 * 60;

/// In-memory registry of generation jobs.
///
/// Every call prunes records whose last update is older than the TTL, under
/// the same lock as the read or write it performs.
pub struct JobStore {
    records: Mutex<HashMap<JobId, JobRecord>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JobStore {
    pub fn new(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(365_000)),
            clock,
        }
    }

    /// Inserts a new record.
    pub fn create(&self, id: JobId, state: JobState) -> JobRecord {
        self.write(id, state)
    }

    /// Replaces the state of a record, creating it if it was evicted.
    pub fn update(&self, id: &JobId, state: JobState) -> JobRecord {
        self.write(id.clone(), state)
    }

    pub fn get(&self, id: &JobId) -> Option<JobRecord> {
        self.pruned().get(id).cloned()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.pruned().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, id: JobId, state: JobState) -> JobRecord {
        let updated_at = self.clock.now();
        let record = JobRecord {
            job_id: id.clone(),
            state,
            updated_at,
        };
        self.pruned().insert(id, record.clone());
        record
    }

    fn pruned(&self) -> MutexGuard<'_, HashMap<JobId, JobRecord>> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();
        let before = records.len();
        records.retain(|_, record| now - record.updated_at <= self.ttl);
        let evicted = before - records.len();
        if evicted > 0 {
            debug!("Evicted {} stale job(s)", evicted);
        }
        records
    }
}
