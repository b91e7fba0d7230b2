//! Job Queue Repository Port
//!
//! The two operations the lease engine runs against job storage. `peek_queue`
//! reads without claiming; `try_lease_jobs` is the atomicity boundary that
//! keeps concurrent lease calls from handing the same job to two clusters.

use armada_core::Job;
use async_trait::async_trait;

/// Job queue port
#[async_trait]
pub trait JobQueueRepository: Send + Sync {
    /// Return up to `limit` jobs from the head of `queue` in deterministic
    /// queue order, without claiming them. Idempotent.
    async fn peek_queue(&self, queue: &str, limit: i64) -> Result<Vec<Job>, JobQueueError>;

    /// Atomically claim whichever of `jobs` are still unleased for
    /// `cluster_id` and return that subset. Two concurrent callers never
    /// both receive the same job.
    async fn try_lease_jobs(
        &self,
        cluster_id: &str,
        queue: &str,
        jobs: &[Job],
    ) -> Result<Vec<Job>, JobQueueError>;
}

/// Job queue port error
#[derive(thiserror::Error, Debug)]
pub enum JobQueueError {
    /// Transient backend failure; the engine retries these a bounded number
    /// of times per queue per pass.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid job data: {0}")]
    Validation(String),
}

impl JobQueueError {
    pub fn is_transient(&self) -> bool {
        matches!(self, JobQueueError::Storage(_))
    }
}
