//! Job queue contract.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_core::Stream;

use crate::error::Result;
use crate::job::{JobId, NewJob, ScheduledJob};

/// Stream of due jobs for worker draining.
pub type JobStream = Pin<Box<dyn Stream<Item = Result<ScheduledJob>> + Send>>;

/// Durable storage for scheduled jobs.
///
/// Fetching due jobs is non-destructive: a job stays `pending` until a
/// worker terminal-transitions it, so delivery is at-least-once.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Persists a new job in `pending`.
    async fn enqueue(&self, job: NewJob) -> Result<ScheduledJob>;

    /// Returns up to `limit` pending jobs of the given type due at `now`,
    /// ordered by `run_at`.
    async fn fetch_due(
        &self,
        job_type: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ScheduledJob>>;

    /// Streams all pending jobs of the given type due at `now`.
    async fn stream_due(&self, job_type: &str, now: DateTime<Utc>) -> Result<JobStream>;

    /// Marks a job done.
    async fn mark_done(&self, id: JobId) -> Result<()>;

    /// Marks a job failed, recording the error and bumping the attempt
    /// counter.
    async fn mark_failed(&self, id: JobId, error: &str) -> Result<()>;
}
