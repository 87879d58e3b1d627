use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{JobError, Result};
use crate::job::{JobId, JobStatus, NewJob, ScheduledJob};
use crate::queue::{JobQueue, JobStream};

#[derive(Debug, Default)]
struct QueueState {
    jobs: HashMap<JobId, ScheduledJob>,
    fail_on_enqueue: bool,
}

/// In-memory job queue for testing and local wiring.
#[derive(Clone, Default)]
pub struct InMemoryJobQueue {
    state: Arc<RwLock<QueueState>>,
}

impl InMemoryJobQueue {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the queue to fail the next enqueue with a store error.
    pub async fn set_fail_on_enqueue(&self, fail: bool) {
        self.state.write().await.fail_on_enqueue = fail;
    }

    /// Returns the total number of stored jobs.
    pub async fn job_count(&self) -> usize {
        self.state.read().await.jobs.len()
    }

    /// Returns all jobs of the given type, regardless of status.
    pub async fn jobs_of_type(&self, job_type: &str) -> Vec<ScheduledJob> {
        let mut jobs: Vec<_> = self
            .state
            .read()
            .await
            .jobs
            .values()
            .filter(|job| job.job_type == job_type)
            .cloned()
            .collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }

    async fn due(&self, job_type: &str, now: DateTime<Utc>) -> Vec<ScheduledJob> {
        let mut jobs: Vec<_> = self
            .state
            .read()
            .await
            .jobs
            .values()
            .filter(|job| {
                job.job_type == job_type && job.status == JobStatus::Pending && job.run_at <= now
            })
            .cloned()
            .collect();
        jobs.sort_by_key(|job| job.run_at);
        jobs
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: NewJob) -> Result<ScheduledJob> {
        let mut state = self.state.write().await;

        if state.fail_on_enqueue {
            return Err(JobError::Store("injected enqueue failure".to_string()));
        }

        let scheduled = ScheduledJob {
            id: JobId::new(),
            job_type: job.job_type,
            payload: job.payload,
            run_at: job.run_at,
            status: JobStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
        };
        state.jobs.insert(scheduled.id, scheduled.clone());
        Ok(scheduled)
    }

    async fn fetch_due(
        &self,
        job_type: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ScheduledJob>> {
        let mut jobs = self.due(job_type, now).await;
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn stream_due(&self, job_type: &str, now: DateTime<Utc>) -> Result<JobStream> {
        let jobs = self.due(job_type, now).await;
        let stream = futures_util::stream::iter(jobs.into_iter().map(Ok::<_, JobError>));
        Ok(Box::pin(stream))
    }

    async fn mark_done(&self, id: JobId) -> Result<()> {
        let mut state = self.state.write().await;
        let job = state.jobs.get_mut(&id).ok_or(JobError::NotFound(id))?;
        job.status = JobStatus::Done;
        job.attempts += 1;
        Ok(())
    }

    async fn mark_failed(&self, id: JobId, error: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let job = state.jobs.get_mut(&id).ok_or(JobError::NotFound(id))?;
        job.status = JobStatus::Failed;
        job.attempts += 1;
        job.last_error = Some(error.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn job(run_at: DateTime<Utc>) -> NewJob {
        NewJob::new(
            "checkout_complete",
            serde_json::json!({"order_id": 1001}),
            run_at,
        )
    }

    #[tokio::test]
    async fn enqueue_and_fetch_due() {
        let queue = InMemoryJobQueue::new();
        let now = Utc::now();

        queue.enqueue(job(now)).await.unwrap();

        let due = queue.fetch_due("checkout_complete", now, 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].status, JobStatus::Pending);
        assert_eq!(due[0].payload["order_id"], 1001);
    }

    #[tokio::test]
    async fn future_jobs_are_not_due() {
        let queue = InMemoryJobQueue::new();
        let now = Utc::now();

        queue
            .enqueue(job(now + chrono::Duration::hours(1)))
            .await
            .unwrap();

        let due = queue.fetch_due("checkout_complete", now, 10).await.unwrap();
        assert!(due.is_empty());
    }

    #[tokio::test]
    async fn fetch_is_non_destructive() {
        let queue = InMemoryJobQueue::new();
        let now = Utc::now();
        queue.enqueue(job(now)).await.unwrap();

        let first = queue.fetch_due("checkout_complete", now, 10).await.unwrap();
        let second = queue.fetch_due("checkout_complete", now, 10).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn mark_done_removes_from_due_set() {
        let queue = InMemoryJobQueue::new();
        let now = Utc::now();
        let scheduled = queue.enqueue(job(now)).await.unwrap();

        queue.mark_done(scheduled.id).await.unwrap();

        let due = queue.fetch_due("checkout_complete", now, 10).await.unwrap();
        assert!(due.is_empty());

        let all = queue.jobs_of_type("checkout_complete").await;
        assert_eq!(all[0].status, JobStatus::Done);
        assert_eq!(all[0].attempts, 1);
    }

    #[tokio::test]
    async fn mark_failed_records_error() {
        let queue = InMemoryJobQueue::new();
        let now = Utc::now();
        let scheduled = queue.enqueue(job(now)).await.unwrap();

        queue
            .mark_failed(scheduled.id, "smtp timeout")
            .await
            .unwrap();

        let all = queue.jobs_of_type("checkout_complete").await;
        assert_eq!(all[0].status, JobStatus::Failed);
        assert_eq!(all[0].last_error.as_deref(), Some("smtp timeout"));
    }

    #[tokio::test]
    async fn unknown_job_reports_not_found() {
        let queue = InMemoryJobQueue::new();
        let result = queue.mark_done(JobId::new()).await;
        assert!(matches!(result, Err(JobError::NotFound(_))));
    }

    #[tokio::test]
    async fn stream_due_yields_all_due_jobs() {
        let queue = InMemoryJobQueue::new();
        let now = Utc::now();
        queue.enqueue(job(now)).await.unwrap();
        queue.enqueue(job(now)).await.unwrap();

        let mut stream = queue.stream_due("checkout_complete", now).await.unwrap();
        let mut count = 0;
        while let Some(job) = stream.next().await {
            job.unwrap();
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn injected_enqueue_failure_surfaces_as_store_error() {
        let queue = InMemoryJobQueue::new();
        queue.set_fail_on_enqueue(true).await;

        let result = queue.enqueue(job(Utc::now())).await;
        assert!(matches!(result, Err(JobError::Store(_))));
        assert_eq!(queue.job_count().await, 0);
    }
}
