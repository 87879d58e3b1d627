use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{JobError, Result};
use crate::job::{JobId, JobStatus, NewJob, ScheduledJob};
use crate::queue::{JobQueue, JobStream};

/// PostgreSQL-backed job queue.
///
/// The `scheduled_jobs` table is the queue; workers poll it by type and
/// pending status. No row is ever deleted by this crate.
#[derive(Clone)]
pub struct PostgresJobQueue {
    pool: PgPool,
}

impl PostgresJobQueue {
    /// Creates a new PostgreSQL job queue.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_job(row: PgRow) -> Result<ScheduledJob> {
        let status: String = row.try_get("status")?;
        let status = match status.as_str() {
            "done" => JobStatus::Done,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Pending,
        };

        Ok(ScheduledJob {
            id: JobId::from_uuid(row.try_get::<Uuid, _>("id")?),
            job_type: row.try_get("job_type")?,
            payload: row.try_get("payload")?,
            run_at: row.try_get("run_at")?,
            status,
            attempts: row.try_get::<i32, _>("attempts")? as u32,
            last_error: row.try_get("last_error")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl JobQueue for PostgresJobQueue {
    async fn enqueue(&self, job: NewJob) -> Result<ScheduledJob> {
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

        sqlx::query(
            r#"
            INSERT INTO scheduled_jobs (id, job_type, payload, run_at, status, attempts, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(scheduled.id.as_uuid())
        .bind(&scheduled.job_type)
        .bind(&scheduled.payload)
        .bind(scheduled.run_at)
        .bind(scheduled.status.as_str())
        .bind(scheduled.attempts as i32)
        .bind(scheduled.created_at)
        .execute(&self.pool)
        .await?;

        Ok(scheduled)
    }

    async fn fetch_due(
        &self,
        job_type: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ScheduledJob>> {
        let rows = sqlx::query(
            r#"
            SELECT id, job_type, payload, run_at, status, attempts, last_error, created_at
            FROM scheduled_jobs
            WHERE job_type = $1 AND status = 'pending' AND run_at <= $2
            ORDER BY run_at ASC
            LIMIT $3
            "#,
        )
        .bind(job_type)
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_job).collect()
    }

    async fn stream_due(&self, job_type: &str, now: DateTime<Utc>) -> Result<JobStream> {
        let stream = sqlx::query(
            r#"
            SELECT id, job_type, payload, run_at, status, attempts, last_error, created_at
            FROM scheduled_jobs
            WHERE job_type = $1 AND status = 'pending' AND run_at <= $2
            ORDER BY run_at ASC
            "#,
        )
        .bind(job_type.to_string())
        .bind(now)
        .fetch(&self.pool)
        .map(|result| match result {
            Ok(row) => Self::row_to_job(row),
            Err(e) => Err(JobError::Database(e)),
        });

        Ok(Box::pin(stream))
    }

    async fn mark_done(&self, id: JobId) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE scheduled_jobs SET status = 'done', attempts = attempts + 1 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(JobError::NotFound(id));
        }
        Ok(())
    }

    async fn mark_failed(&self, id: JobId, error: &str) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE scheduled_jobs
            SET status = 'failed', attempts = attempts + 1, last_error = $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(error)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(JobError::NotFound(id));
        }
        Ok(())
    }
}
