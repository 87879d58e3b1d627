//! Job queue error types.

use thiserror::Error;

use crate::job::JobId;

/// Errors that can occur during job queue operations.
#[derive(Debug, Error)]
pub enum JobError {
    /// Job not found.
    #[error("job not found: {0}")]
    NotFound(JobId),

    /// The backing store rejected the operation.
    #[error("job store error: {0}")]
    Store(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for job queue results.
pub type Result<T> = std::result::Result<T, JobError>;
