//! Durable, at-least-once scheduled job queue.
//!
//! The checkout pipeline produces jobs; an external worker polls by type and
//! pending status, executes, and terminal-transitions them. Payloads are
//! self-contained snapshots: a job must be executable with no further reads
//! of the order it describes.

pub mod error;
pub mod job;
pub mod memory;
pub mod postgres;
pub mod queue;

pub use error::{JobError, Result};
pub use job::{JobId, JobStatus, NewJob, ScheduledJob};
pub use memory::InMemoryJobQueue;
pub use postgres::PostgresJobQueue;
pub use queue::{JobQueue, JobStream};
