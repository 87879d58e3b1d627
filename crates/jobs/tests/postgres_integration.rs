//! PostgreSQL integration tests for the job queue.
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p jobs --test postgres_integration
//! ```

use std::sync::Arc;

use chrono::Utc;
use jobs::{JobQueue, JobStatus, NewJob, PostgresJobQueue};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/003_create_scheduled_jobs.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh queue with its own pool and cleared tables
async fn get_test_queue() -> PostgresJobQueue {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE scheduled_jobs")
        .execute(&pool)
        .await
        .unwrap();

    PostgresJobQueue::new(pool)
}

#[tokio::test]
#[serial]
async fn enqueue_and_fetch_due() {
    let queue = get_test_queue().await;
    let now = Utc::now();

    let scheduled = queue
        .enqueue(NewJob::new(
            "checkout_complete",
            serde_json::json!({"order_id": 1001}),
            now,
        ))
        .await
        .unwrap();

    let due = queue.fetch_due("checkout_complete", now, 10).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, scheduled.id);
    assert_eq!(due[0].status, JobStatus::Pending);
    assert_eq!(due[0].payload["order_id"], 1001);
}

#[tokio::test]
#[serial]
async fn fetch_is_non_destructive() {
    let queue = get_test_queue().await;
    let now = Utc::now();

    queue
        .enqueue(NewJob::new("checkout_complete", serde_json::json!({}), now))
        .await
        .unwrap();

    let first = queue.fetch_due("checkout_complete", now, 10).await.unwrap();
    let second = queue.fetch_due("checkout_complete", now, 10).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
#[serial]
async fn terminal_transitions_update_row() {
    let queue = get_test_queue().await;
    let now = Utc::now();

    let a = queue
        .enqueue(NewJob::new("checkout_complete", serde_json::json!({}), now))
        .await
        .unwrap();
    let b = queue
        .enqueue(NewJob::new("checkout_complete", serde_json::json!({}), now))
        .await
        .unwrap();

    queue.mark_done(a.id).await.unwrap();
    queue.mark_failed(b.id, "smtp timeout").await.unwrap();

    let due = queue.fetch_due("checkout_complete", now, 10).await.unwrap();
    assert!(due.is_empty());

    let attempts: i32 = sqlx::query_scalar("SELECT attempts FROM scheduled_jobs WHERE id = $1")
        .bind(b.id.as_uuid())
        .fetch_one(queue.pool())
        .await
        .unwrap();
    assert_eq!(attempts, 1);

    let last_error: Option<String> =
        sqlx::query_scalar("SELECT last_error FROM scheduled_jobs WHERE id = $1")
            .bind(b.id.as_uuid())
            .fetch_one(queue.pool())
            .await
            .unwrap();
    assert_eq!(last_error.as_deref(), Some("smtp timeout"));
}
