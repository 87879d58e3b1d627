//! PostgreSQL integration tests for the order repository.
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p orders --test postgres_integration
//! ```

use std::sync::Arc;

use chrono::Utc;
use common::Money;
use orders::{
    Address, ChangedBy, Consignee, Contact, CourierInfo, OrderDraft, OrderItem, OrderRepository,
    OrderStatus, PostgresOrderRepository,
};
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
                "../../../migrations/002_create_orders_tables.sql"
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

/// Get a fresh repository with its own pool and cleared tables
async fn get_test_repo() -> PostgresOrderRepository {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE orders")
        .execute(&pool)
        .await
        .unwrap();

    PostgresOrderRepository::new(pool)
}

fn draft() -> OrderDraft {
    OrderDraft {
        contact: Contact {
            email: "jane@example.com".into(),
            phone: "+92-300-0000000".into(),
            marketing_opt_in: false,
        },
        shipping_address: Address {
            name: "Jane Doe".into(),
            line1: "12 Canal Road".into(),
            line2: None,
            city: "Lahore".into(),
            state: None,
            postal_code: None,
            country: "PK".into(),
            phone: "+92-300-0000000".into(),
        },
        billing_address: None,
        shipping_method: "tcs".into(),
        items: vec![OrderItem::new(
            "P1",
            None,
            2,
            Money::from_cents(50_000),
            "Widget",
        )],
        subtotal: Money::from_cents(100_000),
        shipping_fee: Money::from_cents(15_000),
        total: Money::from_cents(115_000),
        user_id: None,
        session_id: None,
    }
}

#[tokio::test]
#[serial]
async fn counter_assigns_monotonic_identifiers() {
    let repo = get_test_repo().await;

    let a = repo.next_identifiers().await.unwrap();
    let b = repo.next_identifiers().await.unwrap();

    assert!(b.order_id > a.order_id);
    assert_ne!(a.ref_id, b.ref_id);
}

#[tokio::test]
#[serial]
async fn concurrent_identifiers_are_distinct() {
    let repo = get_test_repo().await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let repo = repo.clone();
        handles.push(tokio::spawn(
            async move { repo.next_identifiers().await.unwrap() },
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for handle in handles {
        let ids = handle.await.unwrap();
        assert!(seen.insert(ids.order_id));
    }
}

#[tokio::test]
#[serial]
async fn create_and_load_roundtrip() {
    let repo = get_test_repo().await;

    let ids = repo.next_identifiers().await.unwrap();
    let order = repo.create(ids, draft()).await.unwrap();

    let loaded = repo.get(order.order_ref()).await.unwrap().unwrap();
    assert_eq!(loaded, order);
    assert_eq!(loaded.status(), OrderStatus::Pending);
    assert_eq!(loaded.history().len(), 1);

    let by_ref = repo.get_by_ref_id(order.ref_id()).await.unwrap().unwrap();
    assert_eq!(by_ref.order_ref(), order.order_ref());
}

#[tokio::test]
#[serial]
async fn status_change_is_atomic_with_history() {
    let repo = get_test_repo().await;

    let ids = repo.next_identifiers().await.unwrap();
    let order = repo.create(ids, draft()).await.unwrap();

    repo.append_status_change(
        order.order_ref(),
        OrderStatus::Confirmed,
        ChangedBy::System,
        "Confirmed",
    )
    .await
    .unwrap();

    let loaded = repo.get(order.order_ref()).await.unwrap().unwrap();
    assert_eq!(loaded.status(), OrderStatus::Confirmed);
    assert_eq!(loaded.history().last().unwrap().status, loaded.status());

    // The lifted status column tracks the document.
    let column: String = sqlx::query_scalar("SELECT status FROM orders WHERE order_ref = $1")
        .bind(order.order_ref().as_uuid())
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(column, "confirmed");
}

#[tokio::test]
#[serial]
async fn attach_courier_confirms_order() {
    let repo = get_test_repo().await;

    let ids = repo.next_identifiers().await.unwrap();
    let order = repo.create(ids, draft()).await.unwrap();

    let updated = repo
        .attach_courier(
            order.order_ref(),
            CourierInfo::booked(
                "tcs",
                "TCS123",
                Consignee {
                    name: "Jane Doe".into(),
                    address: "12 Canal Road".into(),
                    city: "Lahore".into(),
                    phone: "x".into(),
                    email: "jane@example.com".into(),
                },
                1.0,
                1,
                Money::from_cents(115_000),
                serde_json::json!({"consignment": "TCS123"}),
                Utc::now(),
            ),
        )
        .await
        .unwrap();

    assert_eq!(updated.status(), OrderStatus::Confirmed);

    let loaded = repo.get(order.order_ref()).await.unwrap().unwrap();
    assert_eq!(loaded.courier().unwrap().consignment_number, "TCS123");
    assert_eq!(loaded.history().len(), 2);
}
