use async_trait::async_trait;
use chrono::Utc;
use common::OrderRef;
use sqlx::{PgPool, Row};

use crate::courier::CourierInfo;
use crate::error::{OrderError, Result};
use crate::order::{Order, OrderDraft};
use crate::repository::{OrderIds, OrderRepository};
use crate::status::OrderStatus;
use crate::value_objects::{Address, ChangedBy, PaymentStatus};

/// PostgreSQL-backed order repository.
///
/// The full aggregate lives in a JSONB document; identifiers and status are
/// lifted into columns for uniqueness constraints and lookups. Mutations
/// lock the row (`FOR UPDATE`), apply the aggregate's own validation, and
/// write status and document back in the same transaction.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
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

    async fn mutate<F>(&self, order_ref: OrderRef, f: F) -> Result<Order>
    where
        F: FnOnce(&mut Order) -> Result<()> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT document FROM orders WHERE order_ref = $1 FOR UPDATE")
            .bind(order_ref.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(OrderError::NotFound(order_ref))?;

        let document: serde_json::Value = row.try_get("document")?;
        let mut order: Order = serde_json::from_value(document)?;

        f(&mut order)?;

        sqlx::query(
            "UPDATE orders SET status = $2, document = $3, updated_at = $4 WHERE order_ref = $1",
        )
        .bind(order_ref.as_uuid())
        .bind(order.status().as_str())
        .bind(serde_json::to_value(&order)?)
        .bind(order.updated_at())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }

    fn row_to_order(row: sqlx::postgres::PgRow) -> Result<Order> {
        let document: serde_json::Value = row.try_get("document")?;
        Ok(serde_json::from_value(document)?)
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn next_identifiers(&self) -> Result<OrderIds> {
        let value: i64 = sqlx::query_scalar(
            "UPDATE counters SET value = value + 1 WHERE name = 'order_seq' RETURNING value",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderIds::from_sequence(value as u64))
    }

    async fn create(&self, ids: OrderIds, draft: OrderDraft) -> Result<Order> {
        let order = Order::from_draft(OrderRef::new(), ids, draft, Utc::now())?;

        sqlx::query(
            r#"
            INSERT INTO orders (order_ref, order_id, ref_id, status, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.order_ref().as_uuid())
        .bind(order.order_id() as i64)
        .bind(order.ref_id())
        .bind(order.status().as_str())
        .bind(serde_json::to_value(&order)?)
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(order)
    }

    async fn get(&self, order_ref: OrderRef) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT document FROM orders WHERE order_ref = $1")
            .bind(order_ref.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn get_by_ref_id(&self, ref_id: &str) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT document FROM orders WHERE ref_id = $1")
            .bind(ref_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn append_status_change(
        &self,
        order_ref: OrderRef,
        new_status: OrderStatus,
        changed_by: ChangedBy,
        reason: &str,
    ) -> Result<Order> {
        self.mutate(order_ref, |order| {
            order.transition(new_status, changed_by, reason, Utc::now())
        })
        .await
    }

    async fn attach_courier(&self, order_ref: OrderRef, courier: CourierInfo) -> Result<Order> {
        self.mutate(order_ref, |order| {
            let now = Utc::now();
            let consignment_number = courier.consignment_number.clone();
            let provider = courier.provider.clone();
            order.set_courier(courier, now)?;
            if !consignment_number.is_empty() {
                order.transition(
                    OrderStatus::Confirmed,
                    ChangedBy::System,
                    format!("Consignment {consignment_number} booked with {provider}"),
                    now,
                )?;
            }
            Ok(())
        })
        .await
    }

    async fn record_payment_status(
        &self,
        order_ref: OrderRef,
        status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> Result<Order> {
        self.mutate(order_ref, |order| {
            order.set_payment_status(status, transaction_id, Utc::now());
            Ok(())
        })
        .await
    }

    async fn update_shipping_address(
        &self,
        order_ref: OrderRef,
        address: Address,
    ) -> Result<Order> {
        self.mutate(order_ref, |order| {
            order.set_shipping_address(address, Utc::now());
            Ok(())
        })
        .await
    }
}
