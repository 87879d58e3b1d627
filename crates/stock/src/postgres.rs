use std::collections::HashMap;

use async_trait::async_trait;
use common::OrderRef;
use sqlx::{PgExecutor, PgPool, Row};

use crate::error::{Result, StockError};
use crate::ledger::{AvailabilityReport, Shortage, StockLedger, StockLine};

/// PostgreSQL-backed stock ledger.
///
/// Stock rows are keyed by `(product_id, variant_id)` with the empty string
/// keying the no-variant row. Decrements run in one transaction with a
/// conditional `available >= quantity` update per line, and a
/// `stock_movements` row keyed by order reference makes the decrement
/// idempotent per order.
#[derive(Clone)]
pub struct PostgresStockLedger {
    pool: PgPool,
}

impl PostgresStockLedger {
    /// Creates a new PostgreSQL stock ledger.
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

    fn variant_key(line: &StockLine) -> &str {
        line.variant_id.as_ref().map(|v| v.as_str()).unwrap_or("")
    }

    /// Fetches current levels for every key named by `lines` in one
    /// statement, so the result is a single consistent snapshot.
    async fn fetch_levels<'e, E>(
        executor: E,
        lines: &[StockLine],
    ) -> Result<HashMap<(String, String), i64>>
    where
        E: PgExecutor<'e>,
    {
        if lines.is_empty() {
            return Ok(HashMap::new());
        }

        let mut sql = String::from(
            "SELECT product_id, variant_id, available FROM stock_levels WHERE (product_id, variant_id) IN (",
        );
        for (idx, _) in lines.iter().enumerate() {
            if idx > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("(${}, ${})", idx * 2 + 1, idx * 2 + 2));
        }
        sql.push(')');

        let mut query = sqlx::query(&sql);
        for line in lines {
            query = query
                .bind(line.product_id.as_str())
                .bind(Self::variant_key(line));
        }

        let rows = query.fetch_all(executor).await?;

        let mut levels = HashMap::new();
        for row in rows {
            let product_id: String = row.try_get("product_id")?;
            let variant_id: String = row.try_get("variant_id")?;
            let available: i64 = row.try_get("available")?;
            levels.insert((product_id, variant_id), available);
        }
        Ok(levels)
    }

    fn shortages(lines: &[StockLine], levels: &HashMap<(String, String), i64>) -> Vec<Shortage> {
        lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                let key = (
                    line.product_id.as_str().to_string(),
                    Self::variant_key(line).to_string(),
                );
                let available = levels.get(&key).copied().unwrap_or(0).max(0) as u32;
                (available < line.quantity).then(|| Shortage {
                    line: idx,
                    product_id: line.product_id.clone(),
                    variant_id: line.variant_id.clone(),
                    requested: line.quantity,
                    available,
                })
            })
            .collect()
    }
}

#[async_trait]
impl StockLedger for PostgresStockLedger {
    async fn check_availability(&self, lines: &[StockLine]) -> Result<AvailabilityReport> {
        let levels = Self::fetch_levels(&self.pool, lines).await?;
        Ok(AvailabilityReport {
            shortages: Self::shortages(lines, &levels),
        })
    }

    async fn decrement(&self, order_ref: OrderRef, lines: &[StockLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO stock_movements (order_ref, kind) VALUES ($1, 'decrement') ON CONFLICT DO NOTHING",
        )
        .bind(order_ref.as_uuid())
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tracing::debug!(%order_ref, "duplicate decrement ignored");
            return Ok(());
        }

        for line in lines {
            let updated = sqlx::query(
                r#"
                UPDATE stock_levels
                SET available = available - $3
                WHERE product_id = $1 AND variant_id = $2 AND available >= $3
                "#,
            )
            .bind(line.product_id.as_str())
            .bind(Self::variant_key(line))
            .bind(line.quantity as i64)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                // Some line lost the race since the caller's availability
                // check. Report the full shortage picture and roll back.
                let levels = Self::fetch_levels(&mut *tx, lines).await?;
                let shortages = Self::shortages(lines, &levels);
                tx.rollback().await?;
                return Err(StockError::Insufficient { shortages });
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn release(&self, order_ref: OrderRef, lines: &[StockLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let decremented: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM stock_movements WHERE order_ref = $1 AND kind = 'decrement')",
        )
        .bind(order_ref.as_uuid())
        .fetch_one(&mut *tx)
        .await?;

        if !decremented {
            tracing::debug!(%order_ref, "release without matching decrement ignored");
            return Ok(());
        }

        let inserted = sqlx::query(
            "INSERT INTO stock_movements (order_ref, kind) VALUES ($1, 'release') ON CONFLICT DO NOTHING",
        )
        .bind(order_ref.as_uuid())
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tracing::debug!(%order_ref, "duplicate release ignored");
            return Ok(());
        }

        for line in lines {
            sqlx::query(
                r#"
                UPDATE stock_levels
                SET available = available + $3
                WHERE product_id = $1 AND variant_id = $2
                "#,
            )
            .bind(line.product_id.as_str())
            .bind(Self::variant_key(line))
            .bind(line.quantity as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
