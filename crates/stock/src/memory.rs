use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderRef, ProductId, VariantId};
use tokio::sync::RwLock;

use crate::error::{Result, StockError};
use crate::ledger::{AvailabilityReport, Shortage, StockLedger, StockLine};

type StockKey = (ProductId, Option<VariantId>);

#[derive(Debug, Default)]
struct LedgerState {
    levels: HashMap<StockKey, u32>,
    decremented: HashSet<OrderRef>,
    released: HashSet<OrderRef>,
    fail_on_decrement: bool,
}

impl LedgerState {
    fn shortages(&self, lines: &[StockLine]) -> Vec<Shortage> {
        lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                let key = (line.product_id.clone(), line.variant_id.clone());
                let available = self.levels.get(&key).copied().unwrap_or(0);
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

/// In-memory stock ledger.
///
/// Backs tests and local wiring with the same interface as the PostgreSQL
/// implementation. A single lock over the whole ledger makes the
/// check-and-decrement of a multi-line order one critical section.
#[derive(Clone, Default)]
pub struct InMemoryStockLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryStockLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the available quantity for a product/variant.
    pub async fn seed(
        &self,
        product_id: impl Into<ProductId>,
        variant_id: Option<VariantId>,
        quantity: u32,
    ) {
        self.state
            .write()
            .await
            .levels
            .insert((product_id.into(), variant_id), quantity);
    }

    /// Returns the available quantity for a product/variant.
    pub async fn available(
        &self,
        product_id: impl Into<ProductId>,
        variant_id: Option<VariantId>,
    ) -> u32 {
        self.state
            .read()
            .await
            .levels
            .get(&(product_id.into(), variant_id))
            .copied()
            .unwrap_or(0)
    }

    /// Configures the ledger to fail the next decrement with a store error.
    ///
    /// Lets orchestrator tests exercise the decrement-failed-after-create
    /// path, which cannot occur naturally in memory.
    pub async fn set_fail_on_decrement(&self, fail: bool) {
        self.state.write().await.fail_on_decrement = fail;
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn check_availability(&self, lines: &[StockLine]) -> Result<AvailabilityReport> {
        let state = self.state.read().await;
        Ok(AvailabilityReport {
            shortages: state.shortages(lines),
        })
    }

    async fn decrement(&self, order_ref: OrderRef, lines: &[StockLine]) -> Result<()> {
        let mut state = self.state.write().await;

        if state.decremented.contains(&order_ref) {
            tracing::debug!(%order_ref, "duplicate decrement ignored");
            return Ok(());
        }

        if state.fail_on_decrement {
            return Err(StockError::Store("injected decrement failure".to_string()));
        }

        // Re-check inside the write lock so no concurrent checkout can
        // invalidate the verdict before the decrement lands.
        let shortages = state.shortages(lines);
        if !shortages.is_empty() {
            return Err(StockError::Insufficient { shortages });
        }

        for line in lines {
            let key = (line.product_id.clone(), line.variant_id.clone());
            if let Some(available) = state.levels.get_mut(&key) {
                *available -= line.quantity;
            }
        }
        state.decremented.insert(order_ref);

        Ok(())
    }

    async fn release(&self, order_ref: OrderRef, lines: &[StockLine]) -> Result<()> {
        let mut state = self.state.write().await;

        if !state.decremented.contains(&order_ref) || state.released.contains(&order_ref) {
            tracing::debug!(%order_ref, "release without matching decrement ignored");
            return Ok(());
        }

        for line in lines {
            let key = (line.product_id.clone(), line.variant_id.clone());
            *state.levels.entry(key).or_insert(0) += line.quantity;
        }
        state.released.insert(order_ref);

        Ok(())
    }
}
