//! Stock ledger contract and request/report types.

use async_trait::async_trait;
use common::{OrderRef, ProductId, VariantId};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A requested quantity of one product/variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    /// The product to draw from.
    pub product_id: ProductId,

    /// Optional variant within the product.
    pub variant_id: Option<VariantId>,

    /// Requested quantity.
    pub quantity: u32,
}

impl StockLine {
    /// Creates a new stock line.
    pub fn new(
        product_id: impl Into<ProductId>,
        variant_id: Option<VariantId>,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id,
            quantity,
        }
    }
}

/// Shortage detail for a single line that cannot be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortage {
    /// Index of the line in the original request.
    pub line: usize,

    /// The product that is short.
    pub product_id: ProductId,

    /// The variant that is short, if the line named one.
    pub variant_id: Option<VariantId>,

    /// Quantity the line asked for.
    pub requested: u32,

    /// Quantity actually available. Unknown products report zero.
    pub available: u32,
}

/// Outcome of an availability check across a set of lines.
///
/// The check reflects one consistent snapshot of the ledger: no mix of lines
/// can appear available because different lines were read at different times.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityReport {
    /// Lines that cannot be satisfied, in request order. Empty means all
    /// lines are available.
    pub shortages: Vec<Shortage>,
}

impl AvailabilityReport {
    /// Returns true if every requested line can be satisfied.
    pub fn is_available(&self) -> bool {
        self.shortages.is_empty()
    }
}

/// The authoritative ledger of sellable quantity per product/variant.
///
/// `decrement` and `release` are keyed by order reference and are idempotent
/// per order: re-invoking either for the same order is a no-op, so a retried
/// checkout can never double-decrement.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Checks whether all lines can be satisfied from current stock.
    ///
    /// Pure read over a single consistent snapshot of the ledger.
    async fn check_availability(&self, lines: &[StockLine]) -> Result<AvailabilityReport>;

    /// Atomically decrements stock for all lines of an order.
    ///
    /// Availability is re-verified inside the same critical section that
    /// applies the decrement; the whole set of lines succeeds or fails
    /// together. A duplicate invocation for an order that already decremented
    /// is a no-op.
    async fn decrement(&self, order_ref: OrderRef, lines: &[StockLine]) -> Result<()>;

    /// Returns previously decremented quantity to stock.
    ///
    /// Used by the cancellation/refund path. Only effective after a recorded
    /// decrement for the same order, and at most once per order.
    async fn release(&self, order_ref: OrderRef, lines: &[StockLine]) -> Result<()>;
}
