//! Checkout error taxonomy.
//!
//! Only two failure classes are ever visible to the shopper: a validation
//! failure (including insufficient stock) before any side effect, and a
//! failure to persist the order itself. Everything downstream of the
//! persisted order is absorbed by the orchestrator.

use stock::{Shortage, StockError};
use thiserror::Error;

/// Errors surfaced to the checkout caller.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request is structurally invalid.
    #[error("invalid checkout request: {0}")]
    Invalid(String),

    /// Stock cannot satisfy the requested lines. No side effects occurred.
    #[error("insufficient stock for {} line(s)", shortages.len())]
    InsufficientStock {
        /// Per-line shortage detail, in request order.
        shortages: Vec<Shortage>,
    },

    /// The availability check itself failed.
    #[error("stock ledger error: {0}")]
    Stock(#[source] StockError),

    /// The order could not be persisted. Nothing downstream was attempted.
    #[error("failed to persist order: {0}")]
    Persistence(#[source] orders::OrderError),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
