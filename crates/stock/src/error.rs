//! Stock ledger error types.

use thiserror::Error;

use crate::ledger::Shortage;

/// Errors that can occur during stock ledger operations.
#[derive(Debug, Error)]
pub enum StockError {
    /// One or more lines cannot be satisfied from current stock.
    #[error("insufficient stock for {} line(s)", shortages.len())]
    Insufficient {
        /// Per-line shortage detail, in request order.
        shortages: Vec<Shortage>,
    },

    /// The backing store rejected the operation.
    #[error("stock store error: {0}")]
    Store(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for stock results.
pub type Result<T> = std::result::Result<T, StockError>;
