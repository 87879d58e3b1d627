//! Order domain error types.

use common::OrderRef;
use thiserror::Error;

use crate::status::OrderStatus;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Orders must contain at least one item.
    #[error("order must contain at least one item")]
    EmptyItems,

    /// Item quantity must be at least one.
    #[error("invalid quantity: {quantity}")]
    InvalidQuantity { quantity: u32 },

    /// The requested status transition is not allowed.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// A courier sub-document past the pending state must carry a
    /// consignment number.
    #[error("courier record is missing a consignment number")]
    MissingConsignmentNumber,

    /// Order not found.
    #[error("order not found: {0}")]
    NotFound(OrderRef),

    /// The backing store rejected the operation.
    #[error("order store error: {0}")]
    Store(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for order results.
pub type Result<T> = std::result::Result<T, OrderError>;
