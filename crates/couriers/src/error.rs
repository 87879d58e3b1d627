//! Courier error types.

use thiserror::Error;

/// Errors that can occur during courier operations.
#[derive(Debug, Error)]
pub enum CourierError {
    /// The provider rejected or failed the booking.
    #[error("booking failed with {provider}: {reason}")]
    Booking { provider: String, reason: String },

    /// The provider accepted the booking but returned no consignment number.
    #[error("provider {provider} returned no consignment number")]
    MissingConsignmentNumber { provider: String },

    /// The transport underneath the provider failed.
    #[error("gateway error: {0}")]
    Gateway(String),
}

/// Convenience type alias for courier results.
pub type Result<T> = std::result::Result<T, CourierError>;
