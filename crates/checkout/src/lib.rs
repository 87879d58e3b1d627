//! Fulfillment orchestrator for the storefront checkout core.
//!
//! Drives the checkout pipeline: stock verification, order persistence with
//! an audit trail, optional courier booking, best-effort customer
//! notification, and durable scheduling of the confirmation job. Only
//! validation and order-persistence failures surface to the shopper; every
//! later failure is absorbed and reported through logs and metrics, so the
//! sale is never blocked by a downstream system.

pub mod error;
pub mod notify;
pub mod service;
pub mod snapshot;

pub use error::{CheckoutError, Result};
pub use notify::{InMemoryNotifier, Notifier, NotifyError, OrderConfirmation};
pub use service::{CheckoutReceipt, CheckoutService};
pub use snapshot::{CHECKOUT_COMPLETE, CheckoutCompletePayload, LineSnapshot};
