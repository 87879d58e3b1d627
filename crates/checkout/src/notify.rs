//! Best-effort customer notification.
//!
//! The direct send is a latency optimization only; the scheduled
//! `checkout_complete` job is the durable guarantee. A notifier failure is
//! swallowed by the orchestrator and never fails a checkout.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, OrderRef};
use orders::{Order, OrderStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Notification delivery error.
#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Flattened order-confirmation payload handed to messaging collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_ref: OrderRef,
    pub order_id: u64,
    pub ref_id: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub total: Money,
    pub item_count: u32,
    pub delivery_estimate_days: u32,
    pub status: OrderStatus,
    pub consignment_number: Option<String>,
}

impl OrderConfirmation {
    /// Flattens an order into the confirmation payload.
    pub fn from_order(order: &Order, delivery_estimate_days: u32) -> Self {
        Self {
            order_ref: order.order_ref(),
            order_id: order.order_id(),
            ref_id: order.ref_id().to_string(),
            customer_name: order.shipping_address().name.clone(),
            email: order.contact().email.clone(),
            phone: order.contact().phone.clone(),
            total: order.total(),
            item_count: order.total_quantity(),
            delivery_estimate_days,
            status: order.status(),
            consignment_number: order.courier().map(|c| c.consignment_number.clone()),
        }
    }
}

/// Messaging collaborator for direct order confirmations.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends an order confirmation to the customer.
    async fn order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotifyError>;
}

#[derive(Debug, Default)]
struct NotifierState {
    sent: Vec<OrderConfirmation>,
    fail_on_send: bool,
}

/// In-memory notifier for testing and local wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<NotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail the next send.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns the number of confirmations sent.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns the most recent confirmation, if any.
    pub fn last_sent(&self) -> Option<OrderConfirmation> {
        self.state.read().unwrap().sent.last().cloned()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotifyError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_send {
            return Err(NotifyError("messaging API unavailable".to_string()));
        }

        state.sent.push(confirmation.clone());
        Ok(())
    }
}
