//! Self-contained payload for the `checkout_complete` job.
//!
//! The payload carries everything the downstream worker needs to send the
//! confirmation with no further reads of the order, so later mutations can
//! never leak into an already-enqueued job.

use chrono::{DateTime, Utc};
use common::{Money, OrderRef};
use orders::{Address, Contact, Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// Job type tag for the post-checkout confirmation job.
pub const CHECKOUT_COMPLETE: &str = "checkout_complete";

/// Display view of one order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub label: String,
    pub quantity: u32,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Snapshot payload enqueued at the end of checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutCompletePayload {
    pub order_ref: OrderRef,
    pub order_id: u64,
    pub ref_id: String,
    pub contact: Contact,
    pub customer_name: String,
    pub items: Vec<LineSnapshot>,
    pub shipping_address: Address,
    pub shipping_method: String,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub delivery_estimate_days: u32,
    /// Order status at enqueue time, not at execution time.
    pub status: OrderStatus,
    pub consignment_number: Option<String>,
    pub enqueued_at: DateTime<Utc>,
}

impl CheckoutCompletePayload {
    /// Snapshots an order for the confirmation job.
    pub fn from_order(order: &Order, delivery_estimate_days: u32, enqueued_at: DateTime<Utc>) -> Self {
        Self {
            order_ref: order.order_ref(),
            order_id: order.order_id(),
            ref_id: order.ref_id().to_string(),
            contact: order.contact().clone(),
            customer_name: order.shipping_address().name.clone(),
            items: order
                .items()
                .iter()
                .map(|item| LineSnapshot {
                    label: item.label.clone(),
                    quantity: item.quantity,
                    price: item.price_at_purchase,
                    image: item.image.clone(),
                })
                .collect(),
            shipping_address: order.shipping_address().clone(),
            shipping_method: order.shipping_method().to_string(),
            subtotal: order.subtotal(),
            shipping_fee: order.shipping_fee(),
            total: order.total(),
            delivery_estimate_days,
            status: order.status(),
            consignment_number: order.courier().map(|c| c.consignment_number.clone()),
            enqueued_at,
        }
    }
}
