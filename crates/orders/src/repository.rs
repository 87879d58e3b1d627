//! Order repository contract.

use async_trait::async_trait;
use common::OrderRef;
use serde::{Deserialize, Serialize};

use crate::courier::CourierInfo;
use crate::error::Result;
use crate::order::{Order, OrderDraft};
use crate::status::OrderStatus;
use crate::value_objects::{Address, ChangedBy, PaymentStatus};

/// Human-facing order identifiers assigned from a durable atomic sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIds {
    /// Sequential order number.
    pub order_id: u64,
    /// Order reference string derived from the same sequence.
    pub ref_id: String,
}

impl OrderIds {
    /// Creates an identifier pair.
    pub fn new(order_id: u64, ref_id: impl Into<String>) -> Self {
        Self {
            order_id,
            ref_id: ref_id.into(),
        }
    }

    /// Derives the reference string for a sequence value.
    pub fn from_sequence(value: u64) -> Self {
        Self {
            order_id: value,
            ref_id: format!("ORD-{value:06}"),
        }
    }
}

/// Durable storage for order aggregates.
///
/// Mutating operations load, validate, and write the aggregate inside one
/// critical section (lock or transaction), so the status field and the
/// history log can never disagree.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Assigns the next order identifiers.
    ///
    /// Backed by an atomic find-and-increment; collision-free and monotonic
    /// under concurrent callers.
    async fn next_identifiers(&self) -> Result<OrderIds>;

    /// Persists a new order in `Pending` with its seeded history entry.
    async fn create(&self, ids: OrderIds, draft: OrderDraft) -> Result<Order>;

    /// Loads an order by its internal reference.
    async fn get(&self, order_ref: OrderRef) -> Result<Option<Order>>;

    /// Loads an order by its human-facing reference string.
    async fn get_by_ref_id(&self, ref_id: &str) -> Result<Option<Order>>;

    /// Atomically transitions the order status and appends the matching
    /// history entry.
    async fn append_status_change(
        &self,
        order_ref: OrderRef,
        new_status: OrderStatus,
        changed_by: ChangedBy,
        reason: &str,
    ) -> Result<Order>;

    /// Embeds the courier sub-document and, when the booking carries a
    /// consignment number, transitions the order to `Confirmed` in the same
    /// atomic step with a reason citing the tracking number.
    async fn attach_courier(&self, order_ref: OrderRef, courier: CourierInfo) -> Result<Order>;

    /// Records COD settlement state.
    async fn record_payment_status(
        &self,
        order_ref: OrderRef,
        status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> Result<Order>;

    /// Updates the live shipping address.
    ///
    /// Never touches the courier consignee snapshot or anything already
    /// handed to downstream consumers.
    async fn update_shipping_address(&self, order_ref: OrderRef, address: Address)
    -> Result<Order>;
}
