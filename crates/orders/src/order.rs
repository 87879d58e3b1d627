//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{Money, OrderRef};
use serde::{Deserialize, Serialize};

use crate::courier::{CourierInfo, CourierStatus};
use crate::error::OrderError;
use crate::repository::OrderIds;
use crate::status::OrderStatus;
use crate::value_objects::{
    Address, ChangedBy, Contact, OrderItem, Payment, PaymentStatus, StatusChange,
};

/// Everything the caller supplies to create an order.
///
/// Totals are caller-computed snapshots; the order domain never re-prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub contact: Contact,
    pub shipping_address: Address,
    /// Defaults to the shipping address when absent.
    pub billing_address: Option<Address>,
    pub shipping_method: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

/// Order aggregate root.
///
/// The durable record of a purchase. Created once at checkout in `Pending`,
/// mutated only through validated transitions, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    order_ref: OrderRef,
    order_id: u64,
    ref_id: String,

    contact: Contact,
    shipping_address: Address,
    billing_address: Address,
    shipping_method: String,

    payment: Payment,
    items: Vec<OrderItem>,

    subtotal: Money,
    shipping_fee: Money,
    total: Money,

    status: OrderStatus,
    /// Append-only audit log. Every status transition appends exactly one
    /// entry, in the same step that updates `status`.
    history: Vec<StatusChange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    courier: Option<CourierInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Materializes an order from a draft with freshly assigned identifiers.
    ///
    /// The order starts in `Pending` with a single seeded history entry.
    pub fn from_draft(
        order_ref: OrderRef,
        ids: OrderIds,
        draft: OrderDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if draft.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        if let Some(item) = draft.items.iter().find(|item| item.quantity == 0) {
            return Err(OrderError::InvalidQuantity {
                quantity: item.quantity,
            });
        }

        let billing_address = draft
            .billing_address
            .unwrap_or_else(|| draft.shipping_address.clone());

        Ok(Self {
            order_ref,
            order_id: ids.order_id,
            ref_id: ids.ref_id,
            contact: draft.contact,
            shipping_address: draft.shipping_address,
            billing_address,
            shipping_method: draft.shipping_method,
            payment: Payment::default(),
            items: draft.items,
            subtotal: draft.subtotal,
            shipping_fee: draft.shipping_fee,
            total: draft.total,
            status: OrderStatus::Pending,
            history: vec![StatusChange {
                status: OrderStatus::Pending,
                changed_at: now,
                changed_by: ChangedBy::System,
                reason: "Order created".to_string(),
            }],
            courier: None,
            user_id: draft.user_id,
            session_id: draft.session_id,
            created_at: now,
            updated_at: now,
        })
    }
}

// Query methods
impl Order {
    pub fn order_ref(&self) -> OrderRef {
        self.order_ref
    }

    /// Human-facing sequential order number.
    pub fn order_id(&self) -> u64 {
        self.order_id
    }

    /// Human-facing order reference string.
    pub fn ref_id(&self) -> &str {
        &self.ref_id
    }

    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    pub fn billing_address(&self) -> &Address {
        &self.billing_address
    }

    pub fn shipping_method(&self) -> &str {
        &self.shipping_method
    }

    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping_fee(&self) -> Money {
        self.shipping_fee
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    pub fn courier(&self) -> Option<&CourierInfo> {
        self.courier.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Total quantity across all items.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

// Mutation methods (used by repositories inside their critical sections)
impl Order {
    /// Transitions the order status, appending the matching history entry.
    ///
    /// Status and history always change together; history can never record
    /// a transition the status field does not reflect.
    pub fn transition(
        &mut self,
        new_status: OrderStatus,
        changed_by: ChangedBy,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        if !self.status.can_transition_to(new_status) {
            return Err(OrderError::InvalidStatusTransition {
                from: self.status,
                to: new_status,
            });
        }

        self.status = new_status;
        self.history.push(StatusChange {
            status: new_status,
            changed_at: at,
            changed_by,
            reason: reason.into(),
        });
        self.updated_at = at;
        Ok(())
    }

    /// Embeds a courier sub-document.
    ///
    /// A record past `Pending` must carry a consignment number.
    pub fn set_courier(
        &mut self,
        courier: CourierInfo,
        at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        if courier.status != CourierStatus::Pending && courier.consignment_number.is_empty() {
            return Err(OrderError::MissingConsignmentNumber);
        }

        self.courier = Some(courier);
        self.updated_at = at;
        Ok(())
    }

    /// Records COD settlement state.
    pub fn set_payment_status(
        &mut self,
        status: PaymentStatus,
        transaction_id: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.payment.status = status;
        if transaction_id.is_some() {
            self.payment.transaction_id = transaction_id;
        }
        self.updated_at = at;
    }

    /// Updates the live shipping address.
    ///
    /// The courier consignee snapshot, if any, is deliberately left alone.
    pub fn set_shipping_address(&mut self, address: Address, at: DateTime<Utc>) {
        self.shipping_address = address;
        self.updated_at = at;
    }
}
