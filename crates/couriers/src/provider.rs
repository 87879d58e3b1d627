//! Courier provider contract.

use async_trait::async_trait;
use common::{Money, OrderRef};
use orders::{Consignee, Order};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Provider-facing view of an order, built by `payload_from_order`.
///
/// The consignee is a snapshot taken from the order's shipping address and
/// contact at mapping time; later edits to the live order do not reach the
/// provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsignmentRequest {
    pub order_ref: OrderRef,
    /// Human-facing order reference, quoted to the provider.
    pub ref_id: String,
    pub consignee: Consignee,
    pub destination_city: String,
    pub pieces: u32,
    pub weight_kg: f64,
    /// Amount the courier collects on delivery.
    pub cod_amount: Money,
    /// Free-text parcel description (item labels).
    pub remarks: String,
}

/// A successfully booked consignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedConsignment {
    /// Tracking/consignment number assigned by the provider.
    pub consignment_number: String,
    /// Raw provider response, cached on the order for troubleshooting.
    pub raw: serde_json::Value,
}

/// A shipping/courier integration.
///
/// Implementations are registered in the `CourierRegistry` under their
/// shipping-method key and dispatched dynamically at checkout time.
#[async_trait]
pub trait CourierProvider: Send + Sync {
    /// Registry key and display name of this provider.
    fn name(&self) -> &str;

    /// Maps an order to this provider's consignment request.
    ///
    /// Pure transformation; required-field validation happens upstream.
    fn payload_from_order(&self, order: &Order) -> ConsignmentRequest;

    /// Books a consignment with the provider.
    ///
    /// The only networked operation on this trait. Callers must not retry
    /// blindly: consignment creation is not guaranteed idempotent at the
    /// provider.
    async fn book(&self, request: &ConsignmentRequest) -> Result<BookedConsignment>;

    /// Estimated delivery days to a destination city.
    fn estimate_days(&self, city: &str) -> u32;

    /// Whether a destination city is outside the provider's origin city.
    fn is_outside_city(&self, city: &str) -> bool;
}

/// Builds the consignee snapshot shared by provider mappings.
pub(crate) fn consignee_from_order(order: &Order) -> Consignee {
    let shipping = order.shipping_address();
    let mut address = shipping.line1.clone();
    if let Some(line2) = &shipping.line2 {
        address.push_str(", ");
        address.push_str(line2);
    }

    Consignee {
        name: shipping.name.clone(),
        address,
        city: shipping.city.clone(),
        phone: shipping.phone.clone(),
        email: order.contact().email.clone(),
    }
}

/// Joins item labels into the parcel description quoted to the provider.
pub(crate) fn remarks_from_order(order: &Order) -> String {
    order
        .items()
        .iter()
        .map(|item| format!("{} x{}", item.label, item.quantity))
        .collect::<Vec<_>>()
        .join("; ")
}
