//! Configurable stub provider for tests and local wiring.

use std::sync::RwLock;

use async_trait::async_trait;
use orders::Order;

use crate::error::{CourierError, Result};
use crate::provider::{
    BookedConsignment, ConsignmentRequest, CourierProvider, consignee_from_order,
    remarks_from_order,
};

/// Courier provider that either always books a fixed consignment number or
/// always fails.
pub struct StubCourier {
    name: String,
    tracking: Option<String>,
    estimate_days: u32,
    bookings: RwLock<usize>,
}

impl StubCourier {
    /// Creates a stub that books every consignment with a fixed number.
    pub fn returning(name: impl Into<String>, tracking: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracking: Some(tracking.into()),
            estimate_days: 3,
            bookings: RwLock::new(0),
        }
    }

    /// Creates a stub that fails every booking.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracking: None,
            estimate_days: 3,
            bookings: RwLock::new(0),
        }
    }

    /// Returns the number of successful bookings.
    pub fn booking_count(&self) -> usize {
        *self.bookings.read().unwrap()
    }
}

#[async_trait]
impl CourierProvider for StubCourier {
    fn name(&self) -> &str {
        &self.name
    }

    fn payload_from_order(&self, order: &Order) -> ConsignmentRequest {
        ConsignmentRequest {
            order_ref: order.order_ref(),
            ref_id: order.ref_id().to_string(),
            consignee: consignee_from_order(order),
            destination_city: order.shipping_address().city.clone(),
            pieces: order.total_quantity(),
            weight_kg: order.total_quantity() as f64 * 0.5,
            cod_amount: order.total(),
            remarks: remarks_from_order(order),
        }
    }

    async fn book(&self, request: &ConsignmentRequest) -> Result<BookedConsignment> {
        match &self.tracking {
            Some(tracking) => {
                *self.bookings.write().unwrap() += 1;
                Ok(BookedConsignment {
                    consignment_number: tracking.clone(),
                    raw: serde_json::json!({
                        "consignment_number": tracking,
                        "reference": request.ref_id,
                    }),
                })
            }
            None => Err(CourierError::Booking {
                provider: self.name.clone(),
                reason: "stubbed failure".to_string(),
            }),
        }
    }

    fn estimate_days(&self, _city: &str) -> u32 {
        self.estimate_days
    }

    fn is_outside_city(&self, _city: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, OrderRef};
    use orders::{Address, Contact, OrderDraft, OrderIds, OrderItem};

    fn order() -> Order {
        Order::from_draft(
            OrderRef::new(),
            OrderIds::new(1001, "ORD-001001"),
            OrderDraft {
                contact: Contact {
                    email: "jane@example.com".into(),
                    phone: "x".into(),
                    marketing_opt_in: false,
                },
                shipping_address: Address {
                    name: "Jane Doe".into(),
                    line1: "12 Canal Road".into(),
                    line2: None,
                    city: "Lahore".into(),
                    state: None,
                    postal_code: None,
                    country: "PK".into(),
                    phone: "x".into(),
                },
                billing_address: None,
                shipping_method: "tcs".into(),
                items: vec![OrderItem::new(
                    "P1",
                    None,
                    1,
                    Money::from_cents(1000),
                    "Widget",
                )],
                subtotal: Money::from_cents(1000),
                shipping_fee: Money::zero(),
                total: Money::from_cents(1000),
                user_id: None,
                session_id: None,
            },
            chrono::Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn returning_stub_books_fixed_number() {
        let stub = StubCourier::returning("tcs", "TCS123");
        let order = order();

        let booked = stub.book(&stub.payload_from_order(&order)).await.unwrap();
        assert_eq!(booked.consignment_number, "TCS123");
        assert_eq!(stub.booking_count(), 1);
    }

    #[tokio::test]
    async fn failing_stub_reports_booking_error() {
        let stub = StubCourier::failing("tcs");
        let order = order();

        let result = stub.book(&stub.payload_from_order(&order)).await;
        assert!(matches!(result, Err(CourierError::Booking { .. })));
        assert_eq!(stub.booking_count(), 0);
    }
}
