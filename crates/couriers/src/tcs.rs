//! TCS-style courier integration.
//!
//! The provider owns payload mapping and delivery estimates; the wire call
//! itself goes through the `TcsGateway` trait, which deployments back with
//! an HTTP client configured from process credentials. An in-memory gateway
//! ships for tests and local wiring.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use orders::Order;
use serde::{Deserialize, Serialize};

use crate::error::{CourierError, Result};
use crate::provider::{
    BookedConsignment, ConsignmentRequest, CourierProvider, consignee_from_order,
    remarks_from_order,
};

/// Opaque provider configuration, supplied via process configuration.
#[derive(Debug, Clone)]
pub struct TcsConfig {
    pub account_number: String,
    pub cost_center: String,
    pub username: String,
    pub password: String,
    /// City consignments are booked from.
    pub origin_city: String,
    /// Delivery estimate within the origin city.
    pub days_in_city: u32,
    /// Delivery estimate everywhere else.
    pub days_outside_city: u32,
    /// Weight assumed per piece when the catalog carries none.
    pub piece_weight_kg: f64,
}

impl Default for TcsConfig {
    fn default() -> Self {
        Self {
            account_number: String::new(),
            cost_center: String::new(),
            username: String::new(),
            password: String::new(),
            origin_city: "Lahore".to_string(),
            days_in_city: 2,
            days_outside_city: 5,
            piece_weight_kg: 0.5,
        }
    }
}

/// Booking payload in the shape the TCS API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcsBookingRequest {
    pub user_name: String,
    pub password: String,
    pub account_no: String,
    pub cost_center_code: String,
    pub consignee_name: String,
    pub consignee_address: String,
    pub consignee_mobile: String,
    pub consignee_email: String,
    pub destination_city: String,
    pub pieces: u32,
    pub weight_kg: f64,
    /// COD amount in whole currency units, as the API wants it.
    pub cod_amount: String,
    pub customer_reference_no: String,
    pub remarks: String,
}

/// Raw booking outcome from the TCS API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcsBookingResponse {
    /// Consignment number; empty when the API accepted the call but booked
    /// nothing.
    pub consignment_number: String,
    pub raw: serde_json::Value,
}

/// Wire transport for TCS bookings.
#[async_trait]
pub trait TcsGateway: Send + Sync {
    /// Submits a booking to the TCS API.
    async fn submit(&self, request: &TcsBookingRequest) -> Result<TcsBookingResponse>;
}

/// TCS courier provider.
pub struct TcsCourier {
    config: TcsConfig,
    gateway: Arc<dyn TcsGateway>,
}

impl TcsCourier {
    /// Creates a TCS provider over the given gateway.
    pub fn new(config: TcsConfig, gateway: Arc<dyn TcsGateway>) -> Self {
        Self { config, gateway }
    }

    fn booking_request(&self, request: &ConsignmentRequest) -> TcsBookingRequest {
        TcsBookingRequest {
            user_name: self.config.username.clone(),
            password: self.config.password.clone(),
            account_no: self.config.account_number.clone(),
            cost_center_code: self.config.cost_center.clone(),
            consignee_name: request.consignee.name.clone(),
            consignee_address: request.consignee.address.clone(),
            consignee_mobile: request.consignee.phone.clone(),
            consignee_email: request.consignee.email.clone(),
            destination_city: request.destination_city.clone(),
            pieces: request.pieces,
            weight_kg: request.weight_kg,
            cod_amount: request.cod_amount.major().to_string(),
            customer_reference_no: request.ref_id.clone(),
            remarks: request.remarks.clone(),
        }
    }
}

#[async_trait]
impl CourierProvider for TcsCourier {
    fn name(&self) -> &str {
        "tcs"
    }

    fn payload_from_order(&self, order: &Order) -> ConsignmentRequest {
        let pieces = order.total_quantity();
        ConsignmentRequest {
            order_ref: order.order_ref(),
            ref_id: order.ref_id().to_string(),
            consignee: consignee_from_order(order),
            destination_city: order.shipping_address().city.clone(),
            pieces,
            weight_kg: pieces as f64 * self.config.piece_weight_kg,
            cod_amount: order.total(),
            remarks: remarks_from_order(order),
        }
    }

    #[tracing::instrument(skip(self, request), fields(provider = self.name(), ref_id = %request.ref_id))]
    async fn book(&self, request: &ConsignmentRequest) -> Result<BookedConsignment> {
        metrics::counter!("courier_bookings_total", "provider" => "tcs").increment(1);

        let response = self.gateway.submit(&self.booking_request(request)).await?;

        if response.consignment_number.is_empty() {
            return Err(CourierError::MissingConsignmentNumber {
                provider: self.name().to_string(),
            });
        }

        tracing::info!(consignment = %response.consignment_number, "consignment booked");
        Ok(BookedConsignment {
            consignment_number: response.consignment_number,
            raw: response.raw,
        })
    }

    fn estimate_days(&self, city: &str) -> u32 {
        if self.is_outside_city(city) {
            self.config.days_outside_city
        } else {
            self.config.days_in_city
        }
    }

    fn is_outside_city(&self, city: &str) -> bool {
        !city.eq_ignore_ascii_case(&self.config.origin_city)
    }
}

#[derive(Debug, Default)]
struct InMemoryTcsState {
    bookings: Vec<TcsBookingRequest>,
    next_id: u32,
    fail_on_submit: bool,
}

/// In-memory TCS gateway for testing and local wiring.
#[derive(Clone, Default)]
pub struct InMemoryTcsGateway {
    state: Arc<RwLock<InMemoryTcsState>>,
}

impl InMemoryTcsGateway {
    /// Creates a new in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to fail the next submit call.
    pub fn set_fail_on_submit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_submit = fail;
    }

    /// Returns the number of submitted bookings.
    pub fn booking_count(&self) -> usize {
        self.state.read().unwrap().bookings.len()
    }

    /// Returns the most recent booking request, if any.
    pub fn last_booking(&self) -> Option<TcsBookingRequest> {
        self.state.read().unwrap().bookings.last().cloned()
    }
}

#[async_trait]
impl TcsGateway for InMemoryTcsGateway {
    async fn submit(&self, request: &TcsBookingRequest) -> Result<TcsBookingResponse> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_submit {
            return Err(CourierError::Gateway("connection refused".to_string()));
        }

        state.next_id += 1;
        let consignment_number = format!("CN-{:07}", state.next_id);
        state.bookings.push(request.clone());

        Ok(TcsBookingResponse {
            raw: serde_json::json!({
                "consignment_number": consignment_number,
                "reference": request.customer_reference_no,
            }),
            consignment_number,
        })
    }
}
