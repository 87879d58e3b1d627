//! Embedded courier sub-document.
//!
//! Courier state has no lifecycle of its own, so it lives inside the order
//! aggregate as an owned value rather than a separately stored entity.

use chrono::{DateTime, Utc};
use common::Money;
use serde::{Deserialize, Serialize};

/// Delivery progress of a booked consignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourierStatus {
    /// Booking not yet attempted or not yet acknowledged.
    #[default]
    Pending,
    /// Consignment created with the provider.
    Created,
    /// Courier picked the parcel up.
    PickedUp,
    /// Parcel moving through the courier network.
    InTransit,
    /// Parcel out with the delivery rider.
    OutForDelivery,
    /// Delivered (terminal).
    Delivered,
    /// Courier reported a failure (terminal).
    Failed,
    /// Consignment cancelled (terminal).
    Cancelled,
}

impl CourierStatus {
    /// Returns the status name as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            CourierStatus::Pending => "pending",
            CourierStatus::Created => "created",
            CourierStatus::PickedUp => "picked_up",
            CourierStatus::InTransit => "in_transit",
            CourierStatus::OutForDelivery => "out_for_delivery",
            CourierStatus::Delivered => "delivered",
            CourierStatus::Failed => "failed",
            CourierStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for CourierStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Consignee details snapshotted at booking time.
///
/// Deliberately decoupled from the order's live shipping address: a later
/// address edit must not corrupt what was actually handed to the courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consignee {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
}

/// One entry in the consignment's append-only tracking history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: CourierStatus,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Courier booking state embedded in an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierInfo {
    /// Registry key of the provider that booked the consignment.
    pub provider: String,

    /// Tracking/consignment number assigned by the provider. Empty only
    /// while `status` is still `Pending`.
    pub consignment_number: String,

    pub consignee: Consignee,

    pub weight_kg: f64,
    pub pieces: u32,

    /// Amount to collect on delivery.
    pub cod_amount: Money,

    pub status: CourierStatus,

    /// Append-only delivery progress log.
    pub tracking_history: Vec<TrackingEvent>,

    /// Raw provider API response cached for troubleshooting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_response: Option<serde_json::Value>,

    /// Provider API errors observed for this consignment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_errors: Vec<String>,
}

impl CourierInfo {
    /// Builds the sub-document for a successfully booked consignment.
    pub fn booked(
        provider: impl Into<String>,
        consignment_number: impl Into<String>,
        consignee: Consignee,
        weight_kg: f64,
        pieces: u32,
        cod_amount: Money,
        raw: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            provider: provider.into(),
            consignment_number: consignment_number.into(),
            consignee,
            weight_kg,
            pieces,
            cod_amount,
            status: CourierStatus::Created,
            tracking_history: vec![TrackingEvent {
                status: CourierStatus::Created,
                at,
                note: None,
            }],
            api_response: Some(raw),
            api_errors: Vec::new(),
        }
    }

    /// Appends a tracking event and advances the courier status.
    pub fn track(&mut self, status: CourierStatus, at: DateTime<Utc>, note: Option<String>) {
        self.status = status;
        self.tracking_history.push(TrackingEvent { status, at, note });
    }
}
