//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use checkout::{CheckoutService, InMemoryNotifier};
use common::Money;
use jobs::JobQueue;
use orders::{Address, Contact, OrderDraft, OrderItem, OrderRepository};
use serde::{Deserialize, Serialize};
use stock::StockLedger;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<L, R, Q>
where
    L: StockLedger,
    R: OrderRepository,
    Q: JobQueue,
{
    pub checkout: CheckoutService<L, R, Q, InMemoryNotifier>,
    pub orders: R,
}

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub contact: ContactRequest,
    pub shipping_address: AddressRequest,
    pub billing_address: Option<AddressRequest>,
    pub items: Vec<ItemRequest>,
    /// Caller-computed snapshot in cents; the pipeline never re-prices.
    pub subtotal: i64,
    pub shipping_fee: i64,
    pub total: i64,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub shipping_method: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub marketing_opt_in: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub phone: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
    /// Product display name; falls back to the product ID.
    pub name: Option<String>,
    pub qty: u32,
    /// Unit price snapshot in cents.
    pub price: i64,
    pub variant_label: Option<String>,
    pub image: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub order_id: u64,
    pub ref_id: String,
    pub order_ref: String,
    pub order: serde_json::Value,
}

impl From<AddressRequest> for Address {
    fn from(req: AddressRequest) -> Self {
        Address {
            name: req.name,
            line1: req.line1,
            line2: req.line2,
            city: req.city,
            state: req.state,
            postal_code: req.postal_code,
            country: req.country,
            phone: req.phone,
        }
    }
}

impl From<ItemRequest> for OrderItem {
    fn from(req: ItemRequest) -> Self {
        let name = req.name.unwrap_or_else(|| req.product_id.clone());
        let label = match &req.variant_label {
            Some(variant) => format!("{name} ({variant})"),
            None => name,
        };

        let mut item = OrderItem::new(
            req.product_id,
            req.variant_id.map(Into::into),
            req.qty,
            Money::from_cents(req.price),
            label,
        );
        item.image = req.image;
        item
    }
}

impl From<CheckoutRequest> for OrderDraft {
    fn from(req: CheckoutRequest) -> Self {
        OrderDraft {
            contact: Contact {
                email: req.contact.email,
                phone: req.contact.phone,
                marketing_opt_in: req.contact.marketing_opt_in,
            },
            shipping_address: req.shipping_address.into(),
            billing_address: req.billing_address.map(Into::into),
            shipping_method: req.shipping_method,
            items: req.items.into_iter().map(Into::into).collect(),
            subtotal: Money::from_cents(req.subtotal),
            shipping_fee: Money::from_cents(req.shipping_fee),
            total: Money::from_cents(req.total),
            user_id: req.user_id,
            session_id: req.session_id,
        }
    }
}

// -- Handlers --

/// POST /checkout — place an order.
#[tracing::instrument(skip(state, req))]
pub async fn create<L, R, Q>(
    State(state): State<Arc<AppState<L, R, Q>>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError>
where
    L: StockLedger + 'static,
    R: OrderRepository + 'static,
    Q: JobQueue + 'static,
{
    let receipt = state.checkout.place_order(req.into()).await?;

    let order = serde_json::to_value(&receipt.order)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            success: true,
            order_id: receipt.order_id,
            ref_id: receipt.ref_id,
            order_ref: receipt.order_ref.to_string(),
            order,
        }),
    ))
}
