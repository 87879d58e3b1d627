//! Order read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::OrderRef;
use jobs::JobQueue;
use orders::{Order, OrderRepository, StatusChange};
use stock::StockLedger;

use crate::error::ApiError;
use crate::routes::checkout::AppState;

/// Looks an order up by internal UUID reference or human-facing ref string.
async fn load_order<R: OrderRepository>(orders: &R, id: &str) -> Result<Order, ApiError> {
    let order = match uuid::Uuid::parse_str(id) {
        Ok(uuid) => orders.get(OrderRef::from_uuid(uuid)).await?,
        Err(_) => orders.get_by_ref_id(id).await?,
    };

    order.ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))
}

/// GET /orders/{id} — load an order document.
#[tracing::instrument(skip(state))]
pub async fn get<L, R, Q>(
    State(state): State<Arc<AppState<L, R, Q>>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    L: StockLedger + 'static,
    R: OrderRepository + 'static,
    Q: JobQueue + 'static,
{
    let order = load_order(&state.orders, &id).await?;
    serde_json::to_value(&order)
        .map(Json)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// GET /orders/{id}/history — the order's append-only audit trail.
#[tracing::instrument(skip(state))]
pub async fn history<L, R, Q>(
    State(state): State<Arc<AppState<L, R, Q>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StatusChange>>, ApiError>
where
    L: StockLedger + 'static,
    R: OrderRepository + 'static,
    Q: JobQueue + 'static,
{
    let order = load_order(&state.orders, &id).await?;
    Ok(Json(order.history().to_vec()))
}
