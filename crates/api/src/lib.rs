//! HTTP API server with observability for the storefront checkout core.
//!
//! Provides the checkout endpoint and order read endpoints, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{CheckoutService, InMemoryNotifier};
use couriers::{CourierRegistry, InMemoryTcsGateway, TcsCourier};
use jobs::{InMemoryJobQueue, JobQueue};
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{InMemoryOrderRepository, OrderRepository};
use stock::{InMemoryStockLedger, StockLedger};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::checkout::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<L, R, Q>(
    state: Arc<AppState<L, R, Q>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    L: StockLedger + 'static,
    R: OrderRepository + 'static,
    Q: JobQueue + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout", post(routes::checkout::create::<L, R, Q>))
        .route("/orders/{id}", get(routes::orders::get::<L, R, Q>))
        .route(
            "/orders/{id}/history",
            get(routes::orders::history::<L, R, Q>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over in-memory collaborators.
///
/// The courier registry maps `"tcs"` to the TCS provider over the in-memory
/// gateway; `"home_delivery"` stays unmapped on purpose. Returns the stock
/// ledger and job queue handles so callers (and tests) can seed and inspect
/// them.
pub fn create_default_state(
    config: &Config,
) -> (
    Arc<AppState<InMemoryStockLedger, InMemoryOrderRepository, InMemoryJobQueue>>,
    InMemoryStockLedger,
    InMemoryJobQueue,
) {
    let stock = InMemoryStockLedger::new();
    let orders = InMemoryOrderRepository::new();
    let jobs = InMemoryJobQueue::new();
    let notifier = InMemoryNotifier::new();

    let mut registry = CourierRegistry::new();
    registry.register(
        "tcs",
        Arc::new(TcsCourier::new(
            config.tcs.clone(),
            Arc::new(InMemoryTcsGateway::new()),
        )),
    );

    let checkout = CheckoutService::new(
        stock.clone(),
        orders.clone(),
        Arc::new(registry),
        jobs.clone(),
        notifier,
    );

    let state = Arc::new(AppState {
        checkout,
        orders,
    });

    (state, stock, jobs)
}
