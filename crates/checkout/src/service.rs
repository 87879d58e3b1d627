//! The checkout use-case.

use std::sync::Arc;

use chrono::Utc;
use common::OrderRef;
use couriers::CourierRegistry;
use jobs::{JobQueue, NewJob};
use orders::{CourierInfo, Order, OrderDraft, OrderRepository, OrderStatus};
use stock::{StockLedger, StockLine};

use crate::error::{CheckoutError, Result};
use crate::notify::{Notifier, OrderConfirmation};
use crate::snapshot::{CHECKOUT_COMPLETE, CheckoutCompletePayload};

/// Delivery estimate quoted when no courier provider is mapped.
const DEFAULT_DELIVERY_DAYS: u32 = 5;

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order_ref: OrderRef,
    pub order_id: u64,
    pub ref_id: String,
    pub status: OrderStatus,
    pub consignment_number: Option<String>,
    /// The persisted order as of the end of the pipeline.
    pub order: Order,
}

/// Orchestrates the checkout-to-fulfillment pipeline.
///
/// Per-order steps run strictly in sequence: validate → persist → decrement
/// → courier → notify → enqueue. Once the order is persisted the pipeline
/// never fails the checkout; downstream failures are absorbed and surfaced
/// through logs and metrics only.
pub struct CheckoutService<L, R, Q, N>
where
    L: StockLedger,
    R: OrderRepository,
    Q: JobQueue,
    N: Notifier,
{
    stock: L,
    orders: R,
    couriers: Arc<CourierRegistry>,
    jobs: Q,
    notifier: N,
}

impl<L, R, Q, N> CheckoutService<L, R, Q, N>
where
    L: StockLedger,
    R: OrderRepository,
    Q: JobQueue,
    N: Notifier,
{
    /// Creates a new checkout service.
    pub fn new(stock: L, orders: R, couriers: Arc<CourierRegistry>, jobs: Q, notifier: N) -> Self {
        Self {
            stock,
            orders,
            couriers,
            jobs,
            notifier,
        }
    }

    /// Places an order.
    ///
    /// Returns an error only for a validation failure (no side effects) or
    /// a failed order write (nothing downstream attempted). Every other
    /// failure leaves the order in place and the checkout successful.
    #[tracing::instrument(skip(self, draft), fields(shipping_method = %draft.shipping_method))]
    pub async fn place_order(&self, draft: OrderDraft) -> Result<CheckoutReceipt> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = std::time::Instant::now();

        // 1. Validate: structure first, then stock, before any side effect.
        let lines = validate_draft(&draft)?;

        let report = self
            .stock
            .check_availability(&lines)
            .await
            .map_err(CheckoutError::Stock)?;
        if !report.is_available() {
            metrics::counter!("checkout_rejected").increment(1);
            tracing::info!(
                shortages = report.shortages.len(),
                "checkout rejected: insufficient stock"
            );
            return Err(CheckoutError::InsufficientStock {
                shortages: report.shortages,
            });
        }

        // 2. Persist the order (Pending + seeded history), then decrement.
        let ids = self
            .orders
            .next_identifiers()
            .await
            .map_err(CheckoutError::Persistence)?;
        let mut order = self
            .orders
            .create(ids, draft)
            .await
            .map_err(CheckoutError::Persistence)?;
        let order_ref = order.order_ref();
        tracing::info!(%order_ref, order_id = order.order_id(), "order persisted");

        if let Err(e) = self.stock.decrement(order_ref, &lines).await {
            // The order is already committed. Leave it Pending for
            // reconciliation rather than failing the sale.
            metrics::counter!("stock_decrement_failures").increment(1);
            tracing::error!(%order_ref, error = %e, "stock decrement failed after order creation");
        }

        // 3. Courier booking, when a provider is mapped for the method.
        let provider = self.couriers.resolve(order.shipping_method());
        let delivery_estimate_days = provider
            .as_ref()
            .map(|p| p.estimate_days(&order.shipping_address().city))
            .unwrap_or(DEFAULT_DELIVERY_DAYS);

        if let Some(provider) = provider {
            let request = provider.payload_from_order(&order);
            // Booked at most once: consignment creation is not idempotent
            // at the provider.
            match provider.book(&request).await {
                Ok(booked) => {
                    let courier = CourierInfo::booked(
                        provider.name(),
                        booked.consignment_number,
                        request.consignee,
                        request.weight_kg,
                        request.pieces,
                        request.cod_amount,
                        booked.raw,
                        Utc::now(),
                    );
                    match self.orders.attach_courier(order_ref, courier).await {
                        Ok(updated) => order = updated,
                        Err(e) => {
                            tracing::error!(%order_ref, error = %e, "failed to attach booked consignment");
                        }
                    }
                }
                Err(e) => {
                    metrics::counter!("courier_booking_failures").increment(1);
                    tracing::warn!(%order_ref, provider = provider.name(), error = %e, "courier booking failed; order proceeds without tracking");
                }
            }
        }

        // 4. Notify: direct send is best-effort, the job is the guarantee.
        let confirmation = OrderConfirmation::from_order(&order, delivery_estimate_days);
        if let Err(e) = self.notifier.order_confirmation(&confirmation).await {
            metrics::counter!("notification_failures").increment(1);
            tracing::warn!(%order_ref, error = %e, "direct confirmation send failed");
        }

        self.enqueue_confirmation_job(&order, delivery_estimate_days)
            .await;

        metrics::counter!("checkout_completed").increment(1);
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        Ok(CheckoutReceipt {
            order_ref,
            order_id: order.order_id(),
            ref_id: order.ref_id().to_string(),
            status: order.status(),
            consignment_number: order.courier().map(|c| c.consignment_number.clone()),
            order,
        })
    }

    /// Enqueues the `checkout_complete` job with a full snapshot payload.
    ///
    /// An enqueue failure leaves no durable notification fallback for this
    /// order, so it is logged as an error, but it never unwinds the
    /// committed order.
    async fn enqueue_confirmation_job(&self, order: &Order, delivery_estimate_days: u32) {
        let now = Utc::now();
        let payload = CheckoutCompletePayload::from_order(order, delivery_estimate_days, now);

        let payload = match serde_json::to_value(&payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(order_ref = %order.order_ref(), error = %e, "failed to serialize checkout_complete payload");
                return;
            }
        };

        match self
            .jobs
            .enqueue(NewJob::new(CHECKOUT_COMPLETE, payload, now))
            .await
        {
            Ok(job) => {
                metrics::counter!("jobs_enqueued_total").increment(1);
                tracing::info!(job_id = %job.id, order_ref = %order.order_ref(), "confirmation job enqueued");
            }
            Err(e) => {
                tracing::error!(order_ref = %order.order_ref(), error = %e, "failed to enqueue checkout_complete job; no notification fallback exists");
            }
        }
    }
}

/// Structural validation, and the stock lines derived from the draft.
fn validate_draft(draft: &OrderDraft) -> Result<Vec<StockLine>> {
    if draft.items.is_empty() {
        return Err(CheckoutError::Invalid(
            "order must contain at least one item".to_string(),
        ));
    }
    if draft.items.iter().any(|item| item.quantity == 0) {
        return Err(CheckoutError::Invalid(
            "item quantity must be at least 1".to_string(),
        ));
    }

    Ok(draft
        .items
        .iter()
        .map(|item| StockLine::new(item.product_id.clone(), item.variant_id.clone(), item.quantity))
        .collect())
}
