use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::OrderRef;
use tokio::sync::RwLock;

use crate::courier::CourierInfo;
use crate::error::{OrderError, Result};
use crate::order::{Order, OrderDraft};
use crate::repository::{OrderIds, OrderRepository};
use crate::status::OrderStatus;
use crate::value_objects::{Address, ChangedBy, PaymentStatus};

/// In-memory order repository.
///
/// Backs tests and local wiring with the same interface as the PostgreSQL
/// implementation. The identifier sequence is a process-local atomic; the
/// durable deployment uses the counter row instead.
#[derive(Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderRef, Order>>>,
    sequence: Arc<AtomicU64>,
    fail_on_create: Arc<AtomicBool>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository. The sequence starts where the
    /// Postgres counter row is seeded.
    pub fn new() -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
            sequence: Arc::new(AtomicU64::new(1000)),
            fail_on_create: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Configures the repository to fail the next create with a store error.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.fail_on_create.store(fail, Ordering::SeqCst);
    }

    async fn mutate<F>(&self, order_ref: OrderRef, f: F) -> Result<Order>
    where
        F: FnOnce(&mut Order) -> Result<()> + Send,
    {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_ref)
            .ok_or(OrderError::NotFound(order_ref))?;
        f(order)?;
        Ok(order.clone())
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn next_identifiers(&self) -> Result<OrderIds> {
        let value = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(OrderIds::from_sequence(value))
    }

    async fn create(&self, ids: OrderIds, draft: OrderDraft) -> Result<Order> {
        if self.fail_on_create.load(Ordering::SeqCst) {
            return Err(OrderError::Store("injected create failure".to_string()));
        }

        let order = Order::from_draft(OrderRef::new(), ids, draft, Utc::now())?;
        self.orders
            .write()
            .await
            .insert(order.order_ref(), order.clone());
        Ok(order)
    }

    async fn get(&self, order_ref: OrderRef) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&order_ref).cloned())
    }

    async fn get_by_ref_id(&self, ref_id: &str) -> Result<Option<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|order| order.ref_id() == ref_id)
            .cloned())
    }

    async fn append_status_change(
        &self,
        order_ref: OrderRef,
        new_status: OrderStatus,
        changed_by: ChangedBy,
        reason: &str,
    ) -> Result<Order> {
        self.mutate(order_ref, |order| {
            order.transition(new_status, changed_by, reason, Utc::now())
        })
        .await
    }

    async fn attach_courier(&self, order_ref: OrderRef, courier: CourierInfo) -> Result<Order> {
        self.mutate(order_ref, |order| {
            let now = Utc::now();
            let consignment_number = courier.consignment_number.clone();
            let provider = courier.provider.clone();
            order.set_courier(courier, now)?;
            if !consignment_number.is_empty() {
                order.transition(
                    OrderStatus::Confirmed,
                    ChangedBy::System,
                    format!("Consignment {consignment_number} booked with {provider}"),
                    now,
                )?;
            }
            Ok(())
        })
        .await
    }

    async fn record_payment_status(
        &self,
        order_ref: OrderRef,
        status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> Result<Order> {
        self.mutate(order_ref, |order| {
            order.set_payment_status(status, transaction_id, Utc::now());
            Ok(())
        })
        .await
    }

    async fn update_shipping_address(
        &self,
        order_ref: OrderRef,
        address: Address,
    ) -> Result<Order> {
        self.mutate(order_ref, |order| {
            order.set_shipping_address(address, Utc::now());
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courier::Consignee;
    use crate::value_objects::{Address, Contact, OrderItem};
    use common::Money;

    fn draft() -> OrderDraft {
        OrderDraft {
            contact: Contact {
                email: "jane@example.com".into(),
                phone: "+92-300-0000000".into(),
                marketing_opt_in: true,
            },
            shipping_address: Address {
                name: "Jane Doe".into(),
                line1: "12 Canal Road".into(),
                line2: None,
                city: "Lahore".into(),
                state: None,
                postal_code: None,
                country: "PK".into(),
                phone: "+92-300-0000000".into(),
            },
            billing_address: None,
            shipping_method: "tcs".into(),
            items: vec![OrderItem::new(
                "P1",
                None,
                2,
                Money::from_cents(50_000),
                "Widget",
            )],
            subtotal: Money::from_cents(100_000),
            shipping_fee: Money::from_cents(15_000),
            total: Money::from_cents(115_000),
            user_id: None,
            session_id: None,
        }
    }

    async fn create_order(repo: &InMemoryOrderRepository) -> Order {
        let ids = repo.next_identifiers().await.unwrap();
        repo.create(ids, draft()).await.unwrap()
    }

    #[tokio::test]
    async fn identifiers_are_monotonic() {
        let repo = InMemoryOrderRepository::new();
        let a = repo.next_identifiers().await.unwrap();
        let b = repo.next_identifiers().await.unwrap();

        assert!(b.order_id > a.order_id);
        assert_ne!(a.ref_id, b.ref_id);
    }

    #[tokio::test]
    async fn concurrent_identifiers_are_distinct() {
        let repo = InMemoryOrderRepository::new();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let repo = repo.clone();
            handles.push(tokio::spawn(
                async move { repo.next_identifiers().await.unwrap() },
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            let ids = handle.await.unwrap();
            assert!(seen.insert((ids.order_id, ids.ref_id)));
        }
    }

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let repo = InMemoryOrderRepository::new();
        let order = create_order(&repo).await;

        let loaded = repo.get(order.order_ref()).await.unwrap().unwrap();
        assert_eq!(loaded, order);

        let by_ref = repo.get_by_ref_id(order.ref_id()).await.unwrap().unwrap();
        assert_eq!(by_ref.order_ref(), order.order_ref());
    }

    #[tokio::test]
    async fn append_status_change_updates_both_fields() {
        let repo = InMemoryOrderRepository::new();
        let order = create_order(&repo).await;

        let updated = repo
            .append_status_change(
                order.order_ref(),
                OrderStatus::Confirmed,
                ChangedBy::Admin("a1".into()),
                "Confirmed by phone",
            )
            .await
            .unwrap();

        assert_eq!(updated.status(), OrderStatus::Confirmed);
        assert_eq!(updated.history().len(), 2);
        assert_eq!(updated.history().last().unwrap().status, updated.status());
    }

    #[tokio::test]
    async fn invalid_transition_is_rejected() {
        let repo = InMemoryOrderRepository::new();
        let order = create_order(&repo).await;

        repo.append_status_change(
            order.order_ref(),
            OrderStatus::Delivered,
            ChangedBy::System,
            "delivered",
        )
        .await
        .unwrap();

        let result = repo
            .append_status_change(
                order.order_ref(),
                OrderStatus::Cancelled,
                ChangedBy::System,
                "too late",
            )
            .await;

        assert!(matches!(
            result,
            Err(OrderError::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn attach_courier_confirms_with_tracking_reason() {
        let repo = InMemoryOrderRepository::new();
        let order = create_order(&repo).await;

        let updated = repo
            .attach_courier(
                order.order_ref(),
                CourierInfo::booked(
                    "tcs",
                    "TCS123",
                    Consignee {
                        name: "Jane Doe".into(),
                        address: "12 Canal Road".into(),
                        city: "Lahore".into(),
                        phone: "x".into(),
                        email: "jane@example.com".into(),
                    },
                    1.0,
                    1,
                    Money::from_cents(115_000),
                    serde_json::json!({"consignment": "TCS123"}),
                    Utc::now(),
                ),
            )
            .await
            .unwrap();

        assert_eq!(updated.status(), OrderStatus::Confirmed);
        assert_eq!(updated.courier().unwrap().consignment_number, "TCS123");
        assert_eq!(updated.history().len(), 2);
        assert!(updated.history()[1].reason.contains("TCS123"));
    }

    #[tokio::test]
    async fn missing_order_reports_not_found() {
        let repo = InMemoryOrderRepository::new();
        let result = repo
            .append_status_change(
                OrderRef::new(),
                OrderStatus::Confirmed,
                ChangedBy::System,
                "x",
            )
            .await;
        assert!(matches!(result, Err(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn record_payment_status_sets_transaction() {
        let repo = InMemoryOrderRepository::new();
        let order = create_order(&repo).await;

        let updated = repo
            .record_payment_status(
                order.order_ref(),
                PaymentStatus::Paid,
                Some("txn-9".into()),
            )
            .await
            .unwrap();

        assert_eq!(updated.payment().status, PaymentStatus::Paid);
        assert_eq!(updated.payment().transaction_id.as_deref(), Some("txn-9"));
    }

    #[tokio::test]
    async fn injected_create_failure_surfaces_as_store_error() {
        let repo = InMemoryOrderRepository::new();
        repo.set_fail_on_create(true);

        let ids = repo.next_identifiers().await.unwrap();
        let result = repo.create(ids, draft()).await;
        assert!(matches!(result, Err(OrderError::Store(_))));
        assert_eq!(repo.order_count().await, 0);
    }
}
