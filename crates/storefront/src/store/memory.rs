//! In-memory order store for tests and demos.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use amaz_core::{Order, OrderDraft, OrderId, OrderStatus};

use crate::clock::Clock;
use crate::store::{OrderStore, StoreError};

/// Order store backed by a `HashMap`.
///
/// New orders are created in transit with a delivery date, either the one the
/// draft requested or `now + default_window`.
pub struct InMemoryOrderStore<C> {
    clock: C,
    default_window: chrono::Duration,
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl<C: Clock> InMemoryOrderStore<C> {
    /// Create an empty store.
    #[must_use]
    pub fn new(clock: C, default_window: chrono::Duration) -> Self {
        Self {
            clock,
            default_window,
            orders: Mutex::new(HashMap::new()),
        }
    }

    /// Insert a pre-built order, replacing any existing record with the same
    /// id. Used to seed recovery scenarios.
    pub fn insert_order(&self, order: Order) {
        self.orders_guard().insert(order.id, order);
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders_guard().len()
    }

    /// Whether the store holds no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders_guard().is_empty()
    }

    fn orders_guard(&self) -> MutexGuard<'_, HashMap<OrderId, Order>> {
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<C: Clock> OrderStore for InMemoryOrderStore<C> {
    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders_guard().get(id).cloned())
    }

    async fn mark_delivered(
        &self,
        id: &OrderId,
        delivered_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut orders = self.orders_guard();
        let order = orders.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        order.status = OrderStatus::Delivered;
        order.delivered_at = Some(delivered_at);
        debug!(order_id = %id, "order marked delivered");
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders_guard().values().cloned().collect())
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, StoreError> {
        if draft.items.is_empty() {
            return Err(StoreError::InvalidDraft("cart is empty".to_owned()));
        }
        if draft.items.iter().any(|item| item.quantity == 0) {
            return Err(StoreError::InvalidDraft(
                "item quantity must be at least 1".to_owned(),
            ));
        }

        let now = self.clock.now();
        let total = draft.total();
        let order = Order {
            id: OrderId::new(),
            status: OrderStatus::InTransit,
            delivery_date: Some(draft.delivery_date.unwrap_or(now + self.default_window)),
            delivered_at: None,
            customer_email: draft.customer_email,
            total,
            items: draft.items,
            created_at: now,
        };
        self.orders_guard().insert(order.id, order.clone());
        debug!(order_id = %order.id, total = %order.total, "order created");
        Ok(order)
    }
}
