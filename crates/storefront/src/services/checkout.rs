//! Checkout glue: validate the card, commit the order, hand it to the
//! scheduler.
//!
//! The heavy lifting lives elsewhere; this service only strings the pieces
//! together in the order the storefront's checkout page expects.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use amaz_core::{Order, OrderDraft};

use crate::clock::Clock;
use crate::notify::NotificationChannel;
use crate::services::card_validator::{self, CardDetails, CardValidationResult};
use crate::services::scheduler::{OrderLifecycleScheduler, SchedulerError};
use crate::store::{OrderStore, StoreError};

/// Errors surfaced by checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The payment card failed validation; the field errors say where.
    #[error("card validation failed")]
    InvalidCard(CardValidationResult),

    /// The order could not be committed.
    #[error("order store error: {0}")]
    Store(#[from] StoreError),

    /// The committed order could not be scheduled.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

/// Places orders: card validation, then commit, then scheduling.
pub struct CheckoutService<S, N, C> {
    store: Arc<S>,
    notifier: Arc<N>,
    scheduler: OrderLifecycleScheduler<S, N, C>,
    clock: C,
}

impl<S, N, C> CheckoutService<S, N, C>
where
    S: OrderStore + 'static,
    N: NotificationChannel + 'static,
    C: Clock,
{
    /// Create a checkout service sharing the given scheduler instance.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        scheduler: OrderLifecycleScheduler<S, N, C>,
        clock: C,
    ) -> Self {
        Self {
            store,
            notifier,
            scheduler,
            clock,
        }
    }

    /// Place an order.
    ///
    /// Validates the card before committing anything; an invalid card means
    /// no order exists. On commit the order is written to the store, a
    /// confirmation is dispatched (best effort), and the order is handed to
    /// the scheduler for its reminder/delivered transitions.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidCard` with the field errors, or a
    /// store/scheduler error when committing or scheduling fails.
    pub async fn place_order(
        &self,
        card: &CardDetails,
        draft: OrderDraft,
    ) -> Result<Order, CheckoutError> {
        let validation = card_validator::validate_card_details(card, self.clock.now());
        if !validation.is_valid() {
            return Err(CheckoutError::InvalidCard(validation));
        }

        let order = self.store.create_order(draft).await?;
        info!(order_id = %order.id, total = %order.total, "order placed");

        if let Err(e) = self
            .notifier
            .send_order_confirmation(&order, &order.customer_email)
            .await
        {
            warn!(order_id = %order.id, error = %e, "failed to send order confirmation");
        }

        self.scheduler.schedule_notifications(&order).await?;
        Ok(order)
    }
}
