//! Order lifecycle scheduling.
//!
//! For every in-transit order with a delivery date, arranges two deferred
//! actions on the delivery day: a reminder at the local reminder hour and the
//! delivered transition at the local delivered hour. Scheduling is idempotent
//! per order id, and a recovery pass rebuilds the in-memory obligations at
//! process start since timers do not survive a restart.
//!
//! Deferred actions are best-effort, at-most-once: if the process dies after
//! a timer fires but before its side effects complete, that notification is
//! lost by design.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeZone, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use amaz_core::{Order, OrderId, OrderStatus};

use crate::clock::Clock;
use crate::config::StorefrontConfig;
use crate::notify::{NotificationChannel, NotifyError};
use crate::store::{OrderStore, StoreError};

/// Errors surfaced by scheduling operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The order store failed a read or write.
    #[error("order store error: {0}")]
    Store(#[from] StoreError),

    /// The notification channel failed a dispatch that must not be dropped.
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Local hours on the delivery day at which the two deferred actions fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleHours {
    /// Reminder dispatch hour (default 09:00).
    pub reminder: u32,
    /// Delivered transition hour (default 14:00).
    pub delivered: u32,
}

impl Default for ScheduleHours {
    fn default() -> Self {
        Self {
            reminder: 9,
            delivered: 14,
        }
    }
}

impl From<&StorefrontConfig> for ScheduleHours {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            reminder: config.reminder_hour,
            delivered: config.delivered_hour,
        }
    }
}

struct Inner<S, N, C> {
    store: Arc<S>,
    notifier: Arc<N>,
    clock: C,
    hours: ScheduleHours,
    scheduled: Mutex<HashSet<OrderId>>,
}

/// Computes and fires delivery-reminder and delivered transitions.
///
/// One instance owns one scheduled set; callers hold and pass the instance
/// (cloning shares it). There is no unschedule: once arranged, both deferred
/// actions fire unless the process restarts and drops them.
pub struct OrderLifecycleScheduler<S, N, C> {
    inner: Arc<Inner<S, N, C>>,
}

impl<S, N, C> Clone for OrderLifecycleScheduler<S, N, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// The given local hour (minute zero) on the calendar day of `instant`.
///
/// Falls back to `instant` itself on the rare days where that local time
/// does not exist (DST gap).
fn local_hour_on_day(instant: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let day = instant.with_timezone(&Local).date_naive();
    day.and_hms_opt(hour, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map_or(instant, |local| local.with_timezone(&Utc))
}

impl<S, N, C> OrderLifecycleScheduler<S, N, C>
where
    S: OrderStore + 'static,
    N: NotificationChannel + 'static,
    C: Clock,
{
    /// Create a scheduler with an empty scheduled set.
    #[must_use]
    pub fn new(store: Arc<S>, notifier: Arc<N>, clock: C, hours: ScheduleHours) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                notifier,
                clock,
                hours,
                scheduled: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Arrange the reminder and delivered transitions for `order`.
    ///
    /// No-op when the order is already scheduled, not in transit, or has no
    /// delivery date. When the delivery window has already elapsed the
    /// delivered transition runs synchronously instead of deferring.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` only from the synchronous past-due path; a
    /// failed delivered write leaves the obligation in place.
    pub async fn schedule_notifications(&self, order: &Order) -> Result<(), SchedulerError> {
        if self.is_scheduled(order.id) {
            debug!(order_id = %order.id, "already scheduled, skipping");
            return Ok(());
        }
        if order.status != OrderStatus::InTransit {
            debug!(order_id = %order.id, status = %order.status, "not in transit, skipping");
            return Ok(());
        }
        let Some(delivery_date) = order.delivery_date else {
            debug!(order_id = %order.id, "no delivery date, skipping");
            return Ok(());
        };

        let now = self.inner.clock.now();
        if delivery_date <= now {
            // Delivery window elapsed while nothing was scheduled, e.g.
            // after a long outage. Catch up synchronously.
            info!(order_id = %order.id, "delivery date already passed, delivering now");
            return Inner::deliver(&self.inner, order.id).await;
        }

        // Both targets are computed once, from the same delivery date, and
        // handed to the tasks as absolute deadlines: a deferred task that
        // starts late still fires at (or immediately after) its target.
        let reminder_at = local_hour_on_day(delivery_date, self.inner.hours.reminder);
        let delivered_due = local_hour_on_day(delivery_date, self.inner.hours.delivered);

        if !self.scheduled_guard().insert(order.id) {
            return Ok(());
        }
        info!(
            order_id = %order.id,
            reminder_at = %reminder_at,
            delivered_due = %delivered_due,
            "order scheduled"
        );

        let inner = Arc::clone(&self.inner);
        let id = order.id;
        tokio::spawn(async move {
            inner.clock.sleep_until(reminder_at).await;
            Inner::remind(&inner, id).await;
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.clock.sleep_until(delivered_due).await;
            if let Err(e) = Inner::deliver(&inner, id).await {
                // Best effort past this point; the recovery pass picks the
                // order up again after a restart.
                error!(order_id = %id, error = %e, "deferred delivered transition failed");
            }
        });

        Ok(())
    }

    /// Recovery pass: re-submit every in-transit order with a delivery date.
    ///
    /// Invoked once at process start. The scheduled set and timers are
    /// process-local, so orders left in transit across a restart would
    /// otherwise never receive their reminder/delivered notifications.
    ///
    /// Returns the number of orders submitted for scheduling.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` if the store cannot be listed or a past-due
    /// catch-up transition fails.
    pub async fn resume_pending(&self) -> Result<usize, SchedulerError> {
        let orders = self.inner.store.list_orders().await?;
        let mut resumed = 0;
        for order in orders {
            if order.is_schedulable() {
                self.schedule_notifications(&order).await?;
                resumed += 1;
            }
        }
        info!(resumed, "recovery pass complete");
        Ok(resumed)
    }

    /// Whether `id` is currently under active scheduling.
    #[must_use]
    pub fn is_scheduled(&self, id: OrderId) -> bool {
        self.scheduled_guard().contains(&id)
    }

    fn scheduled_guard(&self) -> MutexGuard<'_, HashSet<OrderId>> {
        self.inner
            .scheduled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, N, C> Inner<S, N, C>
where
    S: OrderStore,
    N: NotificationChannel,
    C: Clock,
{
    fn scheduled_guard(&self) -> MutexGuard<'_, HashSet<OrderId>> {
        self.scheduled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reminder body: re-check the order right before acting, since its
    /// status may have changed through another path since scheduling.
    async fn remind(inner: &Arc<Self>, id: OrderId) {
        match inner.store.get_order(&id).await {
            Ok(Some(order)) if order.status == OrderStatus::InTransit => {
                if let Err(e) = inner
                    .notifier
                    .send_delivery_reminder(&order, &order.customer_email)
                    .await
                {
                    error!(order_id = %id, error = %e, "failed to send delivery reminder");
                }
            }
            Ok(Some(order)) => {
                debug!(order_id = %id, status = %order.status, "no longer in transit, reminder skipped");
            }
            Ok(None) => {
                debug!(order_id = %id, "order gone, reminder skipped");
            }
            Err(e) => {
                error!(order_id = %id, error = %e, "failed to load order for reminder");
            }
        }
    }

    /// The delivered transition, shared by the immediate and deferred paths.
    ///
    /// On a failed store write the id stays in the scheduled set so the
    /// obligation is not lost; once the write lands the id is removed no
    /// matter how the follow-up fetch goes.
    async fn deliver(inner: &Arc<Self>, id: OrderId) -> Result<(), SchedulerError> {
        let delivered_at = inner.clock.now();
        inner.store.mark_delivered(&id, delivered_at).await?;

        let fetched = inner.store.get_order(&id).await;
        inner.scheduled_guard().remove(&id);

        match fetched {
            Ok(Some(order)) => {
                if let Err(e) = inner
                    .notifier
                    .send_order_delivered(&order, &order.customer_email)
                    .await
                {
                    warn!(order_id = %id, error = %e, "failed to send delivered notification");
                }
                info!(order_id = %id, "order delivered");
                Ok(())
            }
            Ok(None) => {
                warn!(order_id = %id, "order absent after delivered transition");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
