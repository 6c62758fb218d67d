//! Notification channel seam.
//!
//! Real email/SMS transport is out of scope; the services only issue calls
//! against [`NotificationChannel`]. [`RecordingChannel`] is the in-process
//! implementation: it logs each dispatch and keeps it inspectable in memory,
//! the same role the storefront's mock mail outbox plays in demos.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use amaz_core::{Email, Order, OrderId, VerificationChannel};

/// Errors surfaced by a notification channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The underlying transport rejected or could not deliver the message.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound customer notifications.
///
/// Calls are asynchronous-capable; the services do not depend on delivery
/// completing beyond the call returning.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Checkout confirmation with the order summary.
    async fn send_order_confirmation(
        &self,
        order: &Order,
        recipient: &Email,
    ) -> Result<(), NotifyError>;

    /// "Your order arrives today" reminder, sent the morning of delivery.
    async fn send_delivery_reminder(
        &self,
        order: &Order,
        recipient: &Email,
    ) -> Result<(), NotifyError>;

    /// Confirmation that the order has been delivered.
    async fn send_order_delivered(
        &self,
        order: &Order,
        recipient: &Email,
    ) -> Result<(), NotifyError>;

    /// One-time verification code, over email or SMS depending on `channel`.
    async fn send_verification_code(
        &self,
        channel: VerificationChannel,
        target: &str,
        code: &str,
    ) -> Result<(), NotifyError>;
}

/// A notification captured by [`RecordingChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentNotification {
    OrderConfirmation {
        order_id: OrderId,
        to: Email,
    },
    DeliveryReminder {
        order_id: OrderId,
        to: Email,
    },
    OrderDelivered {
        order_id: OrderId,
        to: Email,
    },
    VerificationCode {
        channel: VerificationChannel,
        to: String,
        code: String,
    },
}

/// Channel that logs every dispatch and records it in memory.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<SentNotification>>,
}

impl RecordingChannel {
    /// Create an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.guard().clone()
    }

    /// The code of the most recently dispatched verification message, if any.
    #[must_use]
    pub fn last_verification_code(&self) -> Option<String> {
        self.guard().iter().rev().find_map(|n| match n {
            SentNotification::VerificationCode { code, .. } => Some(code.clone()),
            _ => None,
        })
    }

    fn record(&self, notification: SentNotification) {
        self.guard().push(notification);
    }

    fn guard(&self) -> MutexGuard<'_, Vec<SentNotification>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send_order_confirmation(
        &self,
        order: &Order,
        recipient: &Email,
    ) -> Result<(), NotifyError> {
        info!(order_id = %order.id, to = %recipient, total = %order.total, "order confirmation sent");
        self.record(SentNotification::OrderConfirmation {
            order_id: order.id,
            to: recipient.clone(),
        });
        Ok(())
    }

    async fn send_delivery_reminder(
        &self,
        order: &Order,
        recipient: &Email,
    ) -> Result<(), NotifyError> {
        info!(order_id = %order.id, to = %recipient, "delivery reminder sent: order arrives today");
        self.record(SentNotification::DeliveryReminder {
            order_id: order.id,
            to: recipient.clone(),
        });
        Ok(())
    }

    async fn send_order_delivered(
        &self,
        order: &Order,
        recipient: &Email,
    ) -> Result<(), NotifyError> {
        info!(order_id = %order.id, to = %recipient, "delivered notification sent");
        self.record(SentNotification::OrderDelivered {
            order_id: order.id,
            to: recipient.clone(),
        });
        Ok(())
    }

    async fn send_verification_code(
        &self,
        channel: VerificationChannel,
        target: &str,
        code: &str,
    ) -> Result<(), NotifyError> {
        // The code itself stays out of the logs.
        info!(%channel, to = %target, "verification code sent");
        self.record(SentNotification::VerificationCode {
            channel,
            to: target.to_owned(),
            code: code.to_owned(),
        });
        Ok(())
    }
}
