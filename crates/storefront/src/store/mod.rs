//! Order persistence seam.
//!
//! The scheduler and checkout never own order records; they go through
//! [`OrderStore`]. Production wires this to the real order backend; tests and
//! demos use [`memory::InMemoryOrderStore`].

pub mod memory;

pub use memory::InMemoryOrderStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use amaz_core::{Order, OrderDraft, OrderId};

/// Errors surfaced by an order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order exists with the given id.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The order draft cannot be turned into an order.
    #[error("invalid order draft: {0}")]
    InvalidDraft(String),

    /// The backing store could not be reached.
    #[error("order store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted order records, owned by an external collaborator.
///
/// The store is independently synchronized; callers must tolerate a
/// get-after-write returning an updated or absent record.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch a single order by id.
    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Transition an order to delivered, setting `delivered_at`.
    async fn mark_delivered(
        &self,
        id: &OrderId,
        delivered_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// List every order. Used by the recovery pass at process start.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Create an order from a checkout draft: assign an id, stamp
    /// `created_at`, compute the total, and put the order in transit.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, StoreError>;
}
