//! Core types for Amaz.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order;
pub mod status;

pub use email::{Email, EmailError};
pub use id::OrderId;
pub use order::{Order, OrderDraft, OrderItem};
pub use status::{OrderStatus, VerificationChannel};
