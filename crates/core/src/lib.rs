//! Amaz Core - Shared types library.
//!
//! This crate provides common types used across all Amaz components:
//! - `storefront` - Order fulfillment, verification, and payment validation services
//! - `integration-tests` - Cross-service test suite
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no timers, no transport clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, plus order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
