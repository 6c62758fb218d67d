//! Amaz Storefront services library.
//!
//! The transactional core of the Amaz storefront: payment card validation,
//! one-time verification codes for registration, and time-based order
//! fulfillment scheduling (delivery reminders and delivered transitions).
//!
//! Everything else the storefront does (catalog, cart, addresses, receipts)
//! lives behind the [`store::OrderStore`] and [`notify::NotificationChannel`]
//! seams and is out of scope for this crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod config;
pub mod notify;
pub mod services;
pub mod store;
