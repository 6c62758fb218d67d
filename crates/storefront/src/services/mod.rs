//! Storefront domain services.
//!
//! - [`card_validator`] - Pure payment card validation (Luhn, expiry, CVC)
//! - [`verification`] - Time-boxed one-time codes gating registration
//! - [`scheduler`] - Delivery reminder / delivered transitions for orders
//! - [`checkout`] - Glue: validate card, create order, hand off to scheduler

pub mod card_validator;
pub mod checkout;
pub mod scheduler;
pub mod verification;

pub use card_validator::{CardDetails, CardError, CardValidationResult};
pub use checkout::{CheckoutError, CheckoutService};
pub use scheduler::{OrderLifecycleScheduler, ScheduleHours, SchedulerError};
pub use verification::VerificationCodeAuthority;
