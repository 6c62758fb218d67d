//! Integration tests for Amaz.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p amaz-integration-tests
//! ```
//!
//! Tests run under `#[tokio::test(start_paused = true)]`, so the multi-day
//! fulfillment timelines complete instantly: advancing tokio's paused clock
//! moves both the pending timers and [`TestClock::now`].
//!
//! # Test Categories
//!
//! - `order_lifecycle` - Checkout through delivered, restart recovery
//! - `registration_verification` - One-time code flows over email and SMS

use std::sync::{Arc, Once};

use chrono::{DateTime, Utc};

use amaz_storefront::clock::TestClock;
use amaz_storefront::config::StorefrontConfig;
use amaz_storefront::notify::RecordingChannel;
use amaz_storefront::services::scheduler::ScheduleHours;
use amaz_storefront::services::{
    CheckoutService, OrderLifecycleScheduler, VerificationCodeAuthority,
};
use amaz_storefront::store::InMemoryOrderStore;

/// Scheduler type wired to the in-memory collaborators.
pub type TestScheduler =
    OrderLifecycleScheduler<InMemoryOrderStore<TestClock>, RecordingChannel, TestClock>;

/// Checkout type wired to the in-memory collaborators.
pub type TestCheckout =
    CheckoutService<InMemoryOrderStore<TestClock>, RecordingChannel, TestClock>;

/// Fully wired service stack over an in-memory store and recording channel.
pub struct TestContext {
    pub clock: TestClock,
    pub store: Arc<InMemoryOrderStore<TestClock>>,
    pub channel: Arc<RecordingChannel>,
    pub scheduler: TestScheduler,
    pub checkout: TestCheckout,
    pub verification: VerificationCodeAuthority<RecordingChannel, TestClock>,
}

impl TestContext {
    /// Build the stack with default configuration, anchored at `epoch`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(epoch: DateTime<Utc>) -> Self {
        init_tracing();
        let config = StorefrontConfig::default();
        let clock = TestClock::new(epoch);
        let store = Arc::new(InMemoryOrderStore::new(clock, config.delivery_window()));
        let channel = Arc::new(RecordingChannel::new());
        let scheduler = OrderLifecycleScheduler::new(
            Arc::clone(&store),
            Arc::clone(&channel),
            clock,
            ScheduleHours::from(&config),
        );
        let checkout = CheckoutService::new(
            Arc::clone(&store),
            Arc::clone(&channel),
            scheduler.clone(),
            clock,
        );
        let verification =
            VerificationCodeAuthority::new(Arc::clone(&channel), clock, config.code_ttl());
        Self {
            clock,
            store,
            channel,
            scheduler,
            checkout,
            verification,
        }
    }

    /// Simulate a process restart: a fresh scheduler over the same store and
    /// channel, with an empty scheduled set and no pending timers.
    #[must_use]
    pub fn restarted_scheduler(&self) -> TestScheduler {
        OrderLifecycleScheduler::new(
            Arc::clone(&self.store),
            Arc::clone(&self.channel),
            self.clock,
            ScheduleHours::default(),
        )
    }
}

/// Install a test subscriber once per process.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}
