//! One-time verification codes for registration.
//!
//! Issues short-lived 6-digit codes over email or SMS and checks them with a
//! deliberately retry-friendly purge policy: an entry is deleted on success
//! or on detected expiry, but kept on a wrong guess so the user can retry
//! until the code expires.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info};

use amaz_core::VerificationChannel;

use crate::clock::Clock;
use crate::notify::{NotificationChannel, NotifyError};

/// A code waiting to be confirmed for one target.
#[derive(Debug, Clone)]
struct PendingVerification {
    code: String,
    expires_at: DateTime<Utc>,
}

/// Issues and checks time-boxed one-time codes.
///
/// Holds at most one pending code per normalized target; re-sending silently
/// replaces the previous one. Constructed per process and passed around by
/// the callers that gate registration on it.
pub struct VerificationCodeAuthority<N, C> {
    notifier: Arc<N>,
    clock: C,
    ttl: chrono::Duration,
    pending: Mutex<HashMap<String, PendingVerification>>,
}

/// Canonical lookup key for a verification target: trimmed and lower-cased,
/// which covers case-insensitive emails and leaves phone numbers intact.
fn normalize_target(target: &str) -> String {
    target.trim().to_lowercase()
}

fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}

impl<N: NotificationChannel, C: Clock> VerificationCodeAuthority<N, C> {
    /// Create an authority issuing codes valid for `ttl`.
    #[must_use]
    pub fn new(notifier: Arc<N>, clock: C, ttl: chrono::Duration) -> Self {
        Self {
            notifier,
            clock,
            ttl,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh code for `target` and dispatch it over `channel`.
    ///
    /// Any prior pending code for the same normalized target is replaced.
    /// The entry is stored before dispatch, so a transport failure leaves a
    /// usable code behind for a later re-send to overwrite.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the transport fails; never swallowed.
    pub async fn send_code(
        &self,
        channel: VerificationChannel,
        target: &str,
    ) -> Result<(), NotifyError> {
        let code = generate_code();
        let expires_at = self.clock.now() + self.ttl;
        self.pending_guard().insert(
            normalize_target(target),
            PendingVerification {
                code: code.clone(),
                expires_at,
            },
        );
        info!(%channel, target = %target.trim(), "verification code issued");

        self.notifier
            .send_verification_code(channel, target, &code)
            .await
    }

    /// Check a submitted code.
    ///
    /// Fails without distinction for an unknown target and a wrong code. An
    /// expired entry is purged on detection; a wrong guess leaves the entry
    /// in place; a correct guess consumes it.
    pub fn verify_code(&self, target: &str, code: &str) -> bool {
        let key = normalize_target(target);
        let mut pending = self.pending_guard();

        let Some(entry) = pending.get(&key).cloned() else {
            debug!(target = %key, "verification failed: no pending code");
            return false;
        };
        if self.clock.now() > entry.expires_at {
            pending.remove(&key);
            debug!(target = %key, "verification failed: code expired");
            return false;
        }
        if entry.code != code.trim() {
            debug!(target = %key, "verification failed: wrong code");
            return false;
        }

        pending.remove(&key);
        info!(target = %key, "verification succeeded");
        true
    }

    /// Number of pending entries (expired-but-unchecked ones included).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending_guard().len()
    }

    fn pending_guard(&self) -> MutexGuard<'_, HashMap<String, PendingVerification>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
