//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional, with production defaults:
//! - `AMAZ_REMINDER_HOUR` - Local hour for delivery reminders (default: 9)
//! - `AMAZ_DELIVERED_HOUR` - Local hour for the delivered transition (default: 14)
//! - `AMAZ_CODE_TTL_MINUTES` - Verification code lifetime (default: 10)
//! - `AMAZ_DELIVERY_WINDOW_DAYS` - Default delivery window applied when
//!   checkout gives no delivery date (default: 3)

use thiserror::Error;

const DEFAULT_REMINDER_HOUR: u32 = 9;
const DEFAULT_DELIVERED_HOUR: u32 = 14;
const DEFAULT_CODE_TTL_MINUTES: i64 = 10;
const DEFAULT_DELIVERY_WINDOW_DAYS: i64 = 3;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

/// Storefront service configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Local hour of the delivery day at which the reminder fires.
    pub reminder_hour: u32,
    /// Local hour of the delivery day at which the delivered transition fires.
    pub delivered_hour: u32,
    /// How long a verification code stays valid, in minutes.
    pub code_ttl_minutes: i64,
    /// Delivery window applied when an order draft carries no delivery date.
    pub delivery_window_days: i64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            reminder_hour: DEFAULT_REMINDER_HOUR,
            delivered_hour: DEFAULT_DELIVERED_HOUR,
            code_ttl_minutes: DEFAULT_CODE_TTL_MINUTES,
            delivery_window_days: DEFAULT_DELIVERY_WINDOW_DAYS,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable, or if
    /// the resulting schedule is inconsistent.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            reminder_hour: get_parsed_or_default("AMAZ_REMINDER_HOUR", DEFAULT_REMINDER_HOUR)?,
            delivered_hour: get_parsed_or_default("AMAZ_DELIVERED_HOUR", DEFAULT_DELIVERED_HOUR)?,
            code_ttl_minutes: get_parsed_or_default(
                "AMAZ_CODE_TTL_MINUTES",
                DEFAULT_CODE_TTL_MINUTES,
            )?,
            delivery_window_days: get_parsed_or_default(
                "AMAZ_DELIVERY_WINDOW_DAYS",
                DEFAULT_DELIVERY_WINDOW_DAYS,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check schedule consistency.
    ///
    /// The reminder must not be later in the day than the delivered
    /// transition, so that for a single order the reminder target is always
    /// at or before the delivered target.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSchedule` on out-of-range hours, a
    /// reminder after delivery, or non-positive durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reminder_hour > 23 || self.delivered_hour > 23 {
            return Err(ConfigError::InvalidSchedule(format!(
                "hours must be 0-23 (reminder {}, delivered {})",
                self.reminder_hour, self.delivered_hour
            )));
        }
        if self.reminder_hour > self.delivered_hour {
            return Err(ConfigError::InvalidSchedule(format!(
                "reminder hour {} is after delivered hour {}",
                self.reminder_hour, self.delivered_hour
            )));
        }
        if self.code_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidSchedule(
                "code TTL must be positive".to_owned(),
            ));
        }
        if self.delivery_window_days <= 0 {
            return Err(ConfigError::InvalidSchedule(
                "delivery window must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    /// Verification code lifetime as a duration.
    #[must_use]
    pub fn code_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.code_ttl_minutes)
    }

    /// Default delivery window as a duration.
    #[must_use]
    pub fn delivery_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.delivery_window_days)
    }
}

/// Parse an environment variable, falling back to a default when unset.
fn get_parsed_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        Err(_) => Ok(default),
    }
}
