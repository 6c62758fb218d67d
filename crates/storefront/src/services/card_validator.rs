//! Payment card validation.
//!
//! Pure functions with no state and no side effects. Nothing here returns
//! `Err` or panics: invalid input always comes back as a populated
//! field-keyed error value and the caller decides the UX.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use thiserror::Error;

const MIN_CARD_DIGITS: usize = 13;
const MAX_CARD_DIGITS: usize = 19;
const MIN_CARDHOLDER_NAME_LEN: usize = 2;

/// Raw card input as typed into the checkout form.
#[derive(Debug, Clone)]
pub struct CardDetails {
    /// Card number; spaces and other separators are tolerated.
    pub card_number: String,
    /// Expiry in `MM/YY` form.
    pub expiry: String,
    /// Security code: 3 digits, or 4 for Amex.
    pub cvc: String,
    /// Name as printed on the card.
    pub cardholder_name: String,
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardError {
    #[error("invalid card number (13-19 digits, Luhn check)")]
    InvalidNumber,
    #[error("invalid expiry (MM/YY, must not be in the past)")]
    InvalidExpiry,
    #[error("invalid CVC ({expected} digits)")]
    InvalidCvc {
        /// Expected CVC length for this card brand.
        expected: usize,
    },
    #[error("cardholder name required (min {MIN_CARDHOLDER_NAME_LEN} characters)")]
    InvalidCardholderName,
}

/// Field-keyed validation outcome for a full set of card details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CardValidationResult {
    pub card_number: Option<CardError>,
    pub expiry: Option<CardError>,
    pub cvc: Option<CardError>,
    pub cardholder_name: Option<CardError>,
}

impl CardValidationResult {
    /// True when no field carries an error.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.card_number.is_none()
            && self.expiry.is_none()
            && self.cvc.is_none()
            && self.cardholder_name.is_none()
    }
}

/// Strip everything but ASCII digits.
fn digits_of(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Luhn checksum over a digit string: right to left, double every second
/// digit, subtract 9 when the doubled value exceeds 9, valid iff the sum is
/// divisible by 10.
fn luhn_check(digits: &str) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Validate a card number: 13-19 digits after stripping separators, passing
/// the Luhn checksum.
#[must_use]
pub fn validate_card_number(input: &str) -> bool {
    let digits = digits_of(input);
    if digits.len() < MIN_CARD_DIGITS || digits.len() > MAX_CARD_DIGITS {
        return false;
    }
    luhn_check(&digits)
}

/// Validate an `MM/YY` expiry against `now`.
///
/// A card is valid through the end of its stated month: only an expiry whose
/// (year, month) is strictly earlier than now's is rejected.
#[must_use]
pub fn validate_expiry(input: &str, now: DateTime<Utc>) -> bool {
    let Some((month_part, year_part)) = input.trim().split_once('/') else {
        return false;
    };
    let month_part = month_part.trim();
    let year_part = year_part.trim();

    if month_part.is_empty() || month_part.len() > 2 || year_part.len() != 2 {
        return false;
    }
    if !month_part.chars().all(|c| c.is_ascii_digit())
        || !year_part.chars().all(|c| c.is_ascii_digit())
    {
        return false;
    }
    let Ok(month) = month_part.parse::<u32>() else {
        return false;
    };
    let Ok(year) = year_part.parse::<i32>() else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }

    let full_year = 2000 + year;
    (full_year, month) >= (now.year(), now.month())
}

/// Validate a CVC: exactly 4 digits for Amex, 3 otherwise.
#[must_use]
pub fn validate_cvc(input: &str, is_amex: bool) -> bool {
    let expected = if is_amex { 4 } else { 3 };
    digits_of(input).len() == expected
}

/// Whether the number belongs to an Amex card (prefix 34 or 37).
///
/// Derived from the number every time rather than stored, so it can never go
/// stale when the user edits the field.
#[must_use]
pub fn is_amex(card_number: &str) -> bool {
    let digits = digits_of(card_number);
    digits.starts_with("34") || digits.starts_with("37")
}

/// Run every check over a full set of card details.
#[must_use]
pub fn validate_card_details(details: &CardDetails, now: DateTime<Utc>) -> CardValidationResult {
    let mut result = CardValidationResult::default();

    if !validate_card_number(&details.card_number) {
        result.card_number = Some(CardError::InvalidNumber);
    }
    if !validate_expiry(&details.expiry, now) {
        result.expiry = Some(CardError::InvalidExpiry);
    }
    let amex = is_amex(&details.card_number);
    if !validate_cvc(&details.cvc, amex) {
        result.cvc = Some(CardError::InvalidCvc {
            expected: if amex { 4 } else { 3 },
        });
    }
    if details.cardholder_name.trim().len() < MIN_CARDHOLDER_NAME_LEN {
        result.cardholder_name = Some(CardError::InvalidCardholderName);
    }

    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn march_2026() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_luhn_valid_number() {
        assert!(validate_card_number("4539148803436467"));
    }

    #[test]
    fn test_luhn_invalid_number() {
        assert!(!validate_card_number("4539148803436468"));
    }

    #[test]
    fn test_card_number_strips_non_digits() {
        assert!(validate_card_number("4539 1488 0343 6467"));
        assert!(validate_card_number("4539-1488-0343-6467"));
    }

    #[test]
    fn test_card_number_length_bounds() {
        // Luhn-valid but too short / too long.
        assert!(!validate_card_number("4539148"));
        assert!(!validate_card_number("45391488034364670000"));
    }

    #[test]
    fn test_expiry_current_month_is_valid() {
        assert!(validate_expiry("03/26", march_2026()));
    }

    #[test]
    fn test_expiry_last_month_is_invalid() {
        assert!(!validate_expiry("02/26", march_2026()));
    }

    #[test]
    fn test_expiry_future_is_valid() {
        assert!(validate_expiry("1/27", march_2026()));
        assert!(validate_expiry(" 12 / 30 ", march_2026()));
    }

    #[test]
    fn test_expiry_bad_month() {
        assert!(!validate_expiry("13/25", march_2026()));
        assert!(!validate_expiry("0/27", march_2026()));
    }

    #[test]
    fn test_expiry_bad_format() {
        assert!(!validate_expiry("03-26", march_2026()));
        assert!(!validate_expiry("03/2026", march_2026()));
        assert!(!validate_expiry("3/6", march_2026()));
        assert!(!validate_expiry("aa/bb", march_2026()));
    }

    #[test]
    fn test_cvc_lengths() {
        assert!(validate_cvc("123", false));
        assert!(!validate_cvc("1234", false));
        assert!(validate_cvc("1234", true));
        assert!(!validate_cvc("123", true));
        assert!(!validate_cvc("12a", false));
    }

    #[test]
    fn test_is_amex_prefixes() {
        assert!(is_amex("341234567890123"));
        assert!(is_amex("37 1234 567890 123"));
        assert!(!is_amex("4539148803436467"));
    }

    #[test]
    fn test_validate_details_all_valid() {
        let details = CardDetails {
            card_number: "4539 1488 0343 6467".to_owned(),
            expiry: "03/26".to_owned(),
            cvc: "123".to_owned(),
            cardholder_name: "Awa Diop".to_owned(),
        };
        let result = validate_card_details(&details, march_2026());
        assert!(result.is_valid());
    }

    #[test]
    fn test_validate_details_amex_requires_four_digit_cvc() {
        // Luhn-valid Amex test number.
        let details = CardDetails {
            card_number: "378282246310005".to_owned(),
            expiry: "12/30".to_owned(),
            cvc: "123".to_owned(),
            cardholder_name: "Awa Diop".to_owned(),
        };
        let result = validate_card_details(&details, march_2026());
        assert_eq!(result.cvc, Some(CardError::InvalidCvc { expected: 4 }));
        assert!(!result.is_valid());
    }

    #[test]
    fn test_error_map_is_field_keyed_when_serialized() {
        let details = CardDetails {
            card_number: "1234".to_owned(),
            expiry: "12/30".to_owned(),
            cvc: "123".to_owned(),
            cardholder_name: "Awa Diop".to_owned(),
        };
        let result = validate_card_details(&details, march_2026());
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["card_number"], "invalid_number");
        assert!(json["expiry"].is_null());
        assert!(json["cvc"].is_null());
    }

    #[test]
    fn test_validate_details_collects_field_errors() {
        let details = CardDetails {
            card_number: "1234".to_owned(),
            expiry: "01/20".to_owned(),
            cvc: "12".to_owned(),
            cardholder_name: " A ".to_owned(),
        };
        let result = validate_card_details(&details, march_2026());
        assert_eq!(result.card_number, Some(CardError::InvalidNumber));
        assert_eq!(result.expiry, Some(CardError::InvalidExpiry));
        assert_eq!(result.cvc, Some(CardError::InvalidCvc { expected: 3 }));
        assert_eq!(
            result.cardholder_name,
            Some(CardError::InvalidCardholderName)
        );
        assert!(!result.is_valid());
    }
}
