//! Shared validation utilities
//!
//! Validates the raw `number` value of a request before it reaches the
//! ledger. Validation is pure: it never touches the database or the audit
//! log.
//!
//! # Examples
//!
//! ```rust,ignore
//! use numledger_server::features::shared::validation::validate_number;
//! use serde_json::json;
//!
//! assert_eq!(validate_number(&json!(5), 100), Ok(5));
//! assert!(validate_number(&json!("5"), 100).is_err());
//! ```

use serde_json::Value;
use thiserror::Error;

/// Smallest accepted number.
pub const MIN_NUMBER: i64 = 1;

/// Errors that can occur during number validation
///
/// The display strings are returned to callers verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberValidationError {
    #[error("The input must be a valid integer.")]
    InvalidType,

    /// `upper` is the largest accepted number, one below the configured max
    #[error("The input must be between 1 and {upper}.")]
    OutOfRange { upper: i64 },
}

/// Validate a JSON value as a number in `(0, max_number)`
///
/// # Rules
/// - Only JSON integer literals are integers; `5.0`, `1e2`, strings and
///   booleans are rejected with `InvalidType`
/// - Integer literals outside `i64` (`18446744073709551616`) are integers
///   and get `OutOfRange`
/// - The integer must satisfy `0 < n < max_number`, otherwise `OutOfRange`
///
/// # Returns
/// The validated number
pub fn validate_number(value: &Value, max_number: i64) -> Result<i64, NumberValidationError> {
    let Value::Number(number) = value else {
        return Err(NumberValidationError::InvalidType);
    };

    let out_of_range = NumberValidationError::OutOfRange {
        upper: max_number - 1,
    };

    // Numbers keep their source literal, so `5.0` and `1e2` stay
    // distinguishable from integers while `-0` and 2^64 stay integers.
    if number.to_string().contains(['.', 'e', 'E']) {
        return Err(NumberValidationError::InvalidType);
    }

    match number.as_i64() {
        Some(n) if (MIN_NUMBER..max_number).contains(&n) => Ok(n),
        _ => Err(out_of_range),
    }
}
