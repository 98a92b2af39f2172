//! Shared utilities for feature modules
//!
//! - **validation**: request value validation
//! - **error_helpers**: database error classification

pub mod error_helpers;
pub mod validation;

pub use validation::{validate_number, NumberValidationError};
