//! API response types
//!
//! Bodies are flat JSON objects: `{"message": ...}` on success and
//! `{"error": ...}` on failure.

use serde::{Deserialize, Serialize};

/// Error body returned for every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Generic body for failures whose details stay in the server logs
    pub fn internal() -> Self {
        Self::new("Internal server error")
    }
}
