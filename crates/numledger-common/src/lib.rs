//! Numledger Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the numledger workspace.
//!
//! # Overview
//!
//! - **Error Handling**: `LedgerError` and its result alias
//! - **Logging**: tracing subscriber setup driven by `LogConfig`
//! - **Audit entries**: the `<YYYY-MM-DD HH:MM:SS> - <message>` line format
//!
//! # Example
//!
//! ```no_run
//! use numledger_common::audit::AuditEntry;
//!
//! let entry = AuditEntry::now("Response: 6. Number 5 has been added to the database.");
//! assert!(entry.to_line().ends_with("has been added to the database."));
//! ```

pub mod audit;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{LedgerError, Result};
