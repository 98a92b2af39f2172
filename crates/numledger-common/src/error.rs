//! Error types for numledger

use thiserror::Error;

/// Result type alias for numledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Main error type shared across the workspace
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed audit line: {0}")]
    AuditFormat(String),
}
