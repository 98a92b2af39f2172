//! Audit entry line format
//!
//! One entry per line, `<YYYY-MM-DD HH:MM:SS> - <message>`, timestamped in
//! local time. The server appends these lines to the audit file; this module
//! only knows how to render and parse them.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Timestamp format used at the start of every audit line.
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator between timestamp and message.
pub const AUDIT_SEPARATOR: &str = " - ";

/// A single audit log event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl AuditEntry {
    pub fn new(timestamp: NaiveDateTime, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    /// Create an entry stamped with the current local time (second precision)
    pub fn now(message: impl Into<String>) -> Self {
        let now = Local::now().naive_local();
        // Sub-second precision is not representable in the line format
        let timestamp = now.with_nanosecond(0).unwrap_or(now);
        Self::new(timestamp, message)
    }

    /// Render the entry as a single line, without the trailing newline
    pub fn to_line(&self) -> String {
        format!(
            "{}{}{}",
            self.timestamp.format(AUDIT_TIMESTAMP_FORMAT),
            AUDIT_SEPARATOR,
            self.message
        )
    }

    /// Parse a line previously produced by [`AuditEntry::to_line`]
    pub fn parse_line(line: &str) -> Result<Self> {
        let (timestamp, message) = line
            .split_once(AUDIT_SEPARATOR)
            .ok_or_else(|| LedgerError::AuditFormat(line.to_string()))?;

        let timestamp = NaiveDateTime::parse_from_str(timestamp, AUDIT_TIMESTAMP_FORMAT)
            .map_err(|_| LedgerError::AuditFormat(line.to_string()))?;

        Ok(Self::new(timestamp, message))
    }
}

impl std::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_line())
    }
}
