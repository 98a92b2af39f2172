//! Audit log file
//!
//! Append-only text file recording every application-level outcome: ledger
//! decisions and validation failures. Storage failures are not audited; they
//! go to the diagnostic log through `tracing`.
//!
//! The file is truncated when the server starts, so it only ever describes
//! the current run.
//!
//! # Usage
//!
//! ```no_run
//! use numledger_server::audit::AuditLog;
//!
//! # async fn example() -> numledger_common::Result<()> {
//! let audit = AuditLog::new("./logs.txt");
//! audit.truncate().await?;
//! audit.append("Response: 6. Number 5 has been added to the database.").await?;
//!
//! for entry in audit.entries().await? {
//!     tracing::info!(timestamp = %entry.timestamp, message = %entry.message, "audit");
//! }
//! # Ok(())
//! # }
//! ```

use numledger_common::audit::AuditEntry;
use numledger_common::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Handle to the audit log file
///
/// Cheap to clone; clones share the same write lock so lines from
/// concurrent requests are never interleaved.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empty the file, creating it and its parent directories if needed
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn truncate(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::File::create(self.path.as_path()).await?;

        tracing::info!("Audit log cleared");
        Ok(())
    }

    /// Timestamp `message` with the current local time and append it
    pub async fn append(&self, message: &str) -> Result<AuditEntry> {
        let entry = AuditEntry::now(message);
        self.record(&entry).await?;
        Ok(entry)
    }

    /// Append a pre-built entry as one line
    pub async fn record(&self, entry: &AuditEntry) -> Result<()> {
        let mut line = entry.to_line();
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_path())
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(message = %entry.message, "Audit entry written");
        Ok(())
    }

    /// Read every entry back in file order
    ///
    /// A missing file reads as an empty log.
    pub async fn entries(&self) -> Result<Vec<AuditEntry>> {
        let contents = match tokio::fs::read_to_string(self.path.as_path()).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(AuditEntry::parse_line)
            .collect()
    }
}
