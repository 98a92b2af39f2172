//! Number ledger
//!
//! Owns the `numbers` table. Processing a number looks up the number and its
//! successor in one statement, then either reports which one is already
//! present or inserts the number. Every decision is appended to the audit log.
//!
//! The lookup and the insert are separate statements. Two concurrent requests
//! for the same number can both see it missing; the loser's insert hits the
//! unique constraint and is reported as [`ProcessOutcome::AlreadyPresent`],
//! exactly as if it had arrived second.
//!
//! An insert is only committed once its audit line is written. If the audit
//! write fails the insert rolls back, so a retry still reports the insertion.

use anyhow::Context;
use sqlx::PgPool;

use crate::audit::AuditLog;
use crate::config::LedgerConfig;
use crate::db;
use crate::features::shared::error_helpers::is_unique_violation;

use super::commands::ProcessNumberError;

/// Result of processing a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The number itself was already stored
    AlreadyPresent(i64),
    /// The successor (carried value) was already stored
    SuccessorPresent(i64),
    /// The number was stored
    Inserted(i64),
}

impl ProcessOutcome {
    /// Decide the outcome from the two lookups
    ///
    /// Returns `None` when neither value is present and `n` must be inserted.
    pub fn classify(n: i64, number_present: bool, successor_present: bool) -> Option<Self> {
        if number_present {
            Some(Self::AlreadyPresent(n))
        } else if successor_present {
            Some(Self::SuccessorPresent(n + 1))
        } else {
            None
        }
    }

    /// Human-readable message, also used as the audit log text
    pub fn message(&self) -> String {
        match self {
            Self::AlreadyPresent(n) => format!("Number {} is already in the database. (case 1)", n),
            Self::SuccessorPresent(m) => {
                format!("Number {} is already in the database. (case 2)", m)
            },
            Self::Inserted(n) => format!(
                "Response: {}. Number {} has been added to the database.",
                n + 1,
                n
            ),
        }
    }

    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyPresent(_) => "already_present",
            Self::SuccessorPresent(_) => "successor_present",
            Self::Inserted(_) => "inserted",
        }
    }
}

impl std::fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Persisted set of accepted numbers plus its audit trail
///
/// Cloning is cheap: the pool and the audit handle are both shared.
#[derive(Debug, Clone)]
pub struct NumberLedger {
    pool: PgPool,
    audit: AuditLog,
    max_number: i64,
}

impl NumberLedger {
    pub fn new(pool: PgPool, audit: AuditLog, config: &LedgerConfig) -> Self {
        Self {
            pool,
            audit,
            max_number: config.max_number,
        }
    }

    /// Build a ledger and wipe its state: the table is recreated and the
    /// audit log truncated
    pub async fn initialize(pool: PgPool, config: &LedgerConfig) -> anyhow::Result<Self> {
        db::reset_schema(&pool)
            .await
            .context("Failed to recreate the numbers table")?;

        let audit = AuditLog::new(config.audit_log_path.clone());
        audit.truncate().await.with_context(|| {
            format!("Failed to truncate audit log {}", config.audit_log_path.display())
        })?;

        Ok(Self::new(pool, audit, config))
    }

    pub fn max_number(&self) -> i64 {
        self.max_number
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Look up `n` and `n + 1` against the same snapshot
    pub async fn lookup(&self, n: i64) -> Result<(bool, bool), sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM numbers WHERE number = $1) AS number_present,
                EXISTS(SELECT 1 FROM numbers WHERE number = $2) AS successor_present
            "#,
        )
        .bind(n)
        .bind(n + 1)
        .fetch_one(&self.pool)
        .await
    }

    /// Check-and-insert `n`, then audit the outcome
    ///
    /// `n` is expected to be validated already. Storage errors abort the
    /// request before anything is audited.
    #[tracing::instrument(skip(self))]
    pub async fn process(&self, n: i64) -> Result<ProcessOutcome, ProcessNumberError> {
        let (number_present, successor_present) = self.lookup(n).await?;

        let outcome = match ProcessOutcome::classify(n, number_present, successor_present) {
            Some(outcome) => {
                self.audit.append(&outcome.message()).await?;
                outcome
            },
            None => self.insert(n).await?,
        };

        tracing::info!(number = n, outcome = outcome.kind(), "Number processed");
        Ok(outcome)
    }

    /// Insert `n` and audit the result, committing only after the audit write
    async fn insert(&self, n: i64) -> Result<ProcessOutcome, ProcessNumberError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO numbers (number) VALUES ($1)")
            .bind(n)
            .execute(&mut *tx)
            .await;

        let outcome = match result {
            Ok(_) => ProcessOutcome::Inserted(n),
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(number = n, "Lost insert race, number stored concurrently");
                ProcessOutcome::AlreadyPresent(n)
            },
            Err(e) => return Err(e.into()),
        };

        // Dropping `tx` on an audit error rolls the insert back
        self.audit.append(&outcome.message()).await?;

        if outcome == ProcessOutcome::Inserted(n) {
            tx.commit().await?;
        }

        Ok(outcome)
    }

    /// All stored numbers in ascending order
    pub async fn numbers(&self) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT number FROM numbers ORDER BY number")
            .fetch_all(&self.pool)
            .await
    }
}
