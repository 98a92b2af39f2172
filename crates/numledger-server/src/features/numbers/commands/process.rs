//! Process number command
//!
//! Parses the request body, validates the number, and hands it to the
//! [`NumberLedger`]. Validation failures are audited here because they never
//! reach the ledger.
//!
//! # Architecture
//!
//! - Command: the decoded request body, with its own validation
//! - Handler: standalone async function, all business flow in one place
//! - SQL lives in the ledger

use numledger_common::LedgerError;
use serde::Serialize;
use serde_json::Value;

use crate::features::numbers::ledger::{NumberLedger, ProcessOutcome};
use crate::features::shared::validation::{validate_number, NumberValidationError};

/// Message returned when the body is missing or has no usable `number`.
pub const MISSING_NUMBER_MESSAGE: &str = "Invalid input. Please send a number.";

/// Command to process a number against the ledger
///
/// `number` is kept as raw JSON so that type errors are reported by the
/// validator instead of the deserializer.
///
/// # Examples
///
/// ```rust,ignore
/// use numledger_server::features::numbers::commands::ProcessNumberCommand;
/// use serde_json::json;
///
/// let command = ProcessNumberCommand { number: Some(json!(5)) };
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessNumberCommand {
    /// Candidate number; `null` and absent are both `None`
    pub number: Option<Value>,
}

/// Response from processing a number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessNumberResponse {
    #[serde(skip)]
    pub outcome: ProcessOutcome,
    pub message: String,
}

impl From<ProcessOutcome> for ProcessNumberResponse {
    fn from(outcome: ProcessOutcome) -> Self {
        Self {
            message: outcome.message(),
            outcome,
        }
    }
}

/// Errors that can occur when processing a number
#[derive(Debug, thiserror::Error)]
pub enum ProcessNumberError {
    #[error("{}", MISSING_NUMBER_MESSAGE)]
    MissingNumber,

    #[error("{0}")]
    Validation(#[from] NumberValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Audit log error: {0}")]
    Audit(#[from] LedgerError),
}

impl ProcessNumberCommand {
    /// Decode a raw request body
    ///
    /// An empty body, invalid JSON, or JSON that is not an object all count
    /// as a missing number.
    pub fn from_body(body: &[u8]) -> Result<Self, ProcessNumberError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(error = %e, "Request body is not valid JSON");
            ProcessNumberError::MissingNumber
        })?;

        let Value::Object(mut fields) = value else {
            return Err(ProcessNumberError::MissingNumber);
        };

        Ok(Self {
            number: fields.remove("number").filter(|v| !v.is_null()),
        })
    }

    /// Validates the command against the ledger's bound
    ///
    /// # Errors
    ///
    /// - `MissingNumber` if `number` is absent or null
    /// - `Validation` if it is not an integer in `(0, max_number)`
    pub fn validate(&self, max_number: i64) -> Result<i64, ProcessNumberError> {
        let value = self.number.as_ref().ok_or(ProcessNumberError::MissingNumber)?;
        Ok(validate_number(value, max_number)?)
    }
}

/// Handler function for processing numbers
///
/// # Errors
///
/// - `MissingNumber` / `Validation` for bad input; validation failures are
///   written to the audit log first
/// - `Database` if the ledger lookup or insert fails
/// - `Audit` if the audit log cannot be written
#[tracing::instrument(skip(ledger, command))]
pub async fn handle(
    ledger: NumberLedger,
    command: ProcessNumberCommand,
) -> Result<ProcessNumberResponse, ProcessNumberError> {
    let number = match command.validate(ledger.max_number()) {
        Ok(number) => number,
        Err(ProcessNumberError::Validation(err)) => {
            tracing::info!(input = ?command.number, reason = %err, "Number rejected");
            ledger.audit().append(&err.to_string()).await?;
            return Err(err.into());
        },
        Err(err) => return Err(err),
    };

    let outcome = ledger.process(number).await?;

    Ok(outcome.into())
}
