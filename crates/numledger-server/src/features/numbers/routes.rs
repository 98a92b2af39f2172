//! Number API routes
//!
//! # Route Structure
//!
//! - `POST /process` - Validate a number and record it in the ledger
//!
//! # Examples
//!
//! ```rust,ignore
//! use axum::Router;
//! use numledger_server::features::numbers::routes::numbers_routes;
//!
//! let app = Router::new().merge(numbers_routes().with_state(ledger));
//! ```

use crate::api::response::ErrorResponse;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::{
    commands::{ProcessNumberCommand, ProcessNumberError},
    ledger::NumberLedger,
};

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the numbers router
pub fn numbers_routes() -> Router<NumberLedger> {
    Router::new().route("/process", post(process_number))
}

// ============================================================================
// Command Handlers
// ============================================================================

/// Process a number
///
/// # Endpoint
///
/// `POST /process`
///
/// # Request Body
///
/// ```json
/// { "number": 5 }
/// ```
///
/// The body is read raw so that a missing or malformed body gets the same
/// 400 as a missing `number` key, whatever the `Content-Type` says.
///
/// # Response
///
/// - `200 OK` - `{"message": ...}` describing what the ledger did
/// - `400 Bad Request` - Missing number, wrong type, or out of range
/// - `500 Internal Server Error` - Database or audit log failure
#[tracing::instrument(skip(ledger, body), fields(body_len = body.len()))]
async fn process_number(
    State(ledger): State<NumberLedger>,
    body: Bytes,
) -> Result<Response, NumbersApiError> {
    let command = ProcessNumberCommand::from_body(&body)?;

    let response = super::commands::process::handle(ledger, command).await?;

    tracing::debug!(outcome = response.outcome.kind(), "Number processed via API");

    Ok((StatusCode::OK, Json(response)).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Error type for number API endpoints
#[derive(Debug)]
pub struct NumbersApiError(ProcessNumberError);

impl From<ProcessNumberError> for NumbersApiError {
    fn from(err: ProcessNumberError) -> Self {
        Self(err)
    }
}

impl IntoResponse for NumbersApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ProcessNumberError::MissingNumber | ProcessNumberError::Validation(_) => {
                let error = ErrorResponse::new(self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ProcessNumberError::Database(_) => {
                tracing::error!("Database error while processing number: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal()))
                    .into_response()
            },
            ProcessNumberError::Audit(_) => {
                tracing::error!("Audit log error while processing number: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal()))
                    .into_response()
            },
        }
    }
}

impl std::fmt::Display for NumbersApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
