//! Feature modules implementing the numledger API
//!
//! Each feature is a vertical slice with its own commands and routes.
//!
//! # Features
//!
//! - **numbers**: number validation, dedup, and audit (`POST /process`)
//! - **shared**: validation and database error helpers used by the slices
//!
//! # Architecture
//!
//! - `commands/` - Write operations, each a command struct plus a `handle` function
//! - `routes.rs` - HTTP route definitions and error-to-status mapping

pub mod numbers;
pub mod shared;

use axum::Router;

use numbers::NumberLedger;

/// Shared state for all feature routes
#[derive(Debug, Clone)]
pub struct FeatureState {
    /// Number ledger backing `POST /process`
    pub ledger: NumberLedger,
}

/// Creates the router with all feature routes mounted at the root
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().merge(numbers::numbers_routes().with_state(state.ledger))
}
