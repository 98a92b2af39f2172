//! Number ledger feature
//!
//! - `commands/process` - validate a candidate and run it through the ledger
//! - `ledger` - the persisted set of numbers and its audit trail
//! - `routes` - `POST /process`

pub mod commands;
pub mod ledger;
pub mod routes;

pub use ledger::{NumberLedger, ProcessOutcome};
pub use routes::numbers_routes;
