//! numledger server library
//!
//! HTTP service that accepts a natural number, checks it against a persisted
//! set of previously seen numbers, and records every decision in an audit log.
//!
//! # Overview
//!
//! - **API**: a single `POST /process` endpoint
//! - **Database**: PostgreSQL via SQLx, created and reset on boot
//! - **Audit log**: append-only text file of timestamped outcomes
//! - **Configuration**: environment variables with `.env` support
//! - **Middleware**: CORS and request tracing
//!
//! # Processing rules
//!
//! For an integer `n` with `1 <= n < MAX`:
//!
//! 1. `n` already stored: reported, nothing inserted
//! 2. `n + 1` already stored: reported, nothing inserted
//! 3. otherwise `n` is stored and `n + 1` returned
//!
//! Anything else is rejected with a 400 and the rejection is audited.
//!
//! # Example
//!
//! ```no_run
//! use numledger_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await
//! }
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod features;
pub mod middleware;

pub use features::numbers::{NumberLedger, ProcessOutcome};
