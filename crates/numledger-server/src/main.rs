//! numledger server - Main entry point

use anyhow::Result;
use numledger_common::logging::{init_logging, LogConfig};
use tracing::info;

use numledger_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before logging so LOG_* variables from it are honoured
    dotenvy::dotenv().ok();

    let log_config = LogConfig::builder()
        .log_file_prefix("numledger-server")
        .filter_directives("numledger_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    init_logging(&log_config)?;

    info!("Starting numledger server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
