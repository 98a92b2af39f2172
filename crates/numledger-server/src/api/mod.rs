//! HTTP server assembly
//!
//! [`serve`] runs the whole boot sequence: database creation, pool, schema
//! reset, audit truncation, then the listener with graceful shutdown.

pub mod response;

use anyhow::Context;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::features::{self, numbers::NumberLedger};
use crate::middleware;

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let options = db::connect_options(&config.database)?;

    if config.database.auto_create {
        db::ensure_database(&options)
            .await
            .context("Failed to ensure the database exists")?;
    }

    let pool = db::create_pool(&config.database, options).await?;
    db::health_check(&pool).await?;
    info!("Database connection pool established");

    let ledger = NumberLedger::initialize(pool, &config.ledger).await?;
    info!(
        audit_log = %ledger.audit().path().display(),
        max_number = ledger.max_number(),
        "Ledger initialized"
    );

    let app = create_router(ledger, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!("Invalid bind address {}:{}", config.server.host, config.server.port)
        })?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    serve_with_shutdown(
        listener,
        app,
        shutdown_signal(),
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Serve `app` until `signal` resolves, then drain for at most `grace`
///
/// The listener stops accepting as soon as the signal fires. Connections
/// still open when `grace` runs out are dropped.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (fired_tx, fired_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                let _ = fired_tx.send(());
            })
            .await
    });

    tokio::select! {
        result = &mut server => return Ok(result??),
        _ = fired_rx => {},
    }

    info!("Waiting up to {} seconds for connections to close", grace.as_secs());
    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => result??,
        Err(_) => {
            tracing::warn!("Shutdown grace period elapsed, dropping open connections");
            server.abort();
        },
    }

    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(ledger: NumberLedger, config: &Config) -> Router {
    let feature_state = features::FeatureState { ledger };

    features::router(feature_state)
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
