//! Account Service
//! Mission: Register, authenticate, update and close accounts over HTTP

use account_service::{create_router, Config};
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let config = Config::parse();
    info!(
        backend = ?config.backend,
        bind = %config.bind,
        request_timeout_secs = config.request_timeout_secs,
        "Account service starting"
    );

    // Constructed once, shared by every request, dropped at shutdown
    let store = config.build_store()?;
    let app = create_router(store, config.request_timeout());

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("API server listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Account service stopped");
    Ok(())
}

/// Initialize tracing; `RUST_LOG` overrides the default filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also try the package root when launched from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
