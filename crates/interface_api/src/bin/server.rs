//! RCV Agency - API Server Binary
//!
//! Starts the HTTP API of the agency back office.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin rcv-api
//!
//! # Run with environment variables
//! API_PORT=8080 DATABASE_URL=postgres://... API_JWT_SECRET=... cargo run --bin rcv-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 3000)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - Token lifetime in seconds (default: 86400)
//! * `API_DATABASE_URL` or `DATABASE_URL` - PostgreSQL connection string
//! * `API_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_TIMEZONE` - Agency timezone (default: America/Caracas)
//! * `API_STATIC_DIR` - Front-end directory to serve, optional
//! * `API_LOG_LEVEL` - Default log filter when `RUST_LOG` is unset (default: info)
//! * `API_LOG_JSON` - Set to `true` for JSON log lines

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("failed to load configuration")?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = %config.timezone,
        "Starting RCV API server"
    );
    if config.uses_default_secret() {
        tracing::warn!("API_JWT_SECRET is not set; using the development secret");
    }

    tracing::info!("Connecting to database...");
    let pool = infra_db::create_pool(config.database())
        .await
        .context("failed to connect to the database")?;

    tracing::info!("Running database migrations...");
    infra_db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("invalid server address")?;

    let state = AppState::postgres(pool, config).context("invalid configuration")?;
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_target(true)))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
