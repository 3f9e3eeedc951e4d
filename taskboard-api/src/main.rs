//! # Taskboard API Server
//!
//! JSON API for the team task board: accounts and sessions, projects with
//! their members, tasks, and the team directory.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Connect to PostgreSQL and run pending migrations
//! 3. Serve the router until Ctrl-C / SIGTERM, then drain and close the pool
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskboard-api
//! ```

use anyhow::Context;
use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::{
    db::{migrations::run_migrations, pool::{close_pool, create_pool}},
    store::PgStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = create_pool(config.pool_config())
        .await
        .context("Failed to connect to the database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(pool.clone())), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
