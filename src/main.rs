//! Personal finance service - main application entry point.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build the payment gateway client and token keys
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;

use fintrack_server::{
    AppState,
    auth::JwtKeys,
    build_router,
    config::Config,
    db,
    gateway::MidtransClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controls verbosity, "info" by default
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let gateway = MidtransClient::new(
        config.midtrans_server_key.clone(),
        config.midtrans_snap_url.clone(),
        Duration::from_secs(config.midtrans_timeout_secs),
    )?;
    let jwt = JwtKeys::new(&config.jwt_secret, config.jwt_ttl_minutes);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let app = build_router(AppState {
        pool,
        config: Arc::new(config),
        jwt,
        gateway: Arc::new(gateway),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
