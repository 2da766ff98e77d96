//! Password Policy Compliance Server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use password_compliance::{
    compliance::{ComplexityValidator, RolloutConfig, RolloutConfigHandle},
    config, create_router, db, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "password_compliance=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Password compliance server starting...");
    if config.is_production() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("JWT_SECRET is not set, using the development default in production");
    }
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));

    // Rollout deadlines; bad values are logged and dropped, never fatal
    let rollout = RolloutConfig::from_env();
    tracing::info!(
        enforce_on_login = rollout.config.enforce_on_login,
        general = ?rollout.config.general_deadline,
        elevated = ?rollout.config.elevated_privilege_deadline,
        staff = ?rollout.config.staff_deadline,
        rejected = rollout.rejected.len(),
        "Password policy rollout config loaded"
    );

    // Initialize database pool
    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
        rollout: Arc::new(RolloutConfigHandle::new(rollout.config)),
        validator: Arc::new(ComplexityValidator::default()),
    };

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
