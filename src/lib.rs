//! Password Policy Compliance Service
//!
//! Enforces an evolving password complexity policy at login time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  LOGIN (POST /auth/login)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  authenticate ──► validator (fail-closed)                   │
//! │              └──► access grant lookup (fail-open)           │
//! │                          │                                  │
//! │                          ▼                                  │
//! │   RolloutConfigHandle ─► compliance::decide                 │
//! │                          │                                  │
//! │        Compliant / GracePeriod(warning) / Blocked(403)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod compliance;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use error::{AppError, AppResult};

use compliance::{PasswordValidator, RolloutConfigHandle};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
    pub rollout: Arc<RolloutConfigHandle>,
    pub validator: Arc<dyn PasswordValidator>,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/auth/login", post(handlers::auth::login));

    // Admin routes (user JWT auth, admin role checked per handler)
    let admin_routes = Router::new()
        .route("/api/v1/admin/compliance/config", get(handlers::compliance::get_config))
        .route("/api/v1/admin/compliance/reload", post(handlers::compliance::reload))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user_auth
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
