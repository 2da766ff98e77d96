//! Rollout config admin handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppState, AppResult};
use crate::compliance::RolloutConfig;
use crate::middleware::auth::{require_admin, UserContext};

#[derive(Debug, Serialize)]
pub struct RejectedSetting {
    pub key: &'static str,
    pub raw_value: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub config: RolloutConfig,
    pub rejected: Vec<RejectedSetting>,
}

/// Current rollout config
pub async fn get_config(
    State(state): State<AppState>,
    user: UserContext,
) -> AppResult<Json<RolloutConfig>> {
    require_admin(&user)?;
    Ok(Json(state.rollout.current().as_ref().clone()))
}

/// Re-read the rollout config from the environment and swap it in
pub async fn reload(
    State(state): State<AppState>,
    user: UserContext,
) -> AppResult<Json<ReloadResponse>> {
    require_admin(&user)?;

    let rejected = state.rollout.reload_from_env();
    tracing::info!(user_id = %user.user_id, "Rollout config reloaded by admin");

    Ok(Json(ReloadResponse {
        config: state.rollout.current().as_ref().clone(),
        rejected: rejected
            .iter()
            .map(|e| RejectedSetting {
                key: e.key(),
                raw_value: e.raw_value().to_string(),
                message: e.to_string(),
            })
            .collect(),
    }))
}
