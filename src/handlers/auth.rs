//! Authentication handlers

use axum::{extract::State, Json};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use jsonwebtoken::{encode, Header, EncodingKey};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};
use validator::Validate;

use crate::{AppState, AppError, AppResult};
use crate::compliance::{self, check_compliance, ComplianceDecision, RolloutConfig, UserComplianceContext};
use crate::models::{User, LoginRequest, LoginResponse};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // User ID
    pub role: String,     // User role
    pub exp: usize,       // Expiration timestamp
    pub iat: usize,       // Issued at
}

/// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;

    // Find user by email
    let user = User::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::InternalError("Invalid password hash".to_string()))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::InvalidCredentials)?;

    // Credentials are verified; only now is the password policy consulted
    let rollout = state.rollout.current();
    let warning = if compliance::should_enforce_on_login(&rollout) {
        let decision = evaluate_compliance(&state, &rollout, &user, &req.password).await;
        apply_decision(&decision, &state.config.platform_name, &user)?
    } else {
        None
    };

    // Update last login
    User::update_last_login(&state.pool, user.id).await?;

    // Generate JWT
    let token = generate_jwt(&user, &state.config.jwt_secret, state.config.jwt_expiration_hours)?;

    Ok(Json(LoginResponse {
        token,
        user: user.to_info(),
        warning,
    }))
}

/// Build the compliance context for an authenticated user and decide
async fn evaluate_compliance(
    state: &AppState,
    rollout: &RolloutConfig,
    user: &User,
    password: &str,
) -> ComplianceDecision {
    let password_is_compliant = check_compliance(state.validator.as_ref(), password, &user.identity());

    // No lookup needed when nothing can come of it
    let has_elevated_privilege_role = if password_is_compliant || !rollout.has_any_deadline() {
        false
    } else {
        User::has_access_grant(&state.pool, user.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = %user.id, error = %e, "Access grant lookup failed, assuming none");
                false
            })
    };

    let context = UserComplianceContext::new(user.is_staff, has_elevated_privilege_role, password_is_compliant);
    compliance::decide(&context, rollout)
}

/// Map a decision onto the login outcome: the warning to show, or a refusal
pub fn apply_decision(
    decision: &ComplianceDecision,
    platform_name: &str,
    user: &User,
) -> AppResult<Option<String>> {
    match decision {
        ComplianceDecision::Compliant => Ok(None),
        ComplianceDecision::GracePeriod { deadline } => {
            tracing::info!(user_id = %user.id, %deadline, "Non-compliant password within grace period");
            Ok(Some(compliance::message::grace_period_message(platform_name, *deadline)))
        }
        ComplianceDecision::Blocked { deadline } => {
            tracing::warn!(user_id = %user.id, %deadline, "Login blocked: non-compliant password past deadline");
            Err(AppError::PasswordNonCompliant {
                message: compliance::message::blocked_message(platform_name),
            })
        }
    }
}

/// Generate JWT token
pub fn generate_jwt(user: &User, secret: &str, expiration_hours: u64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours as i64);

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes())
    ).map_err(|e| AppError::InternalError(e.to_string()))
}
