//! User model

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::compliance::UserIdentity;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub role: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Learner,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Learner => "learner",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
    /// Set while the user's password is inside its grace period
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub is_staff: bool,
}

impl User {
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND is_active = true")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Whether the user holds at least one course/organization access grant
    pub async fn has_access_grant(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM access_roles WHERE user_id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub fn identity(&self) -> UserIdentity<'_> {
        UserIdentity {
            email: &self.email,
            name: self.name.as_deref(),
        }
    }

    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            is_staff: self.is_staff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "jane@example.com".to_string(),
            password: "x".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_login_response_warning_only_when_set() {
        let user = UserInfo {
            id: Uuid::nil(),
            email: "jane@example.com".to_string(),
            name: None,
            role: "learner".to_string(),
            is_staff: false,
        };

        let silent = serde_json::to_value(LoginResponse {
            token: "t".to_string(),
            user,
            warning: None,
        })
        .unwrap();
        assert_eq!(silent["token"], "t");
        assert_eq!(silent["user"]["email"], "jane@example.com");
        assert!(silent.get("warning").is_none());

        let warned = serde_json::to_value(LoginResponse {
            token: "t".to_string(),
            user: UserInfo {
                id: Uuid::nil(),
                email: "jane@example.com".to_string(),
                name: None,
                role: "learner".to_string(),
                is_staff: false,
            },
            warning: Some("change your password by Mar 03, 2018".to_string()),
        })
        .unwrap();
        assert_eq!(warned["warning"], "change your password by Mar 03, 2018");
    }
}
