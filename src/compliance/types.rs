//! Compliance Types
//!
//! Core types for password compliance decisions.
//! No decision logic here, only data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// USER CONTEXT
// ============================================================================

/// Per-login facts about the user being evaluated.
///
/// Built fresh for every login attempt, after the user's credentials have
/// been verified. `password_is_compliant` comes from a
/// [`PasswordValidator`](super::validator::PasswordValidator) and is opaque here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserComplianceContext {
    pub is_staff: bool,
    /// Holds at least one course/organization access grant
    pub has_elevated_privilege_role: bool,
    pub password_is_compliant: bool,
}

impl UserComplianceContext {
    pub fn new(is_staff: bool, has_elevated_privilege_role: bool, password_is_compliant: bool) -> Self {
        Self {
            is_staff,
            has_elevated_privilege_role,
            password_is_compliant,
        }
    }
}

// ============================================================================
// DECISION
// ============================================================================

/// Outcome of a compliance evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComplianceDecision {
    /// Password is compliant, or no deadline applies to this user
    Compliant,
    /// Non-compliant, deadline still in the future: allow login with a warning
    GracePeriod { deadline: DateTime<Utc> },
    /// Non-compliant, deadline reached: reject the login
    Blocked { deadline: DateTime<Utc> },
}

impl ComplianceDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceDecision::Compliant => "compliant",
            ComplianceDecision::GracePeriod { .. } => "grace_period",
            ComplianceDecision::Blocked { .. } => "blocked",
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            ComplianceDecision::Compliant => None,
            ComplianceDecision::GracePeriod { deadline } | ComplianceDecision::Blocked { deadline } => {
                Some(*deadline)
            }
        }
    }

    pub fn allows_login(&self) -> bool {
        !matches!(self, ComplianceDecision::Blocked { .. })
    }
}

impl std::fmt::Display for ComplianceDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
