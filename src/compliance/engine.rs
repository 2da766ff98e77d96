//! Compliance Engine
//!
//! Decision logic only - no type definitions.
//! Input: UserComplianceContext + RolloutConfig
//! Output: ComplianceDecision

use chrono::{DateTime, Utc};

use super::config::RolloutConfig;
use super::types::{ComplianceDecision, UserComplianceContext};

// ============================================================================
// DEADLINE RESOLUTION
// ============================================================================

/// Earliest deadline that applies to this user, if any.
///
/// Tiers chain `staff -> elevated -> general`: an unset tier inherits the
/// already-resolved value of the broader one. Tiers the user does not
/// qualify for are dropped before taking the minimum.
pub fn resolve_deadline(config: &RolloutConfig, context: &UserComplianceContext) -> Option<DateTime<Utc>> {
    let general = config.general_deadline;
    let elevated = config.elevated_privilege_deadline.or(general);
    let staff = config.staff_deadline.or(elevated);

    let elevated = elevated.filter(|_| context.has_elevated_privilege_role);
    let staff = staff.filter(|_| context.is_staff);

    [staff, elevated, general].into_iter().flatten().min()
}

// ============================================================================
// MAIN DECISION FUNCTION
// ============================================================================

/// Decide against the current UTC time.
///
/// Only call this after the user has been authenticated.
pub fn decide(context: &UserComplianceContext, config: &RolloutConfig) -> ComplianceDecision {
    decide_at(context, config, Utc::now())
}

/// Decide with an explicit clock
pub fn decide_at(
    context: &UserComplianceContext,
    config: &RolloutConfig,
    now: DateTime<Utc>,
) -> ComplianceDecision {
    if context.password_is_compliant {
        return ComplianceDecision::Compliant;
    }

    let Some(deadline) = resolve_deadline(config, context) else {
        return ComplianceDecision::Compliant;
    };

    if now >= deadline {
        ComplianceDecision::Blocked { deadline }
    } else {
        ComplianceDecision::GracePeriod { deadline }
    }
}

/// Caller-side gate
pub fn should_enforce_on_login(config: &RolloutConfig) -> bool {
    config.enforce_on_login
}

// ============================================================================
// TESTS
// ============================================================================
