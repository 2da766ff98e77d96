//! Password Compliance Module
//!
//! Decides at login time whether a non-compliant password is still within
//! its grace period or must now block the login.
//!
//! ## Structure
//! - `types`: Core types (UserComplianceContext, ComplianceDecision)
//! - `config`: Rollout deadlines, parsing and reload
//! - `engine`: Deadline resolution and decision logic
//! - `validator`: Password complexity rules (fail-closed)
//! - `message`: User-facing warning/error text
//!
//! ## Usage
//! ```ignore
//! use password_compliance::compliance::{decide, ComplianceDecision, UserComplianceContext};
//!
//! let ctx = UserComplianceContext::new(user.is_staff, has_role, is_compliant);
//! match decide(&ctx, &rollout) {
//!     ComplianceDecision::Compliant => allow(),
//!     ComplianceDecision::GracePeriod { deadline } => allow_with_warning(deadline),
//!     ComplianceDecision::Blocked { deadline } => reject(deadline),
//! }
//! ```

pub mod types;
pub mod config;
pub mod engine;
pub mod validator;
pub mod message;

// Re-export main types for convenience
pub use types::{ComplianceDecision, UserComplianceContext};

pub use config::{
    parse_deadline,
    ConfigParseError,
    DeadlineParseError,
    DeadlineSetting,
    LoadedRolloutConfig,
    RawRolloutConfig,
    RolloutConfig,
    RolloutConfigHandle,
};

pub use engine::{decide, decide_at, resolve_deadline, should_enforce_on_login};

pub use validator::{check_compliance, ComplexityValidator, PasswordPolicyError, PasswordValidator, UserIdentity};
