//! Password Validator
//!
//! Complexity rules a password must meet to be compliant.
//! The engine never sees a password, only the boolean produced here.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// TYPES
// ============================================================================

/// Who the password belongs to, for similarity checks
#[derive(Debug, Clone, Copy)]
pub struct UserIdentity<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min_length} characters (got {actual_length})")]
    TooShort { min_length: usize, actual_length: usize },

    #[error("Password must be at most {max_length} characters")]
    TooLong { max_length: usize },

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one number")]
    MissingNumber,

    #[error("Password must contain at least one special character")]
    MissingSpecial,

    #[error("Password is too similar to the account's {0}")]
    TooSimilar(&'static str),
}

/// External password-strength capability
pub trait PasswordValidator: Send + Sync {
    fn validate(&self, password: &str, user: &UserIdentity<'_>) -> Result<(), PasswordPolicyError>;
}

// ============================================================================
// COMPLEXITY VALIDATOR
// ============================================================================

/// Rule-based validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityValidator {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub require_special: bool,
}

impl Default for ComplexityValidator {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
            require_special: false,
        }
    }
}

impl ComplexityValidator {
    /// Every character class required, 12+ characters
    pub fn strict() -> Self {
        Self {
            min_length: 12,
            require_special: true,
            ..Default::default()
        }
    }
}

impl PasswordValidator for ComplexityValidator {
    fn validate(&self, password: &str, user: &UserIdentity<'_>) -> Result<(), PasswordPolicyError> {
        let length = password.chars().count();

        if length < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
                actual_length: length,
            });
        }

        if length > self.max_length {
            return Err(PasswordPolicyError::TooLong {
                max_length: self.max_length,
            });
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(PasswordPolicyError::MissingUppercase);
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err(PasswordPolicyError::MissingLowercase);
        }

        if self.require_number && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingNumber);
        }

        if self.require_special && !password.chars().any(|c| c.is_ascii_punctuation()) {
            return Err(PasswordPolicyError::MissingSpecial);
        }

        let lowered = password.to_lowercase();
        let email = user.email.to_lowercase();
        if lowered == email {
            return Err(PasswordPolicyError::TooSimilar("email"));
        }
        if let Some((local, _)) = email.split_once('@') {
            if !local.is_empty() && lowered == local {
                return Err(PasswordPolicyError::TooSimilar("email"));
            }
        }
        if user.name.is_some_and(|name| !name.is_empty() && lowered == name.to_lowercase()) {
            return Err(PasswordPolicyError::TooSimilar("name"));
        }

        Ok(())
    }
}

// ============================================================================
// FAIL-CLOSED CHECK
// ============================================================================

/// Whether `password` is compliant.
///
/// Any validator failure, including a panic, counts as non-compliant.
/// That only selects warn vs block, it never denies an otherwise valid login by itself.
pub fn check_compliance(validator: &dyn PasswordValidator, password: &str, user: &UserIdentity<'_>) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| validator.validate(password, user))) {
        Ok(Ok(())) => true,
        Ok(Err(reason)) => {
            tracing::debug!(email = user.email, %reason, "Password is not policy compliant");
            false
        }
        Err(_) => {
            tracing::warn!(email = user.email, "Password validator panicked, treating password as non-compliant");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserIdentity<'static> = UserIdentity {
        email: "Jane.Doe@example.com",
        name: Some("janedoe"),
    };

    #[test]
    fn test_default_rules() {
        let v = ComplexityValidator::default();
        assert!(v.validate("Correct1Horse", &USER).is_ok());
        assert_eq!(
            v.validate("Ab1", &USER),
            Err(PasswordPolicyError::TooShort { min_length: 8, actual_length: 3 })
        );
        assert_eq!(v.validate("alllower1", &USER), Err(PasswordPolicyError::MissingUppercase));
        assert_eq!(v.validate("ALLUPPER1", &USER), Err(PasswordPolicyError::MissingLowercase));
        assert_eq!(v.validate("NoDigitsHere", &USER), Err(PasswordPolicyError::MissingNumber));
    }

    #[test]
    fn test_strict_requires_special() {
        let v = ComplexityValidator::strict();
        assert_eq!(v.validate("Correct1HorseB", &USER), Err(PasswordPolicyError::MissingSpecial));
        assert!(v.validate("Correct1Horse!", &USER).is_ok());
    }

    #[test]
    fn test_similarity_to_identity() {
        let v = ComplexityValidator {
            require_uppercase: false,
            require_lowercase: false,
            require_number: false,
            ..Default::default()
        };
        assert_eq!(
            v.validate("jane.doe@example.com", &USER),
            Err(PasswordPolicyError::TooSimilar("email"))
        );
        assert_eq!(v.validate("JANE.DOE", &USER), Err(PasswordPolicyError::TooSimilar("email")));
        assert_eq!(v.validate("JaneDoe!", &USER), Ok(()));
        assert_eq!(v.validate("JANEDOE", &USER).unwrap_err(), PasswordPolicyError::TooShort {
            min_length: 8,
            actual_length: 7,
        });
    }

    struct Exploding;

    impl PasswordValidator for Exploding {
        fn validate(&self, _password: &str, _user: &UserIdentity<'_>) -> Result<(), PasswordPolicyError> {
            panic!("validator backend unavailable");
        }
    }

    #[test]
    fn test_check_compliance_fails_closed() {
        let v = ComplexityValidator::default();
        assert!(check_compliance(&v, "Correct1Horse", &USER));
        assert!(!check_compliance(&v, "weak", &USER));
        assert!(!check_compliance(&Exploding, "Correct1Horse", &USER));
    }
}
