//! User-facing compliance messages

use chrono::{DateTime, Utc};

use super::types::ComplianceDecision;

/// Short date used in messages, e.g. `Mar 03, 2018`
pub const SHORT_DATE_FORMAT: &str = "%b %d, %Y";

pub fn blocked_message(platform_name: &str) -> String {
    format!(
        "{platform_name} now requires more complex passwords. Your current password does not meet the new \
         requirements. Change your password now to continue using the site. Thank you for helping us keep \
         your data safe."
    )
}

pub fn grace_period_message(platform_name: &str, deadline: DateTime<Utc>) -> String {
    format!(
        "{platform_name} now requires more complex passwords. Your current password does not meet the new \
         requirements. You must change your password by {} to be able to continue using the site. \
         Thank you for helping us keep your data safe.",
        deadline.format(SHORT_DATE_FORMAT)
    )
}

/// Message for a decision, `None` when compliant
pub fn for_decision(decision: &ComplianceDecision, platform_name: &str) -> Option<String> {
    match decision {
        ComplianceDecision::Compliant => None,
        ComplianceDecision::GracePeriod { deadline } => Some(grace_period_message(platform_name, *deadline)),
        ComplianceDecision::Blocked { .. } => Some(blocked_message(platform_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_messages() {
        let deadline = Utc.with_ymd_and_hms(2018, 3, 3, 0, 0, 0).unwrap();

        let warning = grace_period_message("Acme", deadline);
        assert!(warning.starts_with("Acme now requires"));
        assert!(warning.contains("by Mar 03, 2018 to be able"));

        let blocked = blocked_message("Acme");
        assert!(blocked.contains("Change your password now"));
        assert!(!blocked.contains("  "));

        assert_eq!(for_decision(&ComplianceDecision::Compliant, "Acme"), None);
        assert_eq!(
            for_decision(&ComplianceDecision::Blocked { deadline }, "Acme"),
            Some(blocked)
        );
    }
}
