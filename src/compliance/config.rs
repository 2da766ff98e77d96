//! Rollout Configuration
//!
//! Deadlines for password policy enforcement, per user tier.
//! Loaded from a JSON document and/or individual environment variables,
//! parsed once at load time and swapped atomically on reload.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ============================================================================
// KEYS
// ============================================================================

/// Env var holding the whole rollout config as a JSON object
pub const ROLLOUT_CONFIG_ENV: &str = "PASSWORD_POLICY_COMPLIANCE_ROLLOUT_CONFIG";

pub const ENFORCE_COMPLIANCE_ON_LOGIN: &str = "ENFORCE_COMPLIANCE_ON_LOGIN";
pub const GENERAL_USER_COMPLIANCE_DEADLINE: &str = "GENERAL_USER_COMPLIANCE_DEADLINE";
pub const ELEVATED_PRIVILEGE_USER_COMPLIANCE_DEADLINE: &str = "ELEVATED_PRIVILEGE_USER_COMPLIANCE_DEADLINE";
pub const STAFF_USER_COMPLIANCE_DEADLINE: &str = "STAFF_USER_COMPLIANCE_DEADLINE";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized date value '{raw_value}'")]
pub struct DeadlineParseError {
    pub raw_value: String,
}

/// A rollout setting that could not be used. Never surfaced to login callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigParseError {
    #[error("Could not parse {key} password policy rollout value of '{}'.", .source.raw_value)]
    InvalidDeadline {
        key: &'static str,
        #[source]
        source: DeadlineParseError,
    },

    #[error("Could not parse {key} password policy rollout value of '{raw_value}' as a boolean.")]
    InvalidFlag { key: &'static str, raw_value: String },

    #[error("PASSWORD_POLICY_COMPLIANCE_ROLLOUT_CONFIG is not a valid JSON object: {0}")]
    InvalidDocument(String),
}

impl ConfigParseError {
    pub fn key(&self) -> &'static str {
        match self {
            ConfigParseError::InvalidDeadline { key, .. } | ConfigParseError::InvalidFlag { key, .. } => key,
            ConfigParseError::InvalidDocument(_) => ROLLOUT_CONFIG_ENV,
        }
    }

    pub fn raw_value(&self) -> &str {
        match self {
            ConfigParseError::InvalidDeadline { source, .. } => &source.raw_value,
            ConfigParseError::InvalidFlag { raw_value, .. } => raw_value,
            ConfigParseError::InvalidDocument(_) => "",
        }
    }

    /// Emit the diagnostic for this rejected setting
    fn report(&self) {
        tracing::error!(key = self.key(), raw_value = self.raw_value(), "{}", self);
    }
}

// ============================================================================
// DEADLINE PARSING
// ============================================================================

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a configured deadline.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS±HH:MM`, naive date-times and bare
/// dates. Values without an offset are taken as UTC.
pub fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, DeadlineParseError> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| DeadlineParseError {
            raw_value: raw.to_string(),
        })
}

/// A deadline as it appears in a config source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DeadlineSetting {
    /// Unix timestamp in seconds
    Unix(i64),
    Text(String),
}

impl DeadlineSetting {
    /// Blank text counts as unset
    pub fn resolve(&self) -> Result<Option<DateTime<Utc>>, DeadlineParseError> {
        match self {
            DeadlineSetting::Text(text) if text.trim().is_empty() => Ok(None),
            DeadlineSetting::Text(text) => parse_deadline(text).map(Some),
            DeadlineSetting::Unix(secs) => DateTime::from_timestamp(*secs, 0)
                .map(Some)
                .ok_or_else(|| DeadlineParseError {
                    raw_value: secs.to_string(),
                }),
        }
    }

    /// Convert one JSON value. Anything but a string, an integer or null is rejected.
    fn from_json_value(key: &'static str, value: &Value) -> Result<Option<Self>, ConfigParseError> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(DeadlineSetting::Text(text.clone()))),
            Value::Number(n) if n.is_i64() => Ok(n.as_i64().map(DeadlineSetting::Unix)),
            other => Err(ConfigParseError::InvalidDeadline {
                key,
                source: DeadlineParseError {
                    raw_value: other.to_string(),
                },
            }),
        }
    }
}

// ============================================================================
// RAW CONFIG
// ============================================================================

const DEADLINE_KEYS: [&str; 3] = [
    GENERAL_USER_COMPLIANCE_DEADLINE,
    ELEVATED_PRIVILEGE_USER_COMPLIANCE_DEADLINE,
    STAFF_USER_COMPLIANCE_DEADLINE,
];

/// Unparsed rollout settings keyed as in the config source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRolloutConfig {
    #[serde(rename = "ENFORCE_COMPLIANCE_ON_LOGIN")]
    pub enforce_on_login: Option<bool>,

    #[serde(rename = "GENERAL_USER_COMPLIANCE_DEADLINE")]
    pub general_deadline: Option<DeadlineSetting>,

    #[serde(rename = "ELEVATED_PRIVILEGE_USER_COMPLIANCE_DEADLINE")]
    pub elevated_privilege_deadline: Option<DeadlineSetting>,

    #[serde(rename = "STAFF_USER_COMPLIANCE_DEADLINE")]
    pub staff_deadline: Option<DeadlineSetting>,
}

impl RawRolloutConfig {
    /// Key-wise override: every setting present in `other` replaces ours
    pub fn overlay(self, other: RawRolloutConfig) -> Self {
        Self {
            enforce_on_login: other.enforce_on_login.or(self.enforce_on_login),
            general_deadline: other.general_deadline.or(self.general_deadline),
            elevated_privilege_deadline: other
                .elevated_privilege_deadline
                .or(self.elevated_privilege_deadline),
            staff_deadline: other.staff_deadline.or(self.staff_deadline),
        }
    }

    /// Read a JSON object of settings, key by key.
    ///
    /// Only a document that is not a JSON object fails as a whole. A value of
    /// the wrong type drops that key alone and is returned alongside.
    pub fn from_json(document: &str) -> Result<(Self, Vec<ConfigParseError>), ConfigParseError> {
        let map: Map<String, Value> =
            serde_json::from_str(document).map_err(|e| ConfigParseError::InvalidDocument(e.to_string()))?;

        let mut raw = Self::default();
        let mut rejected = Vec::new();

        if let Some(value) = map.get(ENFORCE_COMPLIANCE_ON_LOGIN) {
            match flag_from_json(value) {
                Ok(flag) => raw.enforce_on_login = flag,
                Err(e) => rejected.push(e),
            }
        }

        for key in DEADLINE_KEYS {
            let Some(value) = map.get(key) else {
                continue;
            };
            let setting = DeadlineSetting::from_json_value(key, value).unwrap_or_else(|e| {
                rejected.push(e);
                None
            });
            match key {
                GENERAL_USER_COMPLIANCE_DEADLINE => raw.general_deadline = setting,
                ELEVATED_PRIVILEGE_USER_COMPLIANCE_DEADLINE => raw.elevated_privilege_deadline = setting,
                _ => raw.staff_deadline = setting,
            }
        }

        Ok((raw, rejected))
    }

    /// Read settings through `lookup`.
    ///
    /// The JSON document under [`ROLLOUT_CONFIG_ENV`] is the base; individual
    /// keys override it. Unusable values are reported and skipped.
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<ConfigParseError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        let base = match lookup(ROLLOUT_CONFIG_ENV) {
            Some(doc) if !doc.trim().is_empty() => match Self::from_json(&doc) {
                Ok((base, mut bad_keys)) => {
                    rejected.append(&mut bad_keys);
                    base
                }
                Err(e) => {
                    rejected.push(e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };

        let enforce_on_login = lookup(ENFORCE_COMPLIANCE_ON_LOGIN).and_then(|raw| {
            flag_from_str(raw).unwrap_or_else(|e| {
                rejected.push(e);
                None
            })
        });

        let overrides = Self {
            enforce_on_login,
            general_deadline: lookup(GENERAL_USER_COMPLIANCE_DEADLINE).map(DeadlineSetting::Text),
            elevated_privilege_deadline: lookup(ELEVATED_PRIVILEGE_USER_COMPLIANCE_DEADLINE)
                .map(DeadlineSetting::Text),
            staff_deadline: lookup(STAFF_USER_COMPLIANCE_DEADLINE).map(DeadlineSetting::Text),
        };

        for e in &rejected {
            e.report();
        }

        (base.overlay(overrides), rejected)
    }

    pub fn from_env() -> (Self, Vec<ConfigParseError>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Blank text counts as unset
fn flag_from_str(raw: String) -> Result<Option<bool>, ConfigParseError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_flag(&raw).map(Some).ok_or(ConfigParseError::InvalidFlag {
        key: ENFORCE_COMPLIANCE_ON_LOGIN,
        raw_value: raw,
    })
}

fn flag_from_json(value: &Value) -> Result<Option<bool>, ConfigParseError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(*flag)),
        Value::String(text) => flag_from_str(text.clone()),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(Some(false)),
        Value::Number(n) if n.as_u64() == Some(1) => Ok(Some(true)),
        other => Err(ConfigParseError::InvalidFlag {
            key: ENFORCE_COMPLIANCE_ON_LOGIN,
            raw_value: other.to_string(),
        }),
    }
}

// ============================================================================
// ROLLOUT CONFIG
// ============================================================================

/// Parsed rollout configuration. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutConfig {
    /// Applies to every user
    pub general_deadline: Option<DateTime<Utc>>,
    /// Users with at least one access grant; falls back to `general_deadline`
    pub elevated_privilege_deadline: Option<DateTime<Utc>>,
    /// Staff users; falls back to the elevated deadline
    pub staff_deadline: Option<DateTime<Utc>>,
    /// Caller-side kill switch
    pub enforce_on_login: bool,
}

/// A config together with the settings that were dropped while building it
#[derive(Debug, Clone, Default)]
pub struct LoadedRolloutConfig {
    pub config: RolloutConfig,
    pub rejected: Vec<ConfigParseError>,
}

impl RolloutConfig {
    /// Parse every deadline in `raw`. A malformed deadline becomes `None`
    /// and is logged once under its key.
    pub fn from_raw(raw: &RawRolloutConfig) -> LoadedRolloutConfig {
        let mut rejected = Vec::new();

        let mut parse = |key: &'static str, setting: &Option<DeadlineSetting>| {
            let setting = setting.as_ref()?;
            setting.resolve().unwrap_or_else(|source| {
                let e = ConfigParseError::InvalidDeadline { key, source };
                e.report();
                rejected.push(e);
                None
            })
        };

        let staff_deadline = parse(STAFF_USER_COMPLIANCE_DEADLINE, &raw.staff_deadline);
        let elevated_privilege_deadline = parse(
            ELEVATED_PRIVILEGE_USER_COMPLIANCE_DEADLINE,
            &raw.elevated_privilege_deadline,
        );
        let general_deadline = parse(GENERAL_USER_COMPLIANCE_DEADLINE, &raw.general_deadline);

        LoadedRolloutConfig {
            config: RolloutConfig {
                general_deadline,
                elevated_privilege_deadline,
                staff_deadline,
                enforce_on_login: raw.enforce_on_login.unwrap_or(false),
            },
            rejected,
        }
    }

    /// Build from a string map, e.g. a settings file section
    pub fn from_map(map: &HashMap<String, String>) -> LoadedRolloutConfig {
        Self::load_with(|key| map.get(key).cloned())
    }

    pub fn from_env() -> LoadedRolloutConfig {
        Self::load_with(|key| std::env::var(key).ok())
    }

    fn load_with<F>(lookup: F) -> LoadedRolloutConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let (raw, mut rejected) = RawRolloutConfig::from_lookup(lookup);
        let mut loaded = Self::from_raw(&raw);
        rejected.append(&mut loaded.rejected);
        loaded.rejected = rejected;
        loaded
    }

    pub fn has_any_deadline(&self) -> bool {
        self.general_deadline.is_some()
            || self.elevated_privilege_deadline.is_some()
            || self.staff_deadline.is_some()
    }
}

// ============================================================================
// RELOADABLE HANDLE
// ============================================================================

/// Process-wide rollout config, replaced as a whole on reload.
///
/// Readers take a snapshot with [`current`](Self::current) and keep using it
/// for the whole evaluation.
pub struct RolloutConfigHandle {
    inner: ArcSwap<RolloutConfig>,
}

impl RolloutConfigHandle {
    pub fn new(config: RolloutConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(config),
        }
    }

    pub fn current(&self) -> Arc<RolloutConfig> {
        self.inner.load_full()
    }

    pub fn replace(&self, config: RolloutConfig) {
        self.inner.store(Arc::new(config));
    }

    /// Re-read the environment and publish the result
    pub fn reload_from_env(&self) -> Vec<ConfigParseError> {
        let loaded = RolloutConfig::from_env();
        self.replace(loaded.config);
        tracing::info!(rejected = loaded.rejected.len(), "Password policy rollout config reloaded");
        loaded.rejected
    }
}

impl Default for RolloutConfigHandle {
    fn default() -> Self {
        Self::new(RolloutConfig::default())
    }
}

impl std::fmt::Debug for RolloutConfigHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RolloutConfigHandle").field(&*self.current()).finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn text(s: &str) -> Option<DeadlineSetting> {
        Some(DeadlineSetting::Text(s.to_string()))
    }

    #[test]
    fn test_parse_deadline_formats() {
        let expected = utc(2018, 3, 3);
        assert_eq!(parse_deadline("2018-03-03T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_deadline("2018-03-03 00:00:00+00:00").unwrap(), expected);
        assert_eq!(parse_deadline("2018-03-03T02:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_deadline("2018-03-03 00:00:00").unwrap(), expected);
        assert_eq!(parse_deadline("2018-03-03").unwrap(), expected);
        assert_eq!(parse_deadline("2018-03-03T00:00:00.000").unwrap(), expected);
        assert_eq!(parse_deadline("2018-03-03 00:00:00.000000").unwrap(), expected);
        assert_eq!(parse_deadline("2018-03-03 00:00:00.000+00:00").unwrap(), expected);
        assert_eq!(parse_deadline("  2018-03-03  ").unwrap(), expected);
    }

    #[test]
    fn test_parse_deadline_rejects_garbage() {
        let err = parse_deadline("foo").unwrap_err();
        assert_eq!(err.raw_value, "foo");
        assert!(parse_deadline("2018-13-45").is_err());
    }

    #[test]
    fn test_misconfigured_deadline_is_dropped_and_reported_once() {
        let raw = RawRolloutConfig {
            staff_deadline: text("foo"),
            general_deadline: text("2018-03-03 00:00:00+00:00"),
            ..Default::default()
        };

        let loaded = RolloutConfig::from_raw(&raw);

        assert_eq!(loaded.rejected.len(), 1);
        assert_eq!(loaded.rejected[0].key(), STAFF_USER_COMPLIANCE_DEADLINE);
        assert_eq!(loaded.rejected[0].raw_value(), "foo");
        assert!(loaded.config.staff_deadline.is_none());
        assert_eq!(loaded.config.general_deadline, Some(utc(2018, 3, 3)));
    }

    #[test]
    fn test_blank_deadline_is_unset_without_diagnostic() {
        let raw = RawRolloutConfig {
            general_deadline: text("   "),
            ..Default::default()
        };
        let loaded = RolloutConfig::from_raw(&raw);
        assert!(loaded.rejected.is_empty());
        assert!(!loaded.config.has_any_deadline());
    }

    #[test]
    fn test_unix_deadline() {
        let raw = RawRolloutConfig {
            general_deadline: Some(DeadlineSetting::Unix(1_520_035_200)),
            ..Default::default()
        };
        let loaded = RolloutConfig::from_raw(&raw);
        assert_eq!(loaded.config.general_deadline, Some(utc(2018, 3, 3)));
    }

    #[test]
    fn test_json_document() {
        let (raw, rejected) = RawRolloutConfig::from_json(
            r#"{
                "ENFORCE_COMPLIANCE_ON_LOGIN": true,
                "GENERAL_USER_COMPLIANCE_DEADLINE": "2018-03-03T00:00:00Z",
                "STAFF_USER_COMPLIANCE_DEADLINE": null,
                "SOMETHING_ELSE": 42
            }"#,
        )
        .unwrap();

        assert!(rejected.is_empty());
        assert_eq!(raw.enforce_on_login, Some(true));
        assert_eq!(raw.general_deadline, text("2018-03-03T00:00:00Z"));
        assert!(raw.staff_deadline.is_none());
    }

    #[test]
    fn test_env_tokens_override_document() {
        let mut vars = HashMap::new();
        vars.insert(
            ROLLOUT_CONFIG_ENV.to_string(),
            r#"{"ENFORCE_COMPLIANCE_ON_LOGIN": false,
                "GENERAL_USER_COMPLIANCE_DEADLINE": "2018-03-03",
                "STAFF_USER_COMPLIANCE_DEADLINE": "2018-02-01"}"#
                .to_string(),
        );
        vars.insert(ENFORCE_COMPLIANCE_ON_LOGIN.to_string(), "true".to_string());
        vars.insert(GENERAL_USER_COMPLIANCE_DEADLINE.to_string(), "2019-01-01".to_string());

        let loaded = RolloutConfig::from_map(&vars);

        assert!(loaded.rejected.is_empty());
        assert!(loaded.config.enforce_on_login);
        assert_eq!(loaded.config.general_deadline, Some(utc(2019, 1, 1)));
        assert_eq!(loaded.config.staff_deadline, Some(utc(2018, 2, 1)));
        assert!(loaded.config.elevated_privilege_deadline.is_none());
    }

    #[test]
    fn test_bad_document_and_flag_are_soft_failures() {
        let mut vars = HashMap::new();
        vars.insert(ROLLOUT_CONFIG_ENV.to_string(), "{not json".to_string());
        vars.insert(ENFORCE_COMPLIANCE_ON_LOGIN.to_string(), "maybe".to_string());
        vars.insert(GENERAL_USER_COMPLIANCE_DEADLINE.to_string(), "2018-03-03".to_string());

        let loaded = RolloutConfig::from_map(&vars);

        assert_eq!(loaded.rejected.len(), 2);
        assert_eq!(loaded.rejected[0].key(), ROLLOUT_CONFIG_ENV);
        assert_eq!(loaded.rejected[1].key(), ENFORCE_COMPLIANCE_ON_LOGIN);
        assert!(!loaded.config.enforce_on_login);
        assert_eq!(loaded.config.general_deadline, Some(utc(2018, 3, 3)));
    }

    #[test]
    fn test_wrongly_typed_document_deadline_drops_only_that_key() {
        let mut vars = HashMap::new();
        vars.insert(
            ROLLOUT_CONFIG_ENV.to_string(),
            r#"{"ENFORCE_COMPLIANCE_ON_LOGIN": true,
                "GENERAL_USER_COMPLIANCE_DEADLINE": "2018-03-03",
                "STAFF_USER_COMPLIANCE_DEADLINE": 2018.5,
                "ELEVATED_PRIVILEGE_USER_COMPLIANCE_DEADLINE": false}"#
                .to_string(),
        );

        let loaded = RolloutConfig::from_map(&vars);

        assert!(loaded.config.enforce_on_login);
        assert_eq!(loaded.config.general_deadline, Some(utc(2018, 3, 3)));
        assert!(loaded.config.staff_deadline.is_none());
        assert!(loaded.config.elevated_privilege_deadline.is_none());

        let keys: Vec<_> = loaded.rejected.iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec![ELEVATED_PRIVILEGE_USER_COMPLIANCE_DEADLINE, STAFF_USER_COMPLIANCE_DEADLINE]);
        assert_eq!(loaded.rejected[1].raw_value(), "2018.5");
    }

    #[test]
    fn test_document_flag_as_string() {
        let mut vars = HashMap::new();
        vars.insert(
            ROLLOUT_CONFIG_ENV.to_string(),
            r#"{"ENFORCE_COMPLIANCE_ON_LOGIN": "true",
                "GENERAL_USER_COMPLIANCE_DEADLINE": "2018-03-03"}"#
                .to_string(),
        );

        let loaded = RolloutConfig::from_map(&vars);
        assert!(loaded.rejected.is_empty());
        assert!(loaded.config.enforce_on_login);
        assert_eq!(loaded.config.general_deadline, Some(utc(2018, 3, 3)));
    }

    #[test]
    fn test_unusable_document_flag_keeps_deadlines() {
        let (raw, rejected) = RawRolloutConfig::from_json(
            r#"{"ENFORCE_COMPLIANCE_ON_LOGIN": "sometimes",
                "GENERAL_USER_COMPLIANCE_DEADLINE": "2018-03-03"}"#,
        )
        .unwrap();

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].key(), ENFORCE_COMPLIANCE_ON_LOGIN);
        assert_eq!(rejected[0].raw_value(), "sometimes");
        assert!(raw.enforce_on_login.is_none());
        assert_eq!(raw.general_deadline, text("2018-03-03"));
    }

    #[test]
    fn test_non_object_document_is_rejected_whole() {
        let err = RawRolloutConfig::from_json("[1, 2]").unwrap_err();
        assert_eq!(err.key(), ROLLOUT_CONFIG_ENV);
        assert!(matches!(err, ConfigParseError::InvalidDocument(_)));
    }

    #[test]
    fn test_blank_env_flag_does_not_override_document() {
        let mut vars = HashMap::new();
        vars.insert(
            ROLLOUT_CONFIG_ENV.to_string(),
            r#"{"ENFORCE_COMPLIANCE_ON_LOGIN": true}"#.to_string(),
        );
        vars.insert(ENFORCE_COMPLIANCE_ON_LOGIN.to_string(), "  ".to_string());

        let loaded = RolloutConfig::from_map(&vars);
        assert!(loaded.rejected.is_empty());
        assert!(loaded.config.enforce_on_login);
    }

    #[test]
    fn test_enforcement_defaults_off() {
        let loaded = RolloutConfig::from_map(&HashMap::new());
        assert!(!loaded.config.enforce_on_login);
        assert!(loaded.rejected.is_empty());
    }

    #[test]
    fn test_handle_replace_is_visible_to_new_readers() {
        let handle = RolloutConfigHandle::default();
        let before = handle.current();

        handle.replace(RolloutConfig {
            general_deadline: Some(utc(2018, 3, 3)),
            enforce_on_login: true,
            ..Default::default()
        });

        // Old snapshot is untouched
        assert!(!before.enforce_on_login);
        assert!(handle.current().enforce_on_login);
        assert_eq!(handle.current().general_deadline, Some(utc(2018, 3, 3)));
    }
}
