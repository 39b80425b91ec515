//! Entitlement Evaluator
//!
//! Decides whether an organization may use a module right now, from the
//! stored status and an optional trial expiry.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::modules::Module;
use crate::engine::error::{AccessError, Result};

/// Stored entitlement status for a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntitlementStatus {
    Enabled,
    Disabled,
    Trial,
    /// Anything the backend sent that is not a known status
    Unknown,
}

impl EntitlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementStatus::Enabled => "enabled",
            EntitlementStatus::Disabled => "disabled",
            EntitlementStatus::Trial => "trial",
            EntitlementStatus::Unknown => "unknown",
        }
    }

    /// Lenient parse: unrecognized input becomes `Unknown`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" => EntitlementStatus::Enabled,
            "disabled" => EntitlementStatus::Disabled,
            "trial" => EntitlementStatus::Trial,
            _ => EntitlementStatus::Unknown,
        }
    }

    /// Strict parse for operator input
    pub fn parse_strict(s: &str) -> Result<Self> {
        match Self::parse_lenient(s) {
            EntitlementStatus::Unknown if !s.trim().eq_ignore_ascii_case("unknown") => {
                Err(AccessError::UnknownStatus(s.to_string()))
            }
            status => Ok(status),
        }
    }
}

impl From<String> for EntitlementStatus {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl From<EntitlementStatus> for String {
    fn from(status: EntitlementStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for EntitlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trial expiry as supplied by the caller: already parsed, or raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialExpiry {
    Instant(DateTime<Utc>),
    Text(String),
}

impl TrialExpiry {
    /// Normalize to an instant. Text is tried as RFC 3339, then as a naive
    /// UTC datetime, then as a bare date at midnight UTC.
    pub fn resolve(&self) -> Result<DateTime<Utc>> {
        match self {
            TrialExpiry::Instant(at) => Ok(*at),
            TrialExpiry::Text(raw) => parse_expiry(raw),
        }
    }
}

impl From<DateTime<Utc>> for TrialExpiry {
    fn from(at: DateTime<Utc>) -> Self {
        TrialExpiry::Instant(at)
    }
}

impl From<&str> for TrialExpiry {
    fn from(raw: &str) -> Self {
        TrialExpiry::Text(raw.to_string())
    }
}

impl From<String> for TrialExpiry {
    fn from(raw: String) -> Self {
        TrialExpiry::Text(raw)
    }
}

pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(AccessError::InvalidExpiry(raw.to_string()))
}

/// Expiry instant for a trial of `days` starting at `now`. Negative lengths
/// and lengths past the representable date range are rejected.
pub fn trial_expiry_after(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    if days < 0 {
        return Err(AccessError::InvalidTrialLength(days));
    }
    Duration::try_days(days)
        .and_then(|length| now.checked_add_signed(length))
        .ok_or(AccessError::InvalidTrialLength(days))
}

/// Whether a module with this status is usable at `now`.
///
/// Enabled is always usable. A trial is usable while its expiry is strictly
/// after `now`, or indefinitely when no expiry is recorded. Disabled and
/// unknown statuses are never usable. An expiry that cannot be parsed never
/// lies after `now`, so such a trial is not usable.
pub fn is_module_enabled(
    status: EntitlementStatus,
    trial_expiry: Option<&TrialExpiry>,
    now: DateTime<Utc>,
) -> bool {
    match status {
        EntitlementStatus::Enabled => true,
        EntitlementStatus::Trial => match trial_expiry {
            None => true,
            Some(expiry) => match expiry.resolve() {
                Ok(expires_at) => expires_at > now,
                Err(err) => {
                    warn!(error = %err, "unparseable trial expiry, treating trial as expired");
                    false
                }
            },
        },
        EntitlementStatus::Disabled | EntitlementStatus::Unknown => false,
    }
}

pub fn is_module_enabled_now(status: EntitlementStatus, trial_expiry: Option<&TrialExpiry>) -> bool {
    is_module_enabled(status, trial_expiry, Utc::now())
}

/// Per-organization entitlement record for one module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntitlement {
    pub module: Module,
    pub status: EntitlementStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_expires_at: Option<DateTime<Utc>>,
}

impl ModuleEntitlement {
    pub fn enabled(module: Module) -> Self {
        Self {
            module,
            status: EntitlementStatus::Enabled,
            trial_expires_at: None,
        }
    }

    pub fn disabled(module: Module) -> Self {
        Self {
            module,
            status: EntitlementStatus::Disabled,
            trial_expires_at: None,
        }
    }

    pub fn trial(module: Module, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            module,
            status: EntitlementStatus::Trial,
            trial_expires_at: expires_at,
        }
    }

    pub fn is_enabled_at(&self, now: DateTime<Utc>) -> bool {
        let expiry = self.trial_expires_at.map(TrialExpiry::Instant);
        is_module_enabled(self.status, expiry.as_ref(), now)
    }

    /// True for a trial whose expiry has passed
    pub fn is_expired_trial_at(&self, now: DateTime<Utc>) -> bool {
        self.status == EntitlementStatus::Trial && !self.is_enabled_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_enabled_ignores_expiry() {
        let now = fixed_now();
        let past = TrialExpiry::from("2001-01-01");
        assert!(is_module_enabled(EntitlementStatus::Enabled, None, now));
        assert!(is_module_enabled(EntitlementStatus::Enabled, Some(&past), now));
    }

    #[test]
    fn test_open_trial() {
        assert!(is_module_enabled(EntitlementStatus::Trial, None, fixed_now()));
    }

    #[test]
    fn test_trial_expiry_strings() {
        let now = fixed_now();
        let future = TrialExpiry::from("2026-07-01T00:00:00Z");
        let past = TrialExpiry::from("2026-05-01T00:00:00Z");
        assert!(is_module_enabled(EntitlementStatus::Trial, Some(&future), now));
        assert!(!is_module_enabled(EntitlementStatus::Trial, Some(&past), now));
    }

    #[test]
    fn test_trial_expiry_is_strict() {
        let now = fixed_now();
        let exactly_now = TrialExpiry::Instant(now);
        let one_second_later = TrialExpiry::Instant(now + Duration::seconds(1));
        assert!(!is_module_enabled(EntitlementStatus::Trial, Some(&exactly_now), now));
        assert!(is_module_enabled(EntitlementStatus::Trial, Some(&one_second_later), now));
    }

    #[test]
    fn test_disabled_and_unknown_deny() {
        let now = fixed_now();
        let future = TrialExpiry::from("2099-01-01");
        assert!(!is_module_enabled(EntitlementStatus::Disabled, None, now));
        assert!(!is_module_enabled(EntitlementStatus::Disabled, Some(&future), now));
        assert!(!is_module_enabled(EntitlementStatus::Unknown, Some(&future), now));
    }

    #[test]
    fn test_unparseable_expiry_denies() {
        let garbage = TrialExpiry::from("next tuesday");
        assert!(!is_module_enabled(EntitlementStatus::Trial, Some(&garbage), fixed_now()));
    }

    #[test]
    fn test_parse_expiry_formats() {
        let midnight = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_expiry("2026-03-15").unwrap(), midnight);
        assert_eq!(parse_expiry("2026-03-15T00:00:00").unwrap(), midnight);
        assert_eq!(parse_expiry("2026-03-15T02:00:00+02:00").unwrap(), midnight);
        assert!(parse_expiry("15/03/2026").is_err());
    }

    #[test]
    fn test_trial_expiry_after() {
        let now = fixed_now();
        assert_eq!(trial_expiry_after(now, 14).unwrap(), now + Duration::days(14));
        assert_eq!(trial_expiry_after(now, 0).unwrap(), now);
        assert!(matches!(trial_expiry_after(now, -1), Err(AccessError::InvalidTrialLength(-1))));
        assert!(trial_expiry_after(now, 200_000_000).is_err());
        assert!(trial_expiry_after(now, i64::MAX).is_err());
    }

    #[test]
    fn test_status_serde_is_lenient() {
        let status: EntitlementStatus = serde_json::from_str("\"TRIAL\"").unwrap();
        assert_eq!(status, EntitlementStatus::Trial);
        let status: EntitlementStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(status, EntitlementStatus::Unknown);
        assert_eq!(serde_json::to_string(&EntitlementStatus::Enabled).unwrap(), "\"enabled\"");
        assert!(EntitlementStatus::parse_strict("suspended").is_err());
        assert_eq!(EntitlementStatus::parse_strict("unknown").unwrap(), EntitlementStatus::Unknown);
    }

    #[test]
    fn test_record_evaluation_is_repeatable() {
        let now = fixed_now();
        let record = ModuleEntitlement::trial(Module::Analytics, Some(now - Duration::days(1)));
        assert_eq!(record.is_enabled_at(now), record.is_enabled_at(now));
        assert!(record.is_expired_trial_at(now));
        assert!(!ModuleEntitlement::disabled(Module::Hr).is_expired_trial_at(now));
    }
}
