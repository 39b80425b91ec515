//! Enforcement Message Catalog
//!
//! User-facing text for each denial, tagged with the layer that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layer of the access check that produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementLevel {
    Tenant,
    Entitlement,
    Rbac,
}

impl EnforcementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementLevel::Tenant => "tenant",
            EnforcementLevel::Entitlement => "entitlement",
            EnforcementLevel::Rbac => "rbac",
        }
    }
}

impl fmt::Display for EnforcementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnforcementLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tenant" => Ok(EnforcementLevel::Tenant),
            "entitlement" => Ok(EnforcementLevel::Entitlement),
            "rbac" => Ok(EnforcementLevel::Rbac),
            other => Err(format!("unknown enforcement level: {}", other)),
        }
    }
}

/// Why an access check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    TenantMismatch,
    TenantMissing,
    EntitlementDisabled,
    TrialExpired,
    ModuleNotFound,
    PermissionDenied,
    InsufficientRole,
    RoleHierarchy,
}

impl FailureCategory {
    pub fn level(&self) -> EnforcementLevel {
        match self {
            FailureCategory::TenantMismatch | FailureCategory::TenantMissing => EnforcementLevel::Tenant,
            FailureCategory::EntitlementDisabled
            | FailureCategory::TrialExpired
            | FailureCategory::ModuleNotFound => EnforcementLevel::Entitlement,
            FailureCategory::PermissionDenied
            | FailureCategory::InsufficientRole
            | FailureCategory::RoleHierarchy => EnforcementLevel::Rbac,
        }
    }

    /// Render the message, interpolating the module or permission name where
    /// the category has a template. Templates fall back to a generic noun when
    /// no subject is given.
    pub fn message(&self, subject: Option<&str>) -> String {
        match self {
            FailureCategory::TenantMismatch => {
                "Access denied: the requested resource belongs to a different organization.".to_string()
            }
            FailureCategory::TenantMissing => {
                "Access denied: no organization context is associated with this request.".to_string()
            }
            FailureCategory::EntitlementDisabled => format!(
                "The {} module is not enabled for your organization. Contact your administrator to upgrade your plan.",
                subject.unwrap_or("requested")
            ),
            FailureCategory::TrialExpired => format!(
                "The trial period for the {} module has expired. Upgrade your plan to continue using it.",
                subject.unwrap_or("requested")
            ),
            FailureCategory::ModuleNotFound => format!(
                "The module '{}' does not exist.",
                subject.unwrap_or("unknown")
            ),
            FailureCategory::PermissionDenied => format!(
                "You do not have permission to perform this action ({}).",
                subject.unwrap_or("unspecified permission")
            ),
            FailureCategory::InsufficientRole => {
                "Your role does not allow access to this area.".to_string()
            }
            FailureCategory::RoleHierarchy => format!(
                "You cannot manage users with the {} role.",
                subject.unwrap_or("target")
            ),
        }
    }
}
