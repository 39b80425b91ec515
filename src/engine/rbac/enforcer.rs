//! RBAC Enforcement Layer
//!
//! Tenant, entitlement and role checks run in that order; the first failing
//! layer decides the denial.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::messages::{EnforcementLevel, FailureCategory};
use super::modules::{self, Module};
use super::permissions::{permission_module, PermissionSet};
use super::policy::OrgPolicy;
use super::roles::{self, Role};

/// Who is asking
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    /// Raw role identifier; unrecognized values rank 0
    pub role: String,
    pub permissions: PermissionSet,
}

impl AuthContext {
    /// Create a context with no organization and no privileges
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            organization_id: None,
            role: String::new(),
            permissions: PermissionSet::new(),
        }
    }

    pub fn new(user_id: Option<String>, organization_id: &str, role: &str) -> Self {
        Self {
            user_id,
            organization_id: Some(organization_id.to_string()),
            role: role.to_string(),
            permissions: PermissionSet::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }
}

/// What is being asked for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub organization_id: String,
    pub module: String,
    #[serde(default)]
    pub permission: Option<String>,
    /// Role of the user being managed, for user-administration actions
    #[serde(default)]
    pub target_role: Option<String>,
}

impl AccessRequest {
    pub fn new(organization_id: &str, module: &str) -> Self {
        Self {
            organization_id: organization_id.to_string(),
            module: module.to_string(),
            permission: None,
            target_role: None,
        }
    }

    pub fn requiring(mut self, permission: &str) -> Self {
        self.permission = Some(permission.to_string());
        self
    }

    pub fn managing(mut self, target_role: &str) -> Self {
        self.target_role = Some(target_role.to_string());
        self
    }
}

/// Authorization result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<EnforcementLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AuthResult {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            level: None,
            category: None,
            reason: None,
        }
    }

    pub fn deny(category: FailureCategory, subject: Option<&str>) -> Self {
        Self {
            allowed: false,
            level: Some(category.level()),
            category: Some(category),
            reason: Some(category.message(subject)),
        }
    }
}

/// The enforcement engine
pub struct Enforcer<'a> {
    policy: &'a OrgPolicy,
}

impl<'a> Enforcer<'a> {
    pub fn new(policy: &'a OrgPolicy) -> Self {
        Self { policy }
    }

    pub fn authorize(&self, context: &AuthContext, request: &AccessRequest) -> AuthResult {
        self.authorize_at(context, request, Utc::now())
    }

    /// Run all layers against a fixed evaluation instant
    pub fn authorize_at(
        &self,
        context: &AuthContext,
        request: &AccessRequest,
        now: DateTime<Utc>,
    ) -> AuthResult {
        let result = self
            .check_tenant(context, request)
            .or_else(|| self.check_entitlement(request, now))
            .or_else(|| self.check_rbac(context, request))
            .unwrap_or_else(AuthResult::allow);

        if let Some(level) = result.level {
            debug!(
                user = context.user_id.as_deref().unwrap_or("-"),
                organization = %request.organization_id,
                module = %request.module,
                level = %level,
                "access denied"
            );
        }
        result
    }

    /// Tenant layer: the caller, the request and the loaded policy must all
    /// name the same organization
    pub fn check_tenant(&self, context: &AuthContext, request: &AccessRequest) -> Option<AuthResult> {
        let org = match context.organization_id.as_deref() {
            Some(org) if !org.is_empty() => org,
            _ => return Some(AuthResult::deny(FailureCategory::TenantMissing, None)),
        };

        if org != request.organization_id || self.policy.organization_id != request.organization_id {
            return Some(AuthResult::deny(FailureCategory::TenantMismatch, None));
        }
        None
    }

    /// Entitlement layer; RBAC-only modules never reach the policy records
    pub fn check_entitlement(&self, request: &AccessRequest, now: DateTime<Utc>) -> Option<AuthResult> {
        if modules::is_rbac_only(&request.module) {
            return None;
        }

        let module: Module = match request.module.parse() {
            Ok(module) => module,
            Err(_) => {
                return Some(AuthResult::deny(
                    FailureCategory::ModuleNotFound,
                    Some(request.module.as_str()),
                ))
            }
        };

        if self.policy.module_enabled_at(module, now) {
            return None;
        }

        let expired_trial = self
            .policy
            .entitlement_for(module)
            .map(|e| e.is_expired_trial_at(now))
            .unwrap_or(false);
        let category = if expired_trial {
            FailureCategory::TrialExpired
        } else {
            FailureCategory::EntitlementDisabled
        };
        Some(AuthResult::deny(category, Some(module.as_str())))
    }

    /// Role layer.
    ///
    /// Super admins skip the permission check. Otherwise a required
    /// permission is satisfied by the key itself, a wildcard, the admin key of
    /// the module the permission belongs to, or an org-admin role on an
    /// RBAC-only module. The target-role check applies to every role.
    /// Unrecognized roles are rejected outright.
    pub fn check_rbac(&self, context: &AuthContext, request: &AccessRequest) -> Option<AuthResult> {
        let Ok(role) = context.role.parse::<Role>() else {
            warn!(role = %context.role, "unrecognized role in access context");
            return Some(AuthResult::deny(FailureCategory::InsufficientRole, None));
        };

        let required = request.permission.as_deref();
        if let Some(permission) = required.filter(|_| !role.is_super_admin()) {
            let granted = context.permissions.contains(permission)
                || context.permissions.has_module_admin(permission_module(permission))
                || (role.is_org_admin() && modules::is_rbac_only(&request.module));
            if !granted {
                return Some(AuthResult::deny(FailureCategory::PermissionDenied, Some(permission)));
            }
        }

        if let Some(target) = request.target_role.as_deref() {
            if !roles::can_manage(role.as_str(), target) {
                return Some(AuthResult::deny(FailureCategory::RoleHierarchy, Some(target)));
            }
        }

        None
    }
}
