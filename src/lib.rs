//! erpgate - Tenant, entitlement and role-based access model for a
//! multi-tenant ERP
//!
//! Every check is a pure function over compile-time tables plus the caller's
//! clock. Requests pass through three layers in order: tenant isolation,
//! module entitlement, then role-based access control.

pub mod engine;

pub use engine::rbac::{
    can_manage, format_permission, is_always_on, is_module_enabled, is_module_enabled_now,
    is_org_admin, is_rbac_only, is_super_admin, rank_of, try_format_permission, AccessRequest,
    AuthContext, AuthResult, EnforcementLevel, Enforcer, EntitlementStatus, FailureCategory,
    Module, ModuleEntitlement, ModuleTier, OrgPolicy, PermissionPattern, PermissionSet, Role,
    TrialExpiry,
};
