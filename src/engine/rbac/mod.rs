//! RBAC Module
//!
//! Tenant isolation, module entitlements and role-based access control

pub mod roles;
pub mod modules;
pub mod entitlement;
pub mod permissions;
pub mod messages;
pub mod policy;
pub mod enforcer;

pub use roles::{Role, rank_of, can_manage, is_super_admin, is_org_admin};
pub use modules::{Module, ModuleTier, is_always_on, is_rbac_only};
pub use entitlement::{EntitlementStatus, ModuleEntitlement, TrialExpiry, is_module_enabled, is_module_enabled_now};
pub use permissions::{PermissionError, PermissionPattern, PermissionSet, format_permission, try_format_permission};
pub use messages::{EnforcementLevel, FailureCategory};
pub use policy::{OrgPolicy, POLICY_VERSION};
pub use enforcer::{Enforcer, AuthContext, AccessRequest, AuthResult};
