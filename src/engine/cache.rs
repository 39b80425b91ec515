//! Access Cache
//!
//! Cache keys, TTLs and header names shared by code that consumes permission
//! and entitlement lookups, plus an in-process cache honouring those TTLs.

use moka::sync::Cache;
use std::time::Duration;

use super::rbac::modules::Module;
use super::rbac::permissions::PermissionSet;

pub const USER_PERMISSIONS_TTL: Duration = Duration::from_secs(5 * 60);
pub const USER_ROLES_TTL: Duration = Duration::from_secs(5 * 60);
pub const ORG_ENTITLEMENTS_TTL: Duration = Duration::from_secs(10 * 60);
pub const MODULE_STATUS_TTL: Duration = Duration::from_secs(10 * 60);

pub const HEADER_ORGANIZATION_ID: &str = "X-Organization-ID";
pub const HEADER_USER_ID: &str = "X-User-ID";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

pub fn user_permissions_key(user_id: &str) -> String {
    format!("user_permissions_{}", user_id)
}

pub fn user_roles_key(user_id: &str) -> String {
    format!("user_roles_{}", user_id)
}

pub fn org_entitlements_key(org_id: &str) -> String {
    format!("org_entitlements_{}", org_id)
}

pub fn module_status_key(org_id: &str, module: &str) -> String {
    format!("module_status_{}_{}", org_id, module)
}

/// In-memory cache for user permission sets and per-organization module
/// status, each with its own TTL
#[derive(Debug, Clone)]
pub struct AccessCache {
    permissions: Cache<String, PermissionSet>,
    module_status: Cache<String, bool>,
}

impl AccessCache {
    pub fn new(capacity: u64) -> Self {
        Self::with_ttls(capacity, USER_PERMISSIONS_TTL, MODULE_STATUS_TTL)
    }

    pub fn with_ttls(capacity: u64, permissions_ttl: Duration, module_status_ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            permissions: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(permissions_ttl)
                .build(),
            module_status: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(module_status_ttl)
                .build(),
        }
    }

    pub fn get_permissions(&self, user_id: &str) -> Option<PermissionSet> {
        self.permissions.get(&user_permissions_key(user_id))
    }

    pub fn put_permissions(&self, user_id: &str, permissions: PermissionSet) {
        self.permissions.insert(user_permissions_key(user_id), permissions);
    }

    pub fn get_module_status(&self, org_id: &str, module: Module) -> Option<bool> {
        self.module_status.get(&module_status_key(org_id, module.as_str()))
    }

    pub fn put_module_status(&self, org_id: &str, module: Module, enabled: bool) {
        self.module_status
            .insert(module_status_key(org_id, module.as_str()), enabled);
    }

    /// Cached status, or compute and remember it
    pub fn module_status_or_insert_with<F>(&self, org_id: &str, module: Module, compute: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        self.module_status
            .get_with(module_status_key(org_id, module.as_str()), compute)
    }

    pub fn invalidate_user(&self, user_id: &str) {
        self.permissions.invalidate(&user_permissions_key(user_id));
    }

    /// Drop every module status cached for an organization
    pub fn invalidate_org(&self, org_id: &str) {
        for module in Module::ALL {
            self.module_status
                .invalidate(&module_status_key(org_id, module.as_str()));
        }
    }
}

impl Default for AccessCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys() {
        assert_eq!(user_permissions_key("42"), "user_permissions_42");
        assert_eq!(user_roles_key("42"), "user_roles_42");
        assert_eq!(org_entitlements_key("acme"), "org_entitlements_acme");
        assert_eq!(module_status_key("acme", "crm"), "module_status_acme_crm");
    }

    #[test]
    fn test_ttls() {
        assert_eq!(USER_PERMISSIONS_TTL.as_secs(), 300);
        assert_eq!(USER_ROLES_TTL.as_secs(), 300);
        assert_eq!(ORG_ENTITLEMENTS_TTL.as_secs(), 600);
        assert_eq!(MODULE_STATUS_TTL.as_secs(), 600);
    }

    #[test]
    fn test_permissions_round_trip_and_invalidate() {
        let cache = AccessCache::default();
        let perms: PermissionSet = ["sales.read"].into_iter().collect();
        cache.put_permissions("u-1", perms.clone());
        assert_eq!(cache.get_permissions("u-1"), Some(perms));

        cache.invalidate_user("u-1");
        assert!(cache.get_permissions("u-1").is_none());
    }

    #[test]
    fn test_module_status_is_tenant_scoped() {
        let cache = AccessCache::default();
        cache.put_module_status("org-a", Module::Hr, true);
        assert_eq!(cache.get_module_status("org-a", Module::Hr), Some(true));
        assert_eq!(cache.get_module_status("org-b", Module::Hr), None);

        cache.invalidate_org("org-a");
        assert_eq!(cache.get_module_status("org-a", Module::Hr), None);
    }

    #[test]
    fn test_compute_once() {
        let cache = AccessCache::default();
        assert!(cache.module_status_or_insert_with("org-a", Module::Crm, || true));
        // cached value wins over a different computation
        assert!(cache.module_status_or_insert_with("org-a", Module::Crm, || false));
    }
}
