use chrono::{Duration, TimeZone, Utc};
use erpgate_lib::engine::audit::AuditLog;
use erpgate_lib::engine::cache::AccessCache;
use erpgate_lib::engine::config::Config;
use erpgate_lib::{
    can_manage, format_permission, is_always_on, is_module_enabled, is_rbac_only, rank_of,
    AccessRequest, AuthContext, EnforcementLevel, Enforcer, EntitlementStatus, FailureCategory,
    Module, OrgPolicy, PermissionSet, TrialExpiry,
};

#[test]
fn test_manager_hierarchy_scenario() {
    assert_eq!(rank_of("manager"), 50);
    assert_eq!(rank_of("executive"), 30);
    assert!(can_manage("manager", "executive"));
    assert!(!can_manage("manager", "admin"));
}

#[test]
fn test_pure_functions_are_repeatable() {
    let now = Utc.with_ymd_and_hms(2026, 1, 10, 9, 30, 0).unwrap();
    let expiry = TrialExpiry::from("2026-01-10T09:30:01Z");

    for _ in 0..2 {
        assert_eq!(rank_of("admin"), 80);
        assert!(is_module_enabled(EntitlementStatus::Trial, Some(&expiry), now));
        assert_eq!(format_permission("moduleRead", &["sales"]), "sales.read");
        assert!(is_always_on("Email"));
        assert!(is_rbac_only("Settings"));
    }
}

#[test]
fn test_trial_dates_relative_to_clock() {
    let future = (Utc::now() + Duration::days(30)).to_rfc3339();
    let past = (Utc::now() - Duration::days(30)).to_rfc3339();
    assert!(erpgate_lib::is_module_enabled_now(
        EntitlementStatus::Trial,
        Some(&TrialExpiry::from(future))
    ));
    assert!(!erpgate_lib::is_module_enabled_now(
        EntitlementStatus::Trial,
        Some(&TrialExpiry::from(past))
    ));
    assert!(erpgate_lib::is_module_enabled_now(EntitlementStatus::Trial, None));
}

#[test]
fn test_project_check_records_denials() -> Result<(), Box<dyn std::error::Error>> {
    let project = tempfile::tempdir()?;
    let config = Config::default_for_org("acme");
    config.save(project.path())?;

    let now = Utc::now();
    let mut policy = OrgPolicy::new("acme");
    policy.start_trial(Module::Analytics, Some(now - Duration::hours(1)));
    policy.set_status(Module::Dashboard, EntitlementStatus::Disabled);
    policy.save(&config.policy_dir(project.path()))?;

    let loaded = OrgPolicy::load(&config.policy_dir(project.path()), "acme")?;
    let enforcer = Enforcer::new(&loaded);
    let audit = AuditLog::new(&config.audit_dir(project.path()))?;

    let analyst = AuthContext::new(Some("u-7".to_string()), "acme", "executive")
        .with_permissions(["analytics.read", "dashboard.read"].into_iter().collect::<PermissionSet>());

    // expired trial
    let request = AccessRequest::new("acme", "analytics").requiring("analytics.read");
    let result = enforcer.authorize_at(&analyst, &request, now);
    assert_eq!(result.category, Some(FailureCategory::TrialExpired));
    assert_eq!(result.level, Some(EnforcementLevel::Entitlement));
    audit.record_denial(&analyst, &request, &result)?;

    // always-on module ignores its disabled record
    let request = AccessRequest::new("acme", "Dashboard").requiring("dashboard.read");
    let result = enforcer.authorize_at(&analyst, &request, now);
    assert!(result.allowed);
    audit.record_denial(&analyst, &request, &result)?;

    // another tenant's request never reaches the entitlement layer
    let request = AccessRequest::new("globex", "crm");
    let result = enforcer.authorize_at(&analyst, &request, now);
    assert_eq!(result.category, Some(FailureCategory::TenantMismatch));
    audit.record_denial(&analyst, &request, &result)?;

    let entries = audit.query_all()?;
    assert_eq!(entries.len(), 2);
    assert_eq!(audit.query_by_level(EnforcementLevel::Tenant)?.len(), 1);
    assert!(entries.iter().all(|e| !e.allowed));
    Ok(())
}

#[test]
fn test_cache_wraps_policy_lookup() {
    let policy = OrgPolicy::new("acme");
    let cache = Config::default_for_org("acme").build_cache();
    let now = Utc::now();

    let hr = cache.module_status_or_insert_with("acme", Module::Hr, || {
        policy.module_enabled_at(Module::Hr, now)
    });
    assert!(!hr);
    assert_eq!(cache.get_module_status("acme", Module::Hr), Some(false));

    let default_cache = AccessCache::default();
    assert_eq!(default_cache.get_module_status("acme", Module::Hr), None);
}
