//! Organization Entitlement Policy
//!
//! Version-safe per-organization document listing which modules the
//! organization's subscription covers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use super::entitlement::{EntitlementStatus, ModuleEntitlement};
use super::modules::{Module, ModuleTier};
use crate::engine::error::{AccessError, Result};

/// Current policy schema version
pub const POLICY_VERSION: u32 = 1;

pub const POLICY_FILE: &str = "entitlements.json";

/// The entitlement document for one organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgPolicy {
    /// Schema version for compatibility
    pub version: u32,

    pub organization_id: String,

    /// Subscription plan label, informational only
    #[serde(default)]
    pub plan: Option<String>,

    pub entitlements: Vec<ModuleEntitlement>,
}

impl OrgPolicy {
    /// Default policy: core tier enabled, every other entitlement-gated
    /// module disabled
    pub fn new(organization_id: &str) -> Self {
        let entitlements = Module::ALL
            .into_iter()
            .filter(|m| !m.is_rbac_only() && !m.is_always_on())
            .map(|m| {
                if m.tier() == ModuleTier::Core {
                    ModuleEntitlement::enabled(m)
                } else {
                    ModuleEntitlement::disabled(m)
                }
            })
            .collect();

        Self {
            version: POLICY_VERSION,
            organization_id: organization_id.to_string(),
            plan: None,
            entitlements,
        }
    }

    /// Load policy from a directory; a missing file yields the default policy
    pub fn load(dir: &Path, organization_id: &str) -> Result<Self> {
        let policy_path = dir.join(POLICY_FILE);

        if !policy_path.exists() {
            return Ok(Self::new(organization_id));
        }

        let content = fs::read_to_string(&policy_path)?;
        let policy: OrgPolicy = serde_json::from_str(&content)?;

        if policy.version > POLICY_VERSION {
            return Err(AccessError::UnsupportedPolicyVersion {
                found: policy.version,
                supported: POLICY_VERSION,
            });
        }

        Ok(policy)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(POLICY_FILE), content)?;
        Ok(())
    }

    pub fn entitlement_for(&self, module: Module) -> Option<&ModuleEntitlement> {
        self.entitlements.iter().find(|e| e.module == module)
    }

    /// Replace the record for the entitlement's module
    pub fn set_entitlement(&mut self, entitlement: ModuleEntitlement) {
        info!(
            organization = %self.organization_id,
            module = %entitlement.module,
            status = %entitlement.status,
            "entitlement updated"
        );
        self.entitlements.retain(|e| e.module != entitlement.module);
        self.entitlements.push(entitlement);
    }

    pub fn set_status(&mut self, module: Module, status: EntitlementStatus) {
        self.set_entitlement(ModuleEntitlement {
            module,
            status,
            trial_expires_at: None,
        });
    }

    pub fn start_trial(&mut self, module: Module, expires_at: Option<DateTime<Utc>>) {
        self.set_entitlement(ModuleEntitlement::trial(module, expires_at));
    }

    /// Whether the organization may use the module at `now`.
    ///
    /// Always-on and RBAC-only modules pass without reading any record. A
    /// gated module with no record is not enabled.
    pub fn module_enabled_at(&self, module: Module, now: DateTime<Utc>) -> bool {
        if module.is_rbac_only() || module.is_always_on() {
            return true;
        }
        self.entitlement_for(module)
            .map(|e| e.is_enabled_at(now))
            .unwrap_or(false)
    }

    /// Modules currently usable, in catalog order
    pub fn enabled_modules_at(&self, now: DateTime<Utc>) -> Vec<Module> {
        Module::ALL
            .into_iter()
            .filter(|m| self.module_enabled_at(*m, now))
            .collect()
    }
}
