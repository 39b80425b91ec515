//! Module Catalog
//!
//! Business modules grouped by tier, plus the always-on and RBAC-only sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::error::AccessError;

/// Commercial tier a module belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleTier {
    Core,
    Extended,
    Advanced,
    System,
}

impl ModuleTier {
    pub const ALL: [ModuleTier; 4] = [
        ModuleTier::Core,
        ModuleTier::Extended,
        ModuleTier::Advanced,
        ModuleTier::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleTier::Core => "core",
            ModuleTier::Extended => "extended",
            ModuleTier::Advanced => "advanced",
            ModuleTier::System => "system",
        }
    }
}

impl fmt::Display for ModuleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleTier {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ModuleTier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == normalized)
            .ok_or_else(|| AccessError::UnknownTier(s.to_string()))
    }
}

/// ERP business modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    // Core
    Crm,
    Sales,
    Finance,
    Inventory,
    Procurement,

    // Extended
    Hr,
    Manufacturing,
    Service,
    Projects,
    Marketing,

    // Advanced
    Analytics,
    Ai,
    Integrations,
    Workflow,

    // System
    Email,
    Dashboard,
    Settings,
    Admin,
    Organization,
    User,
}

/// Modules that are usable regardless of stored entitlement status
pub const ALWAYS_ON_MODULES: &[&str] = &["email", "dashboard"];

/// Modules gated by role alone; entitlements are never consulted
pub const RBAC_ONLY_MODULES: &[&str] = &["settings", "admin", "organization", "user"];

impl Module {
    pub const ALL: [Module; 20] = [
        Module::Crm,
        Module::Sales,
        Module::Finance,
        Module::Inventory,
        Module::Procurement,
        Module::Hr,
        Module::Manufacturing,
        Module::Service,
        Module::Projects,
        Module::Marketing,
        Module::Analytics,
        Module::Ai,
        Module::Integrations,
        Module::Workflow,
        Module::Email,
        Module::Dashboard,
        Module::Settings,
        Module::Admin,
        Module::Organization,
        Module::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Crm => "crm",
            Module::Sales => "sales",
            Module::Finance => "finance",
            Module::Inventory => "inventory",
            Module::Procurement => "procurement",
            Module::Hr => "hr",
            Module::Manufacturing => "manufacturing",
            Module::Service => "service",
            Module::Projects => "projects",
            Module::Marketing => "marketing",
            Module::Analytics => "analytics",
            Module::Ai => "ai",
            Module::Integrations => "integrations",
            Module::Workflow => "workflow",
            Module::Email => "email",
            Module::Dashboard => "dashboard",
            Module::Settings => "settings",
            Module::Admin => "admin",
            Module::Organization => "organization",
            Module::User => "user",
        }
    }

    pub fn tier(&self) -> ModuleTier {
        match self {
            Module::Crm | Module::Sales | Module::Finance | Module::Inventory | Module::Procurement => {
                ModuleTier::Core
            }
            Module::Hr | Module::Manufacturing | Module::Service | Module::Projects | Module::Marketing => {
                ModuleTier::Extended
            }
            Module::Analytics | Module::Ai | Module::Integrations | Module::Workflow => ModuleTier::Advanced,
            Module::Email
            | Module::Dashboard
            | Module::Settings
            | Module::Admin
            | Module::Organization
            | Module::User => ModuleTier::System,
        }
    }

    pub fn is_always_on(&self) -> bool {
        ALWAYS_ON_MODULES.contains(&self.as_str())
    }

    pub fn is_rbac_only(&self) -> bool {
        RBAC_ONLY_MODULES.contains(&self.as_str())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Module::ALL
            .into_iter()
            .find(|module| module.as_str() == normalized)
            .ok_or_else(|| AccessError::UnknownModule(s.to_string()))
    }
}

/// Case-insensitive membership in the always-on set
pub fn is_always_on(module_key: &str) -> bool {
    let key = module_key.to_lowercase();
    ALWAYS_ON_MODULES.contains(&key.as_str())
}

/// Case-insensitive membership in the RBAC-only set
pub fn is_rbac_only(module_key: &str) -> bool {
    let key = module_key.to_lowercase();
    RBAC_ONLY_MODULES.contains(&key.as_str())
}

pub fn modules_in_tier(tier: ModuleTier) -> Vec<Module> {
    Module::ALL.into_iter().filter(|m| m.tier() == tier).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_on_case_insensitive() {
        assert!(is_always_on("Email"));
        assert!(is_always_on("DASHBOARD"));
        assert!(!is_always_on("crm"));
        assert!(!is_always_on(""));
    }

    #[test]
    fn test_rbac_only_case_insensitive() {
        assert!(is_rbac_only("Settings"));
        assert!(is_rbac_only("admin"));
        assert!(is_rbac_only("Organization"));
        assert!(is_rbac_only("USER"));
        assert!(!is_rbac_only("email"));
        assert!(!is_rbac_only("finance"));
    }

    #[test]
    fn test_special_sets_are_system_tier() {
        for module in Module::ALL {
            if module.is_always_on() || module.is_rbac_only() {
                assert_eq!(module.tier(), ModuleTier::System);
            }
            assert!(!(module.is_always_on() && module.is_rbac_only()));
        }
    }

    #[test]
    fn test_tiers_partition_catalog() {
        let total: usize = ModuleTier::ALL.iter().map(|t| modules_in_tier(*t).len()).sum();
        assert_eq!(total, Module::ALL.len());
        assert_eq!(modules_in_tier(ModuleTier::Core).len(), 5);
        assert!(modules_in_tier(ModuleTier::Advanced).contains(&Module::Analytics));
    }

    #[test]
    fn test_parse_module() {
        assert_eq!("HR".parse::<Module>().unwrap(), Module::Hr);
        assert_eq!("manufacturing".parse::<Module>().unwrap(), Module::Manufacturing);
        assert!("payroll".parse::<Module>().is_err());
        assert_eq!("Extended".parse::<ModuleTier>().unwrap(), ModuleTier::Extended);
    }
}
