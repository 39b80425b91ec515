//! Permission String Composer
//!
//! Canonical permission keys matched against the permission list returned by
//! the authorization backend:
//!
//! - `{module}.{action}` for CRUD-style actions
//! - `{module}_admin` for module administration
//! - `{module}_{submodule}_access` and `{module}_{submodule}_manage`
//!
//! Template functions never validate their inputs. An empty identifier yields
//! a malformed key, never a panic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Grants every permission
pub const WILDCARD: &str = "*";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Unknown permission pattern: {0}")]
    UnknownPattern(String),

    #[error("Pattern {pattern} expects {expected} argument(s), got {found}")]
    ArityMismatch {
        pattern: &'static str,
        expected: usize,
        found: usize,
    },
}

pub fn module_permission(module: &str, action: &str) -> String {
    format!("{}.{}", module, action)
}

pub fn module_create(module: &str) -> String {
    module_permission(module, "create")
}

pub fn module_read(module: &str) -> String {
    module_permission(module, "read")
}

pub fn module_update(module: &str) -> String {
    module_permission(module, "update")
}

pub fn module_delete(module: &str) -> String {
    module_permission(module, "delete")
}

pub fn module_admin(module: &str) -> String {
    format!("{}_admin", module)
}

pub fn submodule_access(module: &str, submodule: &str) -> String {
    format!("{}_{}_access", module, submodule)
}

pub fn submodule_manage(module: &str, submodule: &str) -> String {
    format!("{}_{}_manage", module, submodule)
}

/// Module a permission key belongs to: the text before the first `.` or `_`
pub fn permission_module(key: &str) -> &str {
    key.split(['.', '_']).next().unwrap_or_default()
}

/// Named permission templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionPattern {
    ModuleCreate,
    ModuleRead,
    ModuleUpdate,
    ModuleDelete,
    ModuleAction,
    ModuleAdmin,
    SubmoduleAccess,
    SubmoduleManage,
}

impl PermissionPattern {
    pub const ALL: [PermissionPattern; 8] = [
        PermissionPattern::ModuleCreate,
        PermissionPattern::ModuleRead,
        PermissionPattern::ModuleUpdate,
        PermissionPattern::ModuleDelete,
        PermissionPattern::ModuleAction,
        PermissionPattern::ModuleAdmin,
        PermissionPattern::SubmoduleAccess,
        PermissionPattern::SubmoduleManage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PermissionPattern::ModuleCreate => "moduleCreate",
            PermissionPattern::ModuleRead => "moduleRead",
            PermissionPattern::ModuleUpdate => "moduleUpdate",
            PermissionPattern::ModuleDelete => "moduleDelete",
            PermissionPattern::ModuleAction => "moduleAction",
            PermissionPattern::ModuleAdmin => "moduleAdmin",
            PermissionPattern::SubmoduleAccess => "submoduleAccess",
            PermissionPattern::SubmoduleManage => "submoduleManage",
        }
    }

    /// Number of identifiers the template takes
    pub fn arity(&self) -> usize {
        match self {
            PermissionPattern::ModuleCreate
            | PermissionPattern::ModuleRead
            | PermissionPattern::ModuleUpdate
            | PermissionPattern::ModuleDelete
            | PermissionPattern::ModuleAdmin => 1,
            PermissionPattern::ModuleAction
            | PermissionPattern::SubmoduleAccess
            | PermissionPattern::SubmoduleManage => 2,
        }
    }

    /// Compose with an exact argument count
    pub fn compose(&self, args: &[&str]) -> Result<String, PermissionError> {
        if args.len() != self.arity() {
            return Err(PermissionError::ArityMismatch {
                pattern: self.name(),
                expected: self.arity(),
                found: args.len(),
            });
        }
        Ok(self.render(args))
    }

    /// Compose without checking arity; missing identifiers render empty
    fn render(&self, args: &[&str]) -> String {
        let first = args.first().copied().unwrap_or_default();
        let second = args.get(1).copied().unwrap_or_default();
        match self {
            PermissionPattern::ModuleCreate => module_create(first),
            PermissionPattern::ModuleRead => module_read(first),
            PermissionPattern::ModuleUpdate => module_update(first),
            PermissionPattern::ModuleDelete => module_delete(first),
            PermissionPattern::ModuleAction => module_permission(first, second),
            PermissionPattern::ModuleAdmin => module_admin(first),
            PermissionPattern::SubmoduleAccess => submodule_access(first, second),
            PermissionPattern::SubmoduleManage => submodule_manage(first, second),
        }
    }
}

impl fmt::Display for PermissionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PermissionPattern {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionPattern::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| PermissionError::UnknownPattern(s.to_string()))
    }
}

/// Strict dispatcher: unknown names and wrong arity are errors
pub fn try_format_permission(pattern_name: &str, args: &[&str]) -> Result<String, PermissionError> {
    pattern_name.parse::<PermissionPattern>()?.compose(args)
}

/// Lenient dispatcher kept for untyped call sites.
///
/// An unknown pattern name yields an empty string and a warning; missing
/// arguments render as empty identifiers.
pub fn format_permission(pattern_name: &str, args: &[&str]) -> String {
    match pattern_name.parse::<PermissionPattern>() {
        Ok(pattern) => pattern.render(args),
        Err(_) => {
            warn!(pattern = pattern_name, "unknown permission pattern, composing empty key");
            String::new()
        }
    }
}

/// Permission keys granted to a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    keys: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    pub fn revoke(&mut self, key: &str) -> bool {
        self.keys.remove(key)
    }

    /// Exact key, global wildcard, or `{module}.*` for dotted keys
    pub fn contains(&self, key: &str) -> bool {
        if self.keys.contains(key) || self.keys.contains(WILDCARD) {
            return true;
        }
        match key.split_once('.') {
            Some((module, _)) => self.keys.contains(&format!("{}.*", module)),
            None => false,
        }
    }

    pub fn has_module_admin(&self, module: &str) -> bool {
        self.contains(&module_admin(module))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates() {
        assert_eq!(module_read("sales"), "sales.read");
        assert_eq!(module_delete("crm"), "crm.delete");
        assert_eq!(module_permission("finance", "approve"), "finance.approve");
        assert_eq!(module_admin("hr"), "hr_admin");
        assert_eq!(submodule_access("hr", "payroll"), "hr_payroll_access");
        assert_eq!(submodule_manage("inventory", "warehouse"), "inventory_warehouse_manage");
    }

    #[test]
    fn test_permission_module() {
        assert_eq!(permission_module("finance.delete"), "finance");
        assert_eq!(permission_module("hr_payroll_access"), "hr");
        assert_eq!(permission_module("crm_admin"), "crm");
        assert_eq!(permission_module("*"), "*");
        assert_eq!(permission_module(""), "");
    }

    #[test]
    fn test_empty_identifiers_do_not_panic() {
        assert_eq!(module_read(""), ".read");
        assert_eq!(submodule_access("", ""), "__access");
    }

    #[test]
    fn test_format_permission_dispatch() {
        assert_eq!(format_permission("moduleRead", &["sales"]), "sales.read");
        assert_eq!(format_permission("submoduleAccess", &["hr", "payroll"]), "hr_payroll_access");
        assert_eq!(format_permission("doesNotExist", &[]), "");
        assert_eq!(format_permission("moduleAdmin", &[]), "_admin");
        // case matters for pattern names
        assert_eq!(format_permission("moduleread", &["sales"]), "");
    }

    #[test]
    fn test_strict_dispatch() {
        assert_eq!(try_format_permission("moduleUpdate", &["crm"]).unwrap(), "crm.update");
        assert_eq!(
            try_format_permission("doesNotExist", &["crm"]),
            Err(PermissionError::UnknownPattern("doesNotExist".to_string()))
        );
        assert_eq!(
            try_format_permission("submoduleManage", &["hr"]),
            Err(PermissionError::ArityMismatch {
                pattern: "submoduleManage",
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn test_pattern_names_round_trip() {
        for pattern in PermissionPattern::ALL {
            assert_eq!(pattern.name().parse::<PermissionPattern>().unwrap(), pattern);
        }
    }

    #[test]
    fn test_permission_set_matching() {
        let perms: PermissionSet = ["sales.read", "crm.*", "hr_admin"].into_iter().collect();
        assert!(perms.contains("sales.read"));
        assert!(!perms.contains("sales.delete"));
        assert!(perms.contains("crm.delete"));
        assert!(perms.has_module_admin("hr"));
        assert!(!perms.has_module_admin("crm"));

        let all: PermissionSet = [WILDCARD].into_iter().collect();
        assert!(all.contains("finance_ledger_manage"));
    }
}
