//! Role Registry
//!
//! Closed role set with fixed ranks. Higher rank means more privilege.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::engine::error::AccessError;

/// ERP user roles, most privileged first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Management,
    Manager,
    Executive,
    User,
}

/// Roles that administer the whole platform
const SUPER_ADMIN_ROLES: &[Role] = &[Role::SuperAdmin];

/// Roles that administer a single organization
const ORG_ADMIN_ROLES: &[Role] = &[Role::Admin, Role::Management];

impl Role {
    pub const ALL: [Role; 6] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Management,
        Role::Manager,
        Role::Executive,
        Role::User,
    ];

    pub fn rank(&self) -> u8 {
        match self {
            Role::SuperAdmin => 100,
            Role::Admin => 80,
            Role::Management => 70,
            Role::Manager => 50,
            Role::Executive => 30,
            Role::User => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Management => "management",
            Role::Manager => "manager",
            Role::Executive => "executive",
            Role::User => "user",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
            Role::Management => "Management",
            Role::Manager => "Manager",
            Role::Executive => "Executive",
            Role::User => "User",
        }
    }

    /// Strict comparison: peers of equal rank cannot manage each other
    pub fn can_manage(&self, target: Role) -> bool {
        self.rank() > target.rank()
    }

    pub fn is_super_admin(&self) -> bool {
        SUPER_ADMIN_ROLES.contains(self)
    }

    pub fn is_org_admin(&self) -> bool {
        ORG_ADMIN_ROLES.contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| AccessError::UnknownRole(s.to_string()))
    }
}

/// Rank for a role identifier.
///
/// Unrecognized identifiers get rank 0, the lowest privilege. The fallback is
/// reported through `tracing` so misspelled role data is visible in logs.
pub fn rank_of(role: &str) -> u8 {
    match role.parse::<Role>() {
        Ok(role) => role.rank(),
        Err(_) => {
            warn!(role, "unrecognized role, treating as rank 0");
            0
        }
    }
}

pub fn can_manage(manager_role: &str, target_role: &str) -> bool {
    rank_of(manager_role) > rank_of(target_role)
}

pub fn is_super_admin(role: &str) -> bool {
    role.parse::<Role>().map(|r| r.is_super_admin()).unwrap_or(false)
}

pub fn is_org_admin(role: &str) -> bool {
    role.parse::<Role>().map(|r| r.is_org_admin()).unwrap_or(false)
}
