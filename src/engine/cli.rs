//! erpgate CLI Module
//! Command-line interface for inspecting and exercising the access model

pub mod formatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::config::CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(name = "erpgate")]
#[command(author = "erpgate Team")]
#[command(version)]
#[command(about = "Tenant, entitlement and role checks for a multi-tenant ERP", long_about = None)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Output format (json for scripting)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create erpgate.config.json and a default entitlement policy
    Init {
        /// Organization ID
        #[arg(short, long)]
        org: String,

        /// Display name of the organization
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List roles with their ranks
    Roles,

    /// Show the rank of a role (0 when unrecognized)
    Rank {
        role: String,
    },

    /// Check whether one role may manage another
    CanManage {
        manager: String,
        target: String,
    },

    /// List the module catalog
    Modules {
        /// Only show one tier (core, extended, advanced, system)
        #[arg(short, long)]
        tier: Option<String>,
    },

    /// Evaluate an entitlement status against the current time
    Entitlement {
        /// enabled, disabled, trial or unknown
        #[arg(short, long)]
        status: String,

        /// Trial expiry (RFC 3339 or YYYY-MM-DD)
        #[arg(short, long)]
        expiry: Option<String>,
    },

    /// Compose a permission key from a named pattern
    Permission {
        /// Pattern name, e.g. moduleRead or submoduleAccess
        pattern: String,

        /// Identifiers for the pattern
        args: Vec<String>,
    },

    /// Run a layered access check against the project policy
    Check {
        /// Organization of the caller
        #[arg(long)]
        org: String,

        /// Role of the caller
        #[arg(short, long)]
        role: String,

        /// Module being accessed
        #[arg(short, long)]
        module: String,

        /// Permission keys held by the caller
        #[arg(long = "grant")]
        grants: Vec<String>,

        /// Permission key the action requires
        #[arg(long)]
        require: Option<String>,

        /// Role of the user being managed
        #[arg(long)]
        target_role: Option<String>,

        /// Caller user ID, recorded in the audit log
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Entitlement policy management
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },

    /// Show recorded denials
    Audit {
        /// Only show one enforcement level (tenant, entitlement, rbac)
        #[arg(short, long)]
        level: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PolicyAction {
    /// Show module entitlements
    Show,

    /// Enable a module
    Enable {
        module: String,
    },

    /// Disable a module
    Disable {
        module: String,
    },

    /// Start a trial for a module
    Trial {
        module: String,

        /// Trial length in days; omit for an open trial
        #[arg(short, long)]
        days: Option<i64>,
    },
}

impl Cli {
    /// Explicit --project, else the current directory when it holds a
    /// config, else the per-user config directory
    pub fn get_project_dir(&self) -> PathBuf {
        if let Some(project) = &self.project {
            return project.clone();
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        if cwd.join(CONFIG_FILE).exists() {
            return cwd;
        }
        dirs::config_dir()
            .map(|dir| dir.join("erpgate"))
            .unwrap_or(cwd)
    }
}
