//! erpgate Configuration Module
//! Handles loading and validating erpgate.config.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::cache::{AccessCache, MODULE_STATUS_TTL, USER_PERMISSIONS_TTL};

pub const CONFIG_FILE: &str = "erpgate.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Invalid config format: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    pub organization: OrganizationConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Locations relative to the project directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_policy_dir")]
    pub policy_dir: PathBuf,
    #[serde(default = "default_audit_dir")]
    pub audit_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: u64,
    #[serde(default = "default_permissions_ttl")]
    pub permissions_ttl_secs: u64,
    #[serde(default = "default_module_status_ttl")]
    pub module_status_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_policy_dir() -> PathBuf {
    PathBuf::from("./access")
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from("./audit")
}

fn default_capacity() -> u64 {
    10_000
}

fn default_permissions_ttl() -> u64 {
    USER_PERMISSIONS_TTL.as_secs()
}

fn default_module_status_ttl() -> u64 {
    MODULE_STATUS_TTL.as_secs()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            policy_dir: default_policy_dir(),
            audit_dir: default_audit_dir(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            permissions_ttl_secs: default_permissions_ttl(),
            module_status_ttl_secs: default_module_status_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path));
        }
        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, project_dir: &Path) -> Result<(), ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn default_for_org(org_id: &str) -> Self {
        Self {
            version: "0.1.0".to_string(),
            organization: OrganizationConfig {
                id: org_id.to_string(),
                name: None,
            },
            paths: PathsConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn policy_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.policy_dir)
    }

    pub fn audit_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.audit_dir)
    }

    pub fn build_cache(&self) -> AccessCache {
        AccessCache::with_ttls(
            self.cache.capacity,
            Duration::from_secs(self.cache.permissions_ttl_secs),
            Duration::from_secs(self.cache.module_status_ttl_secs),
        )
    }
}
