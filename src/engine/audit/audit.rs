//! Decision Audit Log
//!
//! Append-only, line-delimited JSON record of access denials

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::engine::error::Result;
use crate::engine::rbac::enforcer::{AccessRequest, AuthContext, AuthResult};
use crate::engine::rbac::messages::{EnforcementLevel, FailureCategory};

/// Current audit log format version
pub const AUDIT_VERSION: u32 = 1;

pub const AUDIT_FILE: &str = "decisions.jsonl";

/// A single recorded decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionEntry {
    /// Format version for compatibility
    pub version: u32,

    pub id: String,

    pub timestamp: DateTime<Utc>,

    pub organization_id: String,

    pub module: String,

    /// User that made the request
    pub actor: Option<String>,

    pub role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    pub allowed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<EnforcementLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DecisionEntry {
    pub fn new(context: &AuthContext, request: &AccessRequest, result: &AuthResult) -> Self {
        Self {
            version: AUDIT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            organization_id: request.organization_id.clone(),
            module: request.module.clone(),
            actor: context.user_id.clone(),
            role: context.role.clone(),
            permission: request.permission.clone(),
            allowed: result.allowed,
            level: result.level,
            category: result.category,
            reason: result.reason.clone(),
        }
    }
}

/// The audit log manager
pub struct AuditLog {
    log_path: PathBuf,
}

impl AuditLog {
    /// Create a new audit log under a directory
    pub fn new(audit_dir: &Path) -> Result<Self> {
        fs::create_dir_all(audit_dir)?;
        Ok(Self {
            log_path: audit_dir.join(AUDIT_FILE),
        })
    }

    pub fn append(&self, entry: &DecisionEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        let line = serde_json::to_string(entry)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Record the decision only when it is a denial; returns whether an entry
    /// was written
    pub fn record_denial(
        &self,
        context: &AuthContext,
        request: &AccessRequest,
        result: &AuthResult,
    ) -> Result<bool> {
        if result.allowed {
            return Ok(false);
        }
        self.append(&DecisionEntry::new(context, request, result))?;
        Ok(true)
    }

    pub fn query_all(&self) -> Result<Vec<DecisionEntry>> {
        if !self.log_path.exists() {
            return Ok(vec![]);
        }

        let file = fs::File::open(&self.log_path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: DecisionEntry = serde_json::from_str(&line)?;

            // Entries written by newer formats are skipped
            if entry.version <= AUDIT_VERSION {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    pub fn query_by_level(&self, level: EnforcementLevel) -> Result<Vec<DecisionEntry>> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|e| e.level == Some(level))
            .collect())
    }

    pub fn query_by_organization(&self, organization_id: &str) -> Result<Vec<DecisionEntry>> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|e| e.organization_id == organization_id)
            .collect())
    }

    /// Number of readable entries, consistent with `query_all`
    pub fn count(&self) -> Result<usize> {
        Ok(self.query_all()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn denial() -> (AuthContext, AccessRequest, AuthResult) {
        let ctx = AuthContext::new(Some("u-9".to_string()), "org-1", "user");
        let req = AccessRequest::new("org-1", "finance").requiring("finance.delete");
        let result = AuthResult::deny(FailureCategory::PermissionDenied, Some("finance.delete"));
        (ctx, req, result)
    }

    #[test]
    fn test_audit_log_append_query() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path()).unwrap();
        let (ctx, req, result) = denial();

        assert!(log.record_denial(&ctx, &req, &result).unwrap());
        assert!(!log.record_denial(&ctx, &req, &AuthResult::allow()).unwrap());

        let entries = log.query_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].module, "finance");
        assert_eq!(entries[0].actor.as_deref(), Some("u-9"));
        assert_eq!(log.count().unwrap(), 1);
    }

    #[test]
    fn test_query_filters() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path()).unwrap();
        let (ctx, req, result) = denial();
        log.record_denial(&ctx, &req, &result).unwrap();

        let tenant = AuthResult::deny(FailureCategory::TenantMismatch, None);
        let other_req = AccessRequest::new("org-2", "crm");
        log.record_denial(&ctx, &other_req, &tenant).unwrap();

        assert_eq!(log.query_by_level(EnforcementLevel::Rbac).unwrap().len(), 1);
        assert_eq!(log.query_by_level(EnforcementLevel::Tenant).unwrap().len(), 1);
        assert_eq!(log.query_by_level(EnforcementLevel::Entitlement).unwrap().len(), 0);
        assert_eq!(log.query_by_organization("org-2").unwrap().len(), 1);
    }

    #[test]
    fn test_count_skips_blank_and_newer_entries() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path()).unwrap();
        let (ctx, req, result) = denial();
        log.record_denial(&ctx, &req, &result).unwrap();

        let mut future = DecisionEntry::new(&ctx, &req, &result);
        future.version = AUDIT_VERSION + 1;
        log.append(&future).unwrap();
        fs::write(
            dir.path().join(AUDIT_FILE),
            format!("{}\n\n", fs::read_to_string(dir.path().join(AUDIT_FILE)).unwrap()),
        )
        .unwrap();

        assert_eq!(log.query_all().unwrap().len(), 1);
        assert_eq!(log.count().unwrap(), 1);
    }

    #[test]
    fn test_empty_log() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(&dir.path().join("nested")).unwrap();
        assert!(log.query_all().unwrap().is_empty());
        assert_eq!(log.count().unwrap(), 0);
    }
}
