//! Audit Module
//!
//! Append-only record of access decisions

pub mod audit;

pub use audit::{AuditLog, DecisionEntry, AUDIT_VERSION};
