//! Access Error Types

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Unknown module tier: {0}")]
    UnknownTier(String),

    #[error("Unknown entitlement status: {0}")]
    UnknownStatus(String),

    #[error("Policy version {found} is newer than supported {supported}")]
    UnsupportedPolicyVersion {
        found: u32,
        supported: u32,
    },

    #[error("Invalid trial expiry: {0}")]
    InvalidExpiry(String),

    #[error("Invalid trial length: {0} day(s)")]
    InvalidTrialLength(i64),
}

pub type Result<T> = std::result::Result<T, AccessError>;
