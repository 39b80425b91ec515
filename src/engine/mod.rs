// erpgate Engine - Core module structure
pub mod error;
pub mod config;
pub mod rbac;
pub mod cache;
pub mod audit;
pub mod logging;
pub mod cli;

pub use config::Config;
pub use error::{AccessError, Result};
pub use rbac::{Enforcer, OrgPolicy};
