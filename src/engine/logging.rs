//! Tracing subscriber setup for the CLI.
//!
//! The library only emits events; binaries decide where they go.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static LOG_INIT: OnceLock<()> = OnceLock::new();

/// Install a stderr fmt subscriber. `RUST_LOG` wins over `default_level`.
/// Safe to call more than once.
pub fn init_logging(default_level: &str) {
    LOG_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
