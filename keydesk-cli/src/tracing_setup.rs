//! Tracing setup for the keydesk binary
//!
//! Usage:
//!   keydesk --debug                  # Debug logging to console
//!   RUST_LOG=keydesk=debug keydesk   # Fine-grained log control

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Initialize console tracing with an environment-driven filter.
pub fn init_tracing(debug: bool) -> Result<()> {
    let filter = if debug {
        // Debug mode: set debug level unless RUST_LOG is explicitly set
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug) // Show targets in debug mode
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
