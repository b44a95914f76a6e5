//! Tracing setup

use anyhow::{anyhow, Result};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global fmt subscriber
///
/// `level` is a filter directive such as `"info"` or `"sinew_core=debug"`;
/// `RUST_LOG` takes precedence when set. Calling this again is a no-op.
pub fn init_tracing(level: &str) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    let _ = INIT.set(());
    Ok(())
}

/// Test logging at debug level, captured per test (called once per test run)
#[cfg(test)]
pub(crate) fn init_test_logging() {
    static TEST_INIT: std::sync::Once = std::sync::Once::new();
    TEST_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("sinew_core=debug"))
            .with_test_writer()
            .try_init();
    });
}
