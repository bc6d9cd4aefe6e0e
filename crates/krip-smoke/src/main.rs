//! `krip-smoke`: exercises the krip API once against the real providers.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from `KRIP_*` environment variables.
//! 2. Initialise JSON logging, with the enclosing span list on every event.
//! 3. Encrypt and decrypt the configured value, generate a key, hash a value.

mod config;
mod smoke;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        eprintln!("ERROR: krip-smoke configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    init_tracing(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 3. Smoke run
    // -----------------------------------------------------------------------
    smoke::run(&cfg).await
}

/// One JSON line per event. `RUST_LOG` overrides `KRIP_LOG_LEVEL`; the krip
/// library's `debug!` pipeline steps appear once either allows `krip=debug`.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid KRIP_LOG_LEVEL {log_level:?}"))?,
    };

    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_current_span(false)
        .with_span_list(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already set: {e}"))
}
