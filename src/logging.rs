//! Diagnostic logging to stderr.
//!
//! User-facing output goes through [`crate::console::Console`]; this is
//! for fetch failures, untranslatable labels and the like. `RUST_LOG`
//! overrides the default filter.

use anyhow::Context as _;

/// Installs the global subscriber. `debug` lowers the default level.
pub fn init(debug: bool) -> anyhow::Result<()> {
    let default = if debug { "booknote=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
