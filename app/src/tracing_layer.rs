// In app/src/tracing_layer.rs

use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber: a formatted stderr layer filtered at `log_level`.
///
/// Output goes to stderr so that command results on stdout stay machine-readable.
pub fn init(log_level: &str) -> Result<()> {
    let level = Level::from_str(log_level)
        .with_context(|| format!("Invalid log level '{log_level}'"))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("options::implied", Level::DEBUG)
                .with_default(level),
        );
    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;
    Ok(())
}
