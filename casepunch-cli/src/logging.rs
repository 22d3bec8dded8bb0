use anyhow::Result;
use std::env;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `LOG_LEVEL` picks the base level, `RUST_LOG`
/// directives still apply on top.
pub fn init_logging(verbose: bool) -> Result<()> {
    let log_level = env::var("LOG_LEVEL")
        .map(|level| parse_level(&level))
        .unwrap_or(if verbose { Level::DEBUG } else { Level::INFO });

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(())
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}
