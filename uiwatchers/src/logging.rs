//! Process-wide log output for binaries and test harnesses embedding the watchers.

use std::env;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Variable naming the default verbosity. `RUST_LOG` directives still apply on top.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Install a stderr fmt subscriber at the level named by `LOG_LEVEL`.
///
/// Only one global subscriber can exist per process, so a second call fails
/// instead of silently keeping the first.
pub fn init_logging() -> anyhow::Result<()> {
    let level = level_from(env::var(ENV_LOG_LEVEL).ok().as_deref());
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

// unknown or missing names fall back to info
fn level_from(name: Option<&str>) -> Level {
    match name.map(str::to_lowercase).as_deref() {
        Some("error") => Level::ERROR,
        Some("warn") => Level::WARN,
        Some("debug") => Level::DEBUG,
        _ => Level::INFO,
    }
}
