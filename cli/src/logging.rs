use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Environment variable holding the `EnvFilter` directives.
pub const LOG_ENV_VAR: &str = "PARLEY_LOG";
const DEFAULT_FILTER: &str = "info";
const LOG_FILE_NAME: &str = "parley.log";

pub fn default_log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".parley").join("log"))
}

/// Routes `tracing` output to `<log_dir>/parley.log`; the terminal belongs to the TUI.
///
/// The returned guard flushes the background writer when dropped, so keep it alive until exit.
pub fn init(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .context("install tracing subscriber")?;
    Ok(guard)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
