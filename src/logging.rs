//! Logging setup
//!
//! Installs a `tracing` subscriber for binaries embedding the guard. The
//! library itself only emits events.

use std::env;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "notion_guard=info";

/// Where and how log events are written
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Also write a daily-rotated log file into this directory
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// Read configuration from environment variables
    ///
    /// Reads from:
    /// - `NOTION_GUARD_LOG_JSON` (optional, `1` or `true` enables JSON)
    /// - `NOTION_GUARD_LOG_DIR` (optional)
    pub fn from_env() -> Self {
        let json = env::var("NOTION_GUARD_LOG_JSON")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let log_dir = env::var_os("NOTION_GUARD_LOG_DIR").map(PathBuf::from);
        Self { json, log_dir }
    }
}

/// Install the global subscriber
///
/// Honours `RUST_LOG`, falling back to `notion_guard=info`. Events go to
/// stderr, plus a rolling file when `log_dir` is set; keep the returned
/// guard alive so the file writer flushes.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "notion-guard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match (config.json, file_writer) {
        (true, Some(file)) => builder
            .json()
            .with_writer(std::io::stderr.and(file))
            .try_init(),
        (true, None) => builder.json().with_writer(std::io::stderr).try_init(),
        (false, Some(file)) => builder
            .with_writer(std::io::stderr.and(file))
            .try_init(),
        (false, None) => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))?;

    Ok(guard)
}
