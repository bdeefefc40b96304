//! Run log: one append-only file per invocation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Which entry path produced the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Deploy,
    Cleanup,
}

impl RunKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Cleanup => "cleanup",
        }
    }
}

/// `dockhand_<kind>_<YYYYmmdd_HHMMSS>.log`.
#[must_use]
pub fn log_file_name(kind: RunKind, at: chrono::DateTime<Local>) -> String {
    format!("dockhand_{}_{}.log", kind.as_str(), at.format("%Y%m%d_%H%M%S"))
}

/// Keeps the background writer alive; dropping it flushes the file.
pub struct RunLog {
    pub path: PathBuf,
    _guard: WorkerGuard,
}

/// Install the global subscriber writing to a fresh file in `log_dir`.
///
/// `RUST_LOG` overrides the default `info` filter.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a subscriber is
/// already installed.
pub fn init_run_log(log_dir: &Path, kind: RunKind) -> Result<RunLog> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;
    let file_name = log_file_name(kind, Local::now());
    let appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("cannot install log subscriber")?;

    Ok(RunLog {
        path: log_dir.join(file_name),
        _guard: guard,
    })
}
