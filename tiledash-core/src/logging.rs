// tiledash-core/src/logging.rs
use crate::config::LogConfig;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("could not open log file in {dir}: {source}")]
    Open {
        dir: PathBuf,
        #[source]
        source: InitError,
    },
}

/// Keeps the background log writer alive. Pending lines are flushed when
/// it is dropped, so hold it until the process exits.
pub struct LogGuard {
    _worker: WorkerGuard,
    path: PathBuf,
}

impl LogGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Route `tracing` output to the configured log file inside `app_dir`.
///
/// The terminal belongs to the dashboard, so nothing is logged to stdout.
/// `RUST_LOG` overrides the configured level when set.
pub fn init(app_dir: &Path, config: &LogConfig) -> Result<LogGuard, LoggingError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&config.file)
        .build(app_dir)
        .map_err(|source| LoggingError::Open {
            dir: app_dir.to_path_buf(),
            source,
        })?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    // A subscriber may already be installed (tests); keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");

    Ok(LogGuard {
        _worker: worker,
        path: app_dir.join(&config.file),
    })
}
