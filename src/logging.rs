//! Logging setup for stamp runs.
//!
//! Installs a global tracing subscriber that always writes to stdout and, when a
//! log directory is supplied, to a per-run log file as well. Log files are
//! timestamped and kept to a bounded count.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{
    OffsetDateTime,
    format_description::{BorrowedFormatItem, FormatItem},
    macros::format_description,
};
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling,
};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{
        self,
        format::{DefaultFields, Format, Full},
    },
    prelude::*,
};

use crate::timestamp::{Clock, SystemClock};

/// Maximum number of log files to retain.
const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "buildstamp";

static INITIALIZED: OnceLock<()> = OnceLock::new();

type LogTimer = fmt::time::OffsetTime<BorrowedFormatItem<'static>>;
type FileLayer<S> = fmt::Layer<S, DefaultFields, Format<Full, LogTimer>, NonBlocking>;

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log directory could not be created or listed.
    #[error("Log directory {path} is unusable: {source}")]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A log file could not be created or pruned.
    #[error("Log file {path} is unusable: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log filename time: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize tracing to stdout, plus a log file under `log_dir` when given.
///
/// The returned guard flushes the log file when dropped, so callers must hold
/// it until their last event. Subsequent calls are no-ops returning `None`.
pub fn init(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, LoggingError> {
    if INITIALIZED.get().is_some() {
        return Ok(None);
    }

    let timer = build_timer();
    let (file, guard, log_path) = match log_dir {
        Some(dir) => {
            let (writer, guard, path) = open_log_file(dir)?;
            (Some(file_layer(writer, timer.clone())), Some(guard), Some(path))
        }
        None => (None, None, None),
    };
    let stdout_layer = fmt::layer().with_timer(timer).with_writer(std::io::stdout);

    let subscriber = Registry::default()
        .with(build_env_filter())
        .with(stdout_layer)
        .with(file);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INITIALIZED.set(());

    if let Some(path) = log_path {
        tracing::debug!("Logging to {}", path.display());
    }
    Ok(guard)
}

fn file_layer<S>(writer: NonBlocking, timer: LogTimer) -> FileLayer<S> {
    fmt::layer()
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(writer)
}

fn open_log_file(dir: &Path) -> Result<(NonBlocking, WorkerGuard, PathBuf), LoggingError> {
    fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let file_name = format_log_file_name(SystemClock.now())?;
    let path = dir.join(&file_name);
    ensure_file_exists(&path)?;
    prune_old_logs(dir, MAX_LOG_FILES)?;

    let appender = rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((writer, guard, path))
}

fn ensure_file_exists(path: &Path) -> Result<(), LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| LoggingError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

fn prune_old_logs(dir: &Path, max_files: usize) -> Result<(), LoggingError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|source| LoggingError::LogDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("log"))
        .map(|entry| {
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, entry.path())
        })
        .collect::<Vec<_>>();

    entries.sort_by_key(|(modified, _)| *modified);
    let excess = entries.len().saturating_sub(max_files);
    for (_, path) in entries.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::LogFile { path, source })?;
    }
    Ok(())
}

fn format_log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    Ok(format!("{LOG_FILE_PREFIX}_{}.log", now.format(NAME_FORMAT)?))
}

/// Event timestamps in the same local offset the build date is stamped in.
fn build_timer() -> LogTimer {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    fmt::time::OffsetTime::new(SystemClock.now().offset(), DISPLAY_FORMAT.into())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
