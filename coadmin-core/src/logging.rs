//! Logging infrastructure for coadmin
//!
//! Logs go to `$XDG_STATE_HOME/coadmin/coadmin.log.<date>` (daily rotation).
//! Verbose mode raises the level to `debug` and mirrors events to stderr.
//! `RUST_LOG` overrides both.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Prefix of the rotated log files; the appender appends `.YYYY-MM-DD`
pub const LOG_FILE_PREFIX: &str = "coadmin.log";

/// Initialize logging into the XDG state directory
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<LoggingGuard> {
    init_in(&Config::state_dir(), config, verbose)
}

/// Initialize logging into `log_dir`.
///
/// Fails if the directory cannot be created or a global subscriber is
/// already installed.
pub fn init_in(log_dir: &Path, config: &LoggingConfig, verbose: bool) -> Result<LoggingGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
        .map_err(|e| Error::Config(format!("failed to open log file in {:?}: {}", log_dir, e)))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let level = effective_level(config, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {}", e)))?;

    tracing::info!(log_dir = %log_dir.display(), level, verbose, "Logging initialized");

    Ok(LoggingGuard {
        _guard: guard,
        log_dir: log_dir.to_path_buf(),
    })
}

/// Level used when `RUST_LOG` is unset
pub fn effective_level(config: &LoggingConfig, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else {
        config.level.as_str()
    }
}

/// Route events to the test harness output; safe to call from every test
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

/// Keeps the non-blocking writer alive; pending lines are flushed on drop.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    /// Directory holding the rotated log files
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}
