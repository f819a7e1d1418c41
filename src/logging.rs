//! Tracing configuration and log routing.
//!
//! Logs go to stdout through a compact formatter and are mirrored to a file. The file path comes
//! from `RESEARCH_BACKEND_LOG_FILE`; without it each service appends to its own
//! `logs/research-backend-<service>.log`, so the two services can run side by side.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "RESEARCH_BACKEND_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Configure tracing subscribers for stdout and file logging for the named service.
///
/// `RUST_LOG` controls filtering and defaults to `info`. The non-blocking writer guard is kept in
/// a global so buffered lines are flushed for the lifetime of the process.
pub fn init_tracing(service: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    let path = log_file_path(std::env::var_os(LOG_FILE_ENV), service);
    match file_writer(&path) {
        Some(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
            tracing::info!(service, log_file = %path.display(), "Tracing initialized");
        }
        None => {
            registry.init();
            tracing::info!(service, "Tracing initialized without file output");
        }
    }
}

fn log_file_path(configured: Option<OsString>, service: &str) -> PathBuf {
    match configured.filter(|value| !value.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => Path::new(DEFAULT_LOG_DIR).join(format!("research-backend-{service}.log")),
    }
}

/// Returns `None` when the log file (or its directory) cannot be created.
fn file_writer(path: &Path) -> Option<NonBlocking> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name()?.to_string_lossy().into_owned();

    if let Err(err) = std::fs::create_dir_all(directory) {
        eprintln!("Failed to create log directory {}: {err}", directory.display());
        return None;
    }
    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
    {
        Ok(appender) => appender,
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            return None;
        }
    };

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}
