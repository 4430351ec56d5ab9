//! Structured log lines shared by the front ends, the handlers and the hub client.

use std::path::Path;

use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const LOG_FILE_PREFIX: &str = "friday";
pub const LOG_RETENTION_DAYS: usize = 30;

/// `friday.YYYY-MM-DD.log`, rotated at midnight, last 30 days kept.
pub fn rolling_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(LOG_RETENTION_DAYS)
        .build(dir)
}

/// Console subscriber, plus a rolling file when `log_dir` is given.
/// `RUST_LOG` overrides the default `info` level. Keep the returned guard
/// alive for as long as the process logs, or buffered file lines are lost.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut file_error = None;
    let (file_layer, guard) = match log_dir.map(rolling_appender) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    // A second init (tests, embedding) is not an error worth surfacing.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init();

    if let Some(e) = file_error {
        warn!("File logging disabled: {}", e);
    }
    guard
}

pub fn version_banner() {
    info!("Friday v{} starting", VERSION);
}

pub fn log_command(text: &str) {
    info!("COMMAND: '{}'", text);
}

pub fn log_action(domain: &str, action: &str, target: Option<&str>) {
    match target {
        Some(target) => info!("ACTION [{}] {} -> {}", domain, action, target),
        None => info!("ACTION [{}] {}", domain, action),
    }
}

pub fn log_api_call(method: &str, url: &str, status: Option<u16>, failure: Option<&str>) {
    match (status, failure) {
        (_, Some(failure)) => error!("API [{}] {} ** ERROR: {}", method, url, failure),
        (Some(status), None) => info!("API [{}] {} -> Status {}", method, url, status),
        (None, None) => info!("API [{}] {}", method, url),
    }
}

pub fn log_separator() {
    info!("{}", "=".repeat(70));
}
