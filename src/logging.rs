//! Logging setup.
//!
//! Every mode writes to a log file through a non-blocking appender.  Headless
//! mode additionally logs to stdout; console mode must not, since stdout is
//! the terminal the UI draws on.
//!
//! Both outputs honour `RUST_LOG` and default to `info`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Open `log_file` for appending, creating its directory if needed.
fn file_appender(log_file: &Path) -> Result<RollingFileAppender> {
    let directory = log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("news-tracker.log");

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .with_context(|| format!("cannot open log file {}", log_file.display()))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file appender when dropped; keep it alive
/// until the process exits.
pub fn init(headless: bool, log_file: &Path) -> Result<WorkerGuard> {
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(log_file)?);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(env_filter());

    let stdout_layer = headless.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_filter(env_filter())
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_under_a_regular_file_is_an_error() {
        let blocker =
            std::env::temp_dir().join(format!("news-tracker-blocker-{}", std::process::id()));
        std::fs::write(&blocker, b"").unwrap();

        let err = file_appender(&blocker.join("tracker.log")).unwrap_err();

        assert!(err.to_string().starts_with("cannot open log file"), "got: {err}");
        std::fs::remove_file(&blocker).unwrap();
    }

    #[test]
    fn log_file_is_created_in_its_directory() {
        let dir =
            std::env::temp_dir().join(format!("news-tracker-logs-{}", std::process::id()));

        file_appender(&dir.join("tracker.log")).unwrap();

        assert!(dir.join("tracker.log").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
