//! Logging infrastructure
//!
//! Structured logging with support for both development and production:
//! console output (pretty or JSON) plus an optional daily-rotating
//! application log file, deleted after 14 days. Audit events do not go
//! through tracing; they flow to the redb audit store (`crate::audit`).

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Application log files older than this many days are deleted.
const LOG_RETENTION_DAYS: i64 = 14;

/// Rotated file name prefix (`till.YYYY-MM-DD.log`).
const LOG_FILE_PREFIX: &str = "till";

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Default log level when `RUST_LOG` is unset (e.g. "info")
/// * `json_format` - JSON console output (production) vs pretty (development)
/// * `log_dir` - Optional directory for the rotating application log file
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    // Daily rotating appender, subject to the retention cleanup task
    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .build(dir)?;
            tokio::spawn(periodic_cleanup(dir.to_path_buf()));
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(appender)),
            )
        }
        None => None,
    };

    if json_format {
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true);
        subscriber.with(file_layer).with(console_layer).init();
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        subscriber.with(file_layer).with(console_layer).init();
    }

    Ok(())
}

/// Clean up application log files older than the retention window.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    use chrono::{Local, TimeZone};

    let cutoff = Local::now() - chrono::Duration::days(LOG_RETENTION_DAYS);

    if !log_dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        // Match till.YYYY-MM-DD.log
        if let Some(date_part) = name
            .strip_prefix(LOG_FILE_PREFIX)
            .and_then(|d| d.strip_prefix('.'))
            .and_then(|d| d.strip_suffix(".log"))
            && let Ok(naive_date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && let Some(midnight) = naive_date.and_hms_opt(0, 0, 0)
            && let Some(local_datetime) = Local.from_local_datetime(&midnight).single()
            && local_datetime < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(())
}

/// Hourly cleanup loop, spawned when file logging is enabled.
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_old_files() {
        let dir = tempfile::tempdir().unwrap();

        let old = dir.path().join("till.2020-01-01.log");
        let fresh_name = format!("till.{}.log", chrono::Local::now().format("%Y-%m-%d"));
        let fresh = dir.path().join(&fresh_name);
        let unrelated = dir.path().join("notes.txt");

        fs::write(&old, "x").unwrap();
        fs::write(&fresh, "x").unwrap();
        fs::write(&unrelated, "x").unwrap();

        cleanup_old_logs(dir.path()).unwrap();

        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(cleanup_old_logs(&missing).is_ok());
    }
}
