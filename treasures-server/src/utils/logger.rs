//! Logging Infrastructure
//!
//! - Console output: pretty in development, JSON in production
//! - Optional daily rotating files under `<log_dir>/app` and `<log_dir>/security`
//! - Application log files older than 14 days are removed hourly

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Days application logs are kept
const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Initialize console-only logging at the given level
pub fn init_logger(level: &str) -> anyhow::Result<()> {
    init_logger_with_file(level, false, None)
}

/// Initialize the logging system
///
/// `RUST_LOG` overrides `level` when set.
///
/// ```no_run
/// // development: console only
/// treasures_server::init_logger_with_file("debug", false, None)?;
/// // production: JSON console + files
/// treasures_server::init_logger_with_file("info", true, Some("./data/logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_filter(console_filter)
            .boxed()
    };

    let mut layers: Vec<BoxedLayer> = vec![console_layer];
    if let Some(dir) = log_dir {
        layers.extend(file_layers(Path::new(dir), level)?);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    if let Some(dir) = log_dir {
        tokio::spawn(periodic_cleanup(PathBuf::from(dir)));
    }

    Ok(())
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// App logs exclude the `security` target, which gets its own file
fn file_layers(log_dir: &Path, level: &str) -> anyhow::Result<Vec<BoxedLayer>> {
    let app_log_dir = log_dir.join("app");
    let security_log_dir = log_dir.join("security");
    fs::create_dir_all(&app_log_dir)?;
    fs::create_dir_all(&security_log_dir)?;

    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
    let app_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(app_log))
        .with_filter(EnvFilter::new(format!("{},security=off", level)))
        .boxed();

    let security_log = RollingFileAppender::new(Rotation::DAILY, security_log_dir, "security");
    let security_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(security_log))
        .with_filter(filter_fn(|meta| meta.target() == "security"))
        .boxed();

    Ok(vec![app_layer, security_layer])
}

/// Remove `app.YYYY-MM-DD` files older than the retention period
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date_part) = name.strip_prefix("app.") else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }
    Ok(removed)
}

async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::warn!(error = %e, "Log cleanup failed");
        }
        sleep(Duration::from_secs(3600)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_old_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();

        let today = chrono::Local::now().date_naive();
        let old = today - chrono::Duration::days(30);
        fs::write(app.join(format!("app.{}", old.format("%Y-%m-%d"))), "x").unwrap();
        fs::write(app.join(format!("app.{}", today.format("%Y-%m-%d"))), "x").unwrap();
        fs::write(app.join("notes.txt"), "x").unwrap();

        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 1);
        assert_eq!(fs::read_dir(&app).unwrap().count(), 2);
    }

    #[test]
    fn test_cleanup_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(&dir.path().join("missing")).unwrap(), 0);
    }
}
