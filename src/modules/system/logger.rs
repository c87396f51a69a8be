use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::APP_NAME;

const LOG_FILE_PREFIX: &str = "writeflow.log";
const LOG_RETENTION_DAYS: u64 = 7;

struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.to_rfc3339())
    }
}

pub fn get_log_dir(configured: Option<&str>) -> Result<PathBuf, String> {
    let log_dir = match configured {
        Some(dir) => PathBuf::from(dir),
        None => dirs::data_local_dir()
            .ok_or_else(|| "Failed to resolve local data directory".to_string())?
            .join(APP_NAME)
            .join("logs"),
    };

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;
    }

    Ok(log_dir)
}

/// Installs console and daily-rolling file output. The returned guard flushes
/// the file writer and must live until shutdown.
pub fn init_logger(configured_dir: Option<&str>) -> Option<WorkerGuard> {
    let _ = tracing_log::LogTracer::init();

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::Layer::new()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_timer(LocalTimer);

    let log_dir = match get_log_dir(configured_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to initialize log directory, logging to console only: {}", e);
            let _ = tracing_subscriber::registry()
                .with(filter_layer)
                .with(console_layer)
                .try_init();
            return None;
        }
    };

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(LocalTimer);
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    info!("Log system initialized (Console + File at {})", log_dir.display());
    if let Err(e) = cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS) {
        warn!("Failed to cleanup old logs: {}", e);
    }
    Some(guard)
}

/// Removes log files older than `days_to_keep`, then trims the oldest files
/// while the directory stays above the size cap.
pub fn cleanup_old_logs(log_dir: &std::path::Path, days_to_keep: u64) -> Result<usize, String> {
    use std::time::{SystemTime, UNIX_EPOCH};

    if !log_dir.exists() {
        return Ok(0);
    }
    const MAX_TOTAL_SIZE_BYTES: u64 = 256 * 1024 * 1024;
    const TARGET_SIZE_BYTES: u64 = 128 * 1024 * 1024;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Failed to get system time: {}", e))?
        .as_secs();
    let cutoff_time = now.saturating_sub(days_to_keep * 24 * 60 * 60);

    let mut remaining = Vec::new();
    let mut deleted_count = 0;
    let entries =
        fs::read_dir(log_dir).map_err(|e| format!("Failed to read log directory: {}", e))?;

    for entry in entries.flatten() {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !path.is_file() || !is_log {
            continue;
        }
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };
        let modified_secs = metadata
            .modified()
            .ok()
            .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(now);

        if modified_secs < cutoff_time {
            match fs::remove_file(&path) {
                Ok(()) => deleted_count += 1,
                Err(e) => warn!("Failed to delete old log file {:?}: {}", path, e),
            }
        } else {
            remaining.push((path, metadata.len(), modified_secs));
        }
    }

    let mut total_size: u64 = remaining.iter().map(|(_, size, _)| *size).sum();
    if total_size > MAX_TOTAL_SIZE_BYTES {
        remaining.sort_by_key(|(_, _, modified)| *modified);
        for (path, size, _) in remaining {
            if total_size <= TARGET_SIZE_BYTES {
                break;
            }
            if fs::remove_file(&path).is_ok() {
                deleted_count += 1;
                total_size -= size;
            }
        }
    }

    if deleted_count > 0 {
        info!("Log cleanup completed: deleted {} files", deleted_count);
    }
    Ok(deleted_count)
}
