//! Rolling Logger
//!
//! Installs a `tracing` subscriber that writes to a size-rotated log file and
//! keeps the latest lines in memory. Records emitted through the `log` facade
//! are forwarded to the same subscriber.

mod writer;

use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

pub use writer::{RollingConfig, RollingFileWriter};

static WRITER: OnceLock<Arc<RollingFileWriter>> = OnceLock::new();

/// Logger settings
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: log::LevelFilter,
    pub rolling: RollingConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: log::LevelFilter::Info,
            rolling: RollingConfig::default(),
        }
    }
}

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

fn to_tracing_level(level: log::LevelFilter) -> LevelFilter {
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

/// Initialize the global logger with default settings
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, LoggerConfig::default())
}

/// Initialize the global logger. Can only succeed once per process.
pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    config: LoggerConfig,
) -> Result<(), String> {
    if WRITER.get().is_some() {
        return Err("Logger already initialized".to_string());
    }

    let writer = RollingFileWriter::new(log_dir, app_name, config.rolling)
        .map_err(|e| format!("Failed to open log file: {}", e))?;
    let writer = Arc::new(writer);

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .with_timer(LocalTimer)
        .with_max_level(to_tracing_level(config.level))
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    let _ = WRITER.set(writer);
    Ok(())
}

fn ensure_initialized() -> Result<(), String> {
    match WRITER.get() {
        Some(_) => Ok(()),
        None => Err("Logger not initialized".to_string()),
    }
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent log lines, oldest first. Empty before initialization.
pub fn recent_lines() -> Vec<String> {
    WRITER.get().map(|w| w.recent_lines()).unwrap_or_default()
}
