//! File logging
//!
//! The TUI owns the terminal, so log records go to rotating files under the
//! data directory instead of stderr. Initialization happens at most once per
//! process; later calls are no-ops.
//!
//! Records are written unbuffered: one-shot commands exit (sometimes through
//! `process::exit`) long before a flush interval would come round, and the
//! handle lives in a static that is never dropped.

use std::path::Path;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use once_cell::sync::OnceCell;

use crate::error::{LeftoversError, Result};

const LOG_FILE_BASENAME: &str = "leftovers";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

pub fn init_logging(level: &str, log_dir: &Path) -> Result<()> {
    let level = normalize_level(level)?;
    LOGGER.get_or_try_init(|| -> Result<LoggerHandle> {
        std::fs::create_dir_all(log_dir)?;
        let handle = Logger::try_with_str(level)
            .map_err(|e| LeftoversError::ConfigError(format!("invalid log level `{}`: {}", level, e)))?
            .log_to_file(FileSpec::default().directory(log_dir).basename(LOG_FILE_BASENAME))
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::Direct)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|e| LeftoversError::ConfigError(format!("failed to start logger: {}", e)))?;
        log::info!("leftovers {} starting, level={}", env!("CARGO_PKG_VERSION"), level);
        Ok(handle)
    })?;
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(LeftoversError::ConfigError(format!(
            "unsupported log level `{}`; expected trace|debug|info|warn|error|off",
            other
        ))),
    }
}
