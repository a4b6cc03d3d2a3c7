//! Optional file logging for scan sessions
//!
//! Disabled unless initialized; all log calls are no-ops then. Used mainly
//! to record isolated per-reference changelog failures and skipped table
//! overrides without polluting scan output.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

static LOGGER: Mutex<Option<ScanLogger>> = Mutex::new(None);

pub struct ScanLogger {
    file: File,
}

impl ScanLogger {
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;
        Ok(Self { file })
    }

    pub fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {}", timestamp, message);
        let _ = self.file.flush();
    }

    pub fn section(&mut self, title: &str) {
        let separator = "=".repeat(60);
        self.log(&separator);
        self.log(title);
        self.log(&separator);
    }
}

/// Initialize the global logger, returning the path written to
pub fn init_logger(log_path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = log_path.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(format!("/tmp/extscan-{}.log", timestamp))
    });

    let logger = ScanLogger::new(&path)?;
    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
    }
    Ok(path)
}

pub fn log(message: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(message);
        }
    }
}

pub fn section(title: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.section(title);
        }
    }
}

/// Log the start of a file scan
pub fn log_scan_start(path: &Path) {
    log(&format!("Scanning: {}", path.display()));
}

/// Log the outcome of a file scan
pub fn log_scan_result(path: &Path, hits: usize, ignored: bool) {
    if ignored {
        log(&format!("Ignored (file opt-out): {}", path.display()));
    } else {
        log(&format!("{} hit(s): {}", hits, path.display()));
    }
}
