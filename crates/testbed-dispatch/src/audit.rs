//! Append-only audit log for validation sessions.
//!
//! Best-effort by contract: if the file cannot be created the log is
//! disabled, and individual write failures are ignored. The log is passed
//! around as an explicit handle; there is no process-wide singleton.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::{fmt, fs};

use chrono::{Local, Utc};
use tracing::warn;

/// Severity of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        write!(f, "{name}")
    }
}

/// Append-only sink for `(timestamp, level, message)` records.
///
/// Shared across the UI thread and worker threads via `Arc`.
pub struct AuditLog {
    file: Mutex<Option<fs::File>>,
    path: Option<PathBuf>,
}

impl AuditLog {
    /// Create a timestamped audit file in `dir` and write the
    /// session-start record.
    ///
    /// Never fails: if the directory or file is unusable the returned log
    /// silently drops every record.
    pub fn create(dir: impl AsRef<Path>, morphology_name: &str) -> Self {
        let filename = format!("{}_testbed_audit.txt", Local::now().format("%Y%m%d_%H%M%S"));
        let path = dir.as_ref().join(filename);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok();
        if file.is_none() {
            warn!(path = %path.display(), "Audit log unavailable, records will be dropped");
        }

        let log = Self {
            path: file.is_some().then_some(path),
            file: Mutex::new(file),
        };
        log.record(
            AuditLevel::Info,
            &format!("Test session started. Morphology: {morphology_name}"),
        );
        log
    }

    /// A log that drops every record. For tests and headless runs.
    pub fn disabled() -> Self {
        Self {
            file: Mutex::new(None),
            path: None,
        }
    }

    /// Path of the audit file, if one was created.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one record. Write failures are silently ignored.
    pub fn record(&self, level: AuditLevel, message: &str) {
        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        if let Some(file) = guard.as_mut() {
            let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "{timestamp} - {level} - {message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("testbed-audit-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_records_are_appended() {
        let dir = scratch_dir();
        let log = AuditLog::create(&dir, "Quadruped_v2_Beta");
        log.record(AuditLevel::Info, "MANUAL_VALIDATION: IMU_Sensor triggered");
        log.record(AuditLevel::Error, "AUDIT: Result - IMU_Sensor: FAILED");

        let contents = fs::read_to_string(log.path().unwrap()).unwrap();
        assert!(contents.contains("Test session started. Morphology: Quadruped_v2_Beta"));
        assert!(contents.contains("INFO - MANUAL_VALIDATION: IMU_Sensor triggered"));
        assert!(contents.contains("ERROR - AUDIT: Result - IMU_Sensor: FAILED"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_unusable_directory_is_nonfatal() {
        let dir = std::env::temp_dir().join(format!("missing-{}", Uuid::new_v4()));
        let log = AuditLog::create(dir, "Bench_Rig");

        assert!(log.path().is_none());
        log.record(AuditLevel::Info, "dropped on the floor");
    }

    #[test]
    fn test_disabled_log_is_silent() {
        let log = AuditLog::disabled();
        assert!(log.path().is_none());
        log.record(AuditLevel::Warn, "nothing happens");
    }
}
