//! Append-only extraction error log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};

use crate::error::PipelineError;

/// Timestamped failure log. The file is opened in append mode for every
/// entry and never truncated.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one `[YYYY-MM-DD HH:MM:SS] message` line stamped with local time.
    pub fn append(&self, message: &str) -> Result<(), PipelineError> {
        let line = format_entry(Local::now().naive_local(), message);
        let to_log_error = |source| PipelineError::Log {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_log_error)?;
        writeln!(file, "{line}").map_err(to_log_error)
    }
}

pub fn format_entry(at: NaiveDateTime, message: &str) -> String {
    format!("[{}] {message}", at.format("%Y-%m-%d %H:%M:%S"))
}
