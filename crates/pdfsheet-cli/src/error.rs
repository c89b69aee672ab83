//! Errors that end a run.
//!
//! Per-document problems are not errors at this level: they are recorded as
//! [`DocumentOutcome::Failed`](crate::pipeline::DocumentOutcome::Failed) and
//! the run moves on.

use std::io;
use std::path::PathBuf;

use pdfsheet::PdfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read input directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to append to log {}: {source}", .path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Pdf(#[from] PdfError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let err = PipelineError::ReadDir {
            path: PathBuf::from("PDF"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
        };
        assert_eq!(
            err.to_string(),
            "failed to read input directory PDF: no such directory"
        );
    }

    #[test]
    fn pdf_errors_are_transparent() {
        let err = PipelineError::from(PdfError::PasswordRequired);
        assert_eq!(err.to_string(), PdfError::PasswordRequired.to_string());
    }
}
