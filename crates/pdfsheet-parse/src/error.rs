//! Error types for the parsing and interpreter layers.
//!
//! Uses [`thiserror`] for derivation. [`BackendError`] wraps lopdf and
//! interpreter failures and converts into [`PdfError`].

use pdfsheet_core::PdfError;
use thiserror::Error;

/// Error type for PDF parsing backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font or encoding information.
    #[error("font error: {0}")]
    Font(String),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] PdfError),
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfError::ParseError(msg),
            BackendError::Io(e) => PdfError::IoError(e.to_string()),
            BackendError::Font(msg) => PdfError::FontError(msg),
            BackendError::Interpreter(msg) => PdfError::InterpreterError(msg),
            BackendError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = BackendError::Parse("invalid xref table".to_string());
        assert_eq!(err.to_string(), "PDF parse error: invalid xref table");
    }

    #[test]
    fn core_error_is_transparent() {
        let err = BackendError::Core(PdfError::PasswordRequired);
        assert_eq!(err.to_string(), "PDF is encrypted and requires a password");
    }

    #[test]
    fn converts_into_pdf_error() {
        let pdf: PdfError = BackendError::Interpreter("bad operand".to_string()).into();
        assert_eq!(pdf, PdfError::InterpreterError("bad operand".to_string()));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let pdf: PdfError = BackendError::from(io).into();
        assert_eq!(pdf, PdfError::IoError("gone".to_string()));

        let pdf: PdfError = BackendError::Core(PdfError::PasswordRequired).into();
        assert_eq!(pdf, PdfError::PasswordRequired);
    }
}
