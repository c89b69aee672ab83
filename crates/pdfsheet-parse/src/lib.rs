//! pdfsheet-parse: PDF parsing and content stream interpretation.
//!
//! Reads documents with lopdf, resolves fonts and ToUnicode maps, and
//! interprets page content into character and path events that are turned
//! into [`pdfsheet_core`] chars and edges.

pub mod cmap;
pub mod document;
pub mod error;
pub mod extraction;
pub mod font;
pub mod handler;
pub mod interpreter;

pub use document::PdfDocument;
pub use error::BackendError;
pub use extraction::{char_from_event, edges_from_path};
pub use handler::{CharEvent, ContentHandler, PaintOp, PathEvent, Subpath};
pub use pdfsheet_core;
