//! pdfsheet: Extract chars, words, ruling lines and tables from PDF documents.
//!
//! This is the public API facade crate. It re-exports types from
//! pdfsheet-core and uses pdfsheet-parse for PDF reading and interpretation.
//!
//! # Architecture
//!
//! - **pdfsheet-core**: Backend-independent data types and algorithms
//! - **pdfsheet-parse**: lopdf document access and content stream interpreter
//! - **pdfsheet** (this crate): Public API that ties everything together

mod page;
mod pdf;

pub use page::Page;
pub use pdf::Pdf;

pub use pdfsheet_core;
pub use pdfsheet_core::{
    BBox, Cell, Char, Edge, EdgeSource, Frame, Layout, PdfError, RawTable, Strategy, Table,
    TableSettings, UNKNOWN_YEAR, Value, Word, WordOptions, clean, extract_year,
};
pub use pdfsheet_parse;
