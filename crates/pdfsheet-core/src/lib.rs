//! pdfsheet-core: Backend-independent data types and algorithms.
//!
//! This crate provides the foundational types (BBox, Char, Word, Edge, ...)
//! and algorithms (word grouping, lattice and stream table detection,
//! cleaning and merging of extracted tables) used by pdfsheet.
//! It does no PDF parsing of its own.

pub mod edges;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod table;
pub mod text;
pub mod words;
pub mod year;

pub use edges::{Edge, EdgeSource, edge_from_segment, edges_from_rect};
pub use error::PdfError;
pub use frame::{Frame, Layout, RawTable, Value, clean, normalize_label};
pub use geometry::{BBox, Matrix, Orientation};
pub use table::{Cell, Strategy, Table, TableFinder, TableSettings};
pub use text::Char;
pub use words::{Word, WordExtractor, WordOptions, words_to_lines};
pub use year::{UNKNOWN_YEAR, extract_year};
