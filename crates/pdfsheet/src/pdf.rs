//! Top-level PDF document type.

use std::path::Path;

use pdfsheet_core::{BBox, Char, Edge, PdfError};
use pdfsheet_parse::{
    BackendError, CharEvent, ContentHandler, PathEvent, PdfDocument, char_from_event,
    edges_from_path,
};

use crate::Page;

/// A PDF document opened for extraction.
///
/// Pages are interpreted lazily by [`Pdf::page`]; nothing beyond the
/// document structure is parsed when the file is opened.
///
/// # Example
///
/// ```ignore
/// use pdfsheet::{Pdf, TableSettings};
///
/// let pdf = Pdf::open_file("report.pdf")?;
/// for page in pdf.pages() {
///     let page = page?;
///     for table in page.find_tables(&TableSettings::default()) {
///         println!("{:?}", table.to_grid());
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Pdf {
    doc: PdfDocument,
}

/// Collects interpreter events for one page.
#[derive(Default)]
struct CollectingHandler {
    chars: Vec<CharEvent>,
    paths: Vec<PathEvent>,
}

impl ContentHandler for CollectingHandler {
    fn on_char(&mut self, event: CharEvent) {
        self.chars.push(event);
    }

    fn on_path(&mut self, event: PathEvent) {
        self.paths.push(event);
    }
}

impl Pdf {
    /// Open a PDF document from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PasswordRequired`] if the PDF is encrypted and
    /// [`PdfError::ParseError`] if the bytes are not a valid PDF document.
    pub fn open(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = PdfDocument::open(bytes).map_err(PdfError::from)?;
        Ok(Self { doc })
    }

    /// Open a PDF document from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::IoError`] if the file cannot be read, otherwise
    /// the same errors as [`Pdf::open`].
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| PdfError::IoError(e.to_string()))?;
        Self::open(&bytes)
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// Interpret one page (0-based) and return its chars and ruling edges.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PageOutOfRange`] for a bad index, or the error
    /// raised while interpreting the page content.
    pub fn page(&self, index: usize) -> Result<Page, PdfError> {
        self.load_page(index).map_err(PdfError::from)
    }

    /// Iterate over all pages in order.
    pub fn pages(&self) -> impl Iterator<Item = Result<Page, PdfError>> + '_ {
        (0..self.page_count()).map(|i| self.page(i))
    }

    fn load_page(&self, index: usize) -> Result<Page, BackendError> {
        let media_box = self.doc.media_box(index)?;

        let mut handler = CollectingHandler::default();
        self.doc.interpret_page(index, &mut handler)?;

        let chars: Vec<Char> = handler
            .chars
            .iter()
            .map(|event| char_from_event(event, &media_box))
            .collect();
        let edges: Vec<Edge> = handler
            .paths
            .iter()
            .flat_map(|event| edges_from_path(event, &media_box))
            .collect();

        Ok(Page::new(index, page_size(&media_box), chars, edges))
    }
}

/// Width and height of a media box.
fn page_size(media_box: &BBox) -> (f64, f64) {
    (media_box.width(), media_box.height())
}
