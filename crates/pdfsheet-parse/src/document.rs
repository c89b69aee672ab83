//! lopdf-backed document access.
//!
//! Opens a PDF, caches its page object IDs in order and exposes the page
//! attributes the interpreter needs: media box, resources (both inherited
//! through the page tree) and concatenated content stream bytes.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfsheet_core::{BBox, PdfError};

use crate::error::BackendError;
use crate::handler::ContentHandler;
use crate::interpreter::Interpreter;

/// US Letter, used when no media box is present anywhere in the page tree.
const DEFAULT_MEDIA_BOX: BBox = BBox {
    x0: 0.0,
    top: 0.0,
    x1: 612.0,
    bottom: 792.0,
};

/// An opened PDF document.
pub struct PdfDocument {
    inner: Document,
    page_ids: Vec<ObjectId>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("pages", &self.page_ids.len())
            .finish()
    }
}

impl PdfDocument {
    /// Parse a PDF from memory. Encrypted documents are rejected.
    pub fn open(bytes: &[u8]) -> Result<Self, BackendError> {
        let inner = Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        Self::from_document(inner)
    }

    /// Read and parse a PDF file.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let bytes = std::fs::read(path)?;
        Self::open(&bytes)
    }

    fn from_document(inner: Document) -> Result<Self, BackendError> {
        if inner.is_encrypted() {
            return Err(BackendError::Core(PdfError::PasswordRequired));
        }
        // get_pages returns 1-based page numbers in order
        let page_ids = inner.get_pages().into_values().collect();
        Ok(Self { inner, page_ids })
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.page_ids.get(index).copied().ok_or(BackendError::Core(
            PdfError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            },
        ))
    }

    /// Media box as `[x0, y0, x1, y1]` in PDF user space, stored in a
    /// [`BBox`] with `top` holding y0 and `bottom` holding y1.
    pub fn media_box(&self, index: usize) -> Result<BBox, BackendError> {
        let page_id = self.page_id(index)?;
        let Some(obj) = resolve_inherited(&self.inner, page_id, b"MediaBox")? else {
            return Ok(DEFAULT_MEDIA_BOX);
        };
        let array = resolve(&self.inner, obj)
            .as_array()
            .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
        if array.len() != 4 {
            return Err(BackendError::Parse(format!(
                "expected 4-element MediaBox, got {}",
                array.len()
            )));
        }
        let n = |i: usize| object_to_f64(resolve(&self.inner, &array[i]));
        let (x0, y0, x1, y1) = (n(0)?, n(1)?, n(2)?, n(3)?);
        Ok(BBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)))
    }

    /// The page's resource dictionary, inherited from ancestors if needed.
    pub fn resources(&self, index: usize) -> Result<Dictionary, BackendError> {
        let page_id = self.page_id(index)?;
        match resolve_inherited(&self.inner, page_id, b"Resources")? {
            Some(obj) => resolve(&self.inner, obj)
                .as_dict()
                .cloned()
                .map_err(|e| BackendError::Parse(format!("Resources is not a dictionary: {e}"))),
            None => Ok(Dictionary::new()),
        }
    }

    /// Decoded content of every stream in the page's `/Contents`.
    pub fn content(&self, index: usize) -> Result<Vec<u8>, BackendError> {
        let page_id = self.page_id(index)?;
        let page = self
            .inner
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        let Ok(contents) = page.get(b"Contents") else {
            return Ok(Vec::new());
        };
        let streams: Vec<&Object> = match resolve(&self.inner, contents) {
            Object::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut bytes = Vec::new();
        for item in streams {
            if let Ok(stream) = resolve(&self.inner, item).as_stream() {
                if let Some(data) = stream_bytes(stream) {
                    bytes.extend_from_slice(&data);
                    bytes.push(b'\n');
                }
            }
        }
        Ok(bytes)
    }

    /// Run the content stream interpreter over one page.
    pub fn interpret_page(
        &self,
        index: usize,
        handler: &mut dyn ContentHandler,
    ) -> Result<(), BackendError> {
        let content = self.content(index)?;
        let resources = self.resources(index)?;
        Interpreter::new(&self.inner).run(&content, &resources, handler)
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current = page_id;
    // page trees are shallow; the bound only stops /Parent cycles
    for _ in 0..64 {
        let dict = doc
            .get_object(current)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent") {
            Ok(parent) => {
                current = parent
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Err(BackendError::Parse("page tree /Parent chain too deep".to_string()))
}

/// Follow an indirect reference; other objects are returned as-is.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &Object) -> Result<f64, BackendError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Decompressed stream content, falling back to the raw bytes.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Option<Vec<u8>> {
    let data = if stream.dict.get(b"Filter").is_ok() {
        stream.decompressed_content().ok()?
    } else {
        stream.content.clone()
    };
    (!data.is_empty()).then_some(data)
}
