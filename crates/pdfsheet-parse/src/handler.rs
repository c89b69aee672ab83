//! Content handler callback trait for content stream interpretation.
//!
//! The interpreter calls [`ContentHandler`] methods as it renders glyphs and
//! paints paths. All coordinates are PDF user space (bottom-left origin)
//! after the current transformation matrix has been applied.

use pdfsheet_core::Matrix;

/// A rendered character glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct CharEvent {
    /// Decoded text of the glyph.
    pub text: String,
    /// Font name with any subset prefix removed.
    pub font_name: String,
    /// Font size from the `Tf` operator.
    pub font_size: f64,
    /// Text rendering matrix: glyph space (unit em) to user space.
    pub trm: Matrix,
    /// Glyph width in em units (1/1000 of the font's width entry).
    pub width: f64,
}

/// The type of paint operation applied to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOp {
    Stroke,
    Fill,
    FillAndStroke,
}

/// A connected run of straight segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Subpath {
    pub points: Vec<(f64, f64)>,
    /// Whether a segment joins the last point back to the first.
    pub closed: bool,
    /// Built by the `re` operator.
    pub rect: bool,
}

impl Subpath {
    /// Consecutive point pairs, including the closing segment.
    pub fn segments(&self) -> Vec<((f64, f64), (f64, f64))> {
        let mut segments: Vec<_> = self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && self.points.len() > 2 {
            if let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) {
                if first != last {
                    segments.push((last, first));
                }
            }
        }
        segments
    }
}

/// A painted path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEvent {
    pub subpaths: Vec<Subpath>,
    pub paint: PaintOp,
}

/// Callback handler for content stream interpretation.
///
/// Both methods default to no-ops so handlers can subscribe to only the
/// events they need.
pub trait ContentHandler {
    /// Called when a character glyph is rendered.
    fn on_char(&mut self, _event: CharEvent) {}

    /// Called when a path is stroked, filled, or both.
    fn on_path(&mut self, _event: PathEvent) {}
}
