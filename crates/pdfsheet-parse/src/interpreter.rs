//! Content stream interpreter.
//!
//! Walks the operators of a decoded content stream, tracking the graphics
//! and text state, and reports rendered glyphs and painted paths to a
//! [`ContentHandler`]. Color, clipping, images and marked content do not
//! affect extraction and are skipped.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object};
use pdfsheet_core::Matrix;
use tracing::{debug, trace};

use crate::document::{object_to_f64, resolve, stream_bytes};
use crate::error::BackendError;
use crate::font::Font;
use crate::handler::{CharEvent, ContentHandler, PaintOp, PathEvent, Subpath};

/// Nesting limit for form XObjects.
const MAX_FORM_DEPTH: usize = 12;

/// Text state parameters saved and restored with `q`/`Q`.
#[derive(Debug, Clone)]
struct TextState {
    font: Option<String>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    h_scaling: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// Accumulates subpaths between painting operators.
#[derive(Debug, Default)]
struct PathBuilder {
    finished: Vec<Subpath>,
    current: Option<Subpath>,
}

impl PathBuilder {
    fn move_to(&mut self, p: (f64, f64)) {
        self.finish_current();
        self.current = Some(Subpath {
            points: vec![p],
            ..Subpath::default()
        });
    }

    fn line_to(&mut self, p: (f64, f64)) {
        match &mut self.current {
            Some(sp) => sp.points.push(p),
            None => self.move_to(p),
        }
    }

    /// Curves are not ruling lines: end the straight run at the curve's
    /// start and continue from its end point.
    fn curve_to(&mut self, end: (f64, f64)) {
        self.move_to(end);
    }

    fn rect(&mut self, corners: [(f64, f64); 4]) {
        self.finish_current();
        self.finished.push(Subpath {
            points: corners.to_vec(),
            closed: true,
            rect: true,
        });
    }

    fn close(&mut self) {
        if let Some(sp) = &mut self.current {
            sp.closed = true;
        }
        self.finish_current();
    }

    fn finish_current(&mut self) {
        if let Some(sp) = self.current.take() {
            if sp.points.len() > 1 {
                self.finished.push(sp);
            }
        }
    }

    fn take(&mut self) -> Vec<Subpath> {
        self.finish_current();
        std::mem::take(&mut self.finished)
    }
}

/// Interprets content streams of one document.
pub struct Interpreter<'a> {
    doc: &'a Document,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc, depth: 0 }
    }

    /// Interpret a page-level content stream.
    pub fn run(
        &self,
        content: &[u8],
        resources: &Dictionary,
        handler: &mut dyn ContentHandler,
    ) -> Result<(), BackendError> {
        self.run_with_state(content, resources, handler, GraphicsState::default())
    }

    fn run_with_state(
        &self,
        content: &[u8],
        resources: &Dictionary,
        handler: &mut dyn ContentHandler,
        initial: GraphicsState,
    ) -> Result<(), BackendError> {
        if self.depth > MAX_FORM_DEPTH {
            return Err(BackendError::Interpreter(format!(
                "form XObject nesting exceeds {MAX_FORM_DEPTH} levels"
            )));
        }
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let operations = Content::decode(content)
            .map_err(|e| BackendError::Interpreter(format!("failed to decode content stream: {e}")))?
            .operations;

        let mut fonts: HashMap<String, Font> = HashMap::new();
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut gs = initial;
        let mut tm = Matrix::identity();
        let mut tlm = Matrix::identity();
        let mut path = PathBuilder::default();

        for op in &operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                // --- Graphics state ---
                "q" => stack.push(gs.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        gs = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operand(operands) {
                        gs.ctm = m.multiply(&gs.ctm);
                    }
                }

                // --- Text objects and state ---
                "BT" => {
                    tm = Matrix::identity();
                    tlm = Matrix::identity();
                }
                "ET" => {}
                "Tf" => {
                    if let (Some(name), Some(size)) = (
                        operands.first().and_then(name_operand),
                        number(operands, 1),
                    ) {
                        if !fonts.contains_key(&name) {
                            let font = self.load_font(resources, &name);
                            fonts.insert(name.clone(), font);
                        }
                        gs.text.font = Some(name);
                        gs.text.size = size;
                    }
                }
                "Tc" => set_number(&mut gs.text.char_spacing, operands),
                "Tw" => set_number(&mut gs.text.word_spacing, operands),
                "Tz" => {
                    if let Some(v) = number(operands, 0) {
                        gs.text.h_scaling = v / 100.0;
                    }
                }
                "TL" => set_number(&mut gs.text.leading, operands),
                "Ts" => set_number(&mut gs.text.rise, operands),
                "Tm" => {
                    if let Some(m) = matrix_operand(operands) {
                        tm = m;
                        tlm = m;
                    }
                }
                "Td" => {
                    if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                        tlm = Matrix::translation(tx, ty).multiply(&tlm);
                        tm = tlm;
                    }
                }
                "TD" => {
                    if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                        gs.text.leading = -ty;
                        tlm = Matrix::translation(tx, ty).multiply(&tlm);
                        tm = tlm;
                    }
                }
                "T*" => next_line(&gs.text, &mut tm, &mut tlm),

                // --- Text showing ---
                "Tj" => {
                    if let Some(bytes) = operands.first().and_then(string_operand) {
                        show_text(bytes, &gs, &mut tm, &fonts, handler);
                    }
                }
                "'" => {
                    next_line(&gs.text, &mut tm, &mut tlm);
                    if let Some(bytes) = operands.first().and_then(string_operand) {
                        show_text(bytes, &gs, &mut tm, &fonts, handler);
                    }
                }
                "\"" => {
                    if operands.len() >= 3 {
                        set_number(&mut gs.text.word_spacing, &operands[0..1]);
                        set_number(&mut gs.text.char_spacing, &operands[1..2]);
                        next_line(&gs.text, &mut tm, &mut tlm);
                        if let Some(bytes) = string_operand(&operands[2]) {
                            show_text(bytes, &gs, &mut tm, &fonts, handler);
                        }
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            if let Some(bytes) = string_operand(item) {
                                show_text(bytes, &gs, &mut tm, &fonts, handler);
                            } else if let Ok(adjust) = object_to_f64(item) {
                                let tx = -adjust / 1000.0 * gs.text.size * gs.text.h_scaling;
                                tm = Matrix::translation(tx, 0.0).multiply(&tm);
                            }
                        }
                    }
                }

                // --- XObjects ---
                "Do" => {
                    if let Some(name) = operands.first().and_then(name_operand) {
                        self.show_form(resources, &name, &gs, handler)?;
                    }
                }

                // --- Path construction ---
                "m" => {
                    if let Some(p) = point(operands, 0, &gs.ctm) {
                        path.move_to(p);
                    }
                }
                "l" => {
                    if let Some(p) = point(operands, 0, &gs.ctm) {
                        path.line_to(p);
                    }
                }
                "c" => {
                    if let Some(p) = point(operands, 4, &gs.ctm) {
                        path.curve_to(p);
                    }
                }
                "v" | "y" => {
                    if let Some(p) = point(operands, 2, &gs.ctm) {
                        path.curve_to(p);
                    }
                }
                "re" => {
                    if let [Some(x), Some(y), Some(w), Some(h)] =
                        [0, 1, 2, 3].map(|i| number(operands, i))
                    {
                        let t = |px: f64, py: f64| gs.ctm.transform_point(px, py);
                        path.rect([t(x, y), t(x + w, y), t(x + w, y + h), t(x, y + h)]);
                    }
                }
                "h" => path.close(),

                // --- Path painting ---
                "S" => paint(&mut path, PaintOp::Stroke, handler),
                "s" => {
                    path.close();
                    paint(&mut path, PaintOp::Stroke, handler);
                }
                "f" | "F" | "f*" => paint(&mut path, PaintOp::Fill, handler),
                "B" | "B*" => paint(&mut path, PaintOp::FillAndStroke, handler),
                "b" | "b*" => {
                    path.close();
                    paint(&mut path, PaintOp::FillAndStroke, handler);
                }
                "n" => {
                    path.take();
                }

                other => trace!(operator = other, "skipping operator"),
            }
        }

        Ok(())
    }

    fn load_font(&self, resources: &Dictionary, name: &str) -> Font {
        let dict = resources
            .get(b"Font")
            .ok()
            .and_then(|fonts| resolve(self.doc, fonts).as_dict().ok())
            .and_then(|fonts| fonts.get(name.as_bytes()).ok())
            .and_then(|font| resolve(self.doc, font).as_dict().ok());
        match dict {
            Some(dict) => Font::load(self.doc, dict, name),
            None => {
                debug!(font = name, "font not found in page resources, using defaults");
                Font::fallback(name)
            }
        }
    }

    /// Run a form XObject's content with its own matrix and resources.
    /// Image XObjects are ignored.
    fn show_form(
        &self,
        resources: &Dictionary,
        name: &str,
        gs: &GraphicsState,
        handler: &mut dyn ContentHandler,
    ) -> Result<(), BackendError> {
        let Some(stream) = resources
            .get(b"XObject")
            .ok()
            .and_then(|x| resolve(self.doc, x).as_dict().ok())
            .and_then(|x| x.get(name.as_bytes()).ok())
            .and_then(|o| resolve(self.doc, o).as_stream().ok())
        else {
            debug!(xobject = name, "XObject not found in resources");
            return Ok(());
        };

        let is_form = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Form");
        if !is_form {
            return Ok(());
        }

        let form_matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| resolve(self.doc, o).as_array().ok())
            .and_then(|items| matrix_operand(items))
            .unwrap_or_default();
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve(self.doc, o).as_dict().ok())
            .unwrap_or(resources);
        let Some(content) = stream_bytes(stream) else {
            return Ok(());
        };

        let mut state = gs.clone();
        state.ctm = form_matrix.multiply(&gs.ctm);
        let nested = Interpreter {
            doc: self.doc,
            depth: self.depth + 1,
        };
        nested.run_with_state(&content, form_resources, handler, state)
    }
}

fn show_text(
    bytes: &[u8],
    gs: &GraphicsState,
    tm: &mut Matrix,
    fonts: &HashMap<String, Font>,
    handler: &mut dyn ContentHandler,
) {
    let ts = &gs.text;
    let fallback;
    let font = match ts.font.as_ref().and_then(|name| fonts.get(name)) {
        Some(font) => font,
        None => {
            fallback = Font::fallback(ts.font.as_deref().unwrap_or_default());
            &fallback
        }
    };

    let font_matrix = Matrix::new(ts.size * ts.h_scaling, 0.0, 0.0, ts.size, 0.0, ts.rise);
    for code in font.codes(bytes) {
        let width = font.width(code) / 1000.0;
        handler.on_char(CharEvent {
            text: font.decode(code),
            font_name: font.base_name().to_string(),
            font_size: ts.size,
            trm: font_matrix.multiply(tm).multiply(&gs.ctm),
            width,
        });

        let word_spacing = if font.is_word_space(code) {
            ts.word_spacing
        } else {
            0.0
        };
        let tx = (width * ts.size + ts.char_spacing + word_spacing) * ts.h_scaling;
        *tm = Matrix::translation(tx, 0.0).multiply(tm);
    }
}

fn next_line(ts: &TextState, tm: &mut Matrix, tlm: &mut Matrix) {
    *tlm = Matrix::translation(0.0, -ts.leading).multiply(tlm);
    *tm = *tlm;
}

fn paint(path: &mut PathBuilder, op: PaintOp, handler: &mut dyn ContentHandler) {
    let subpaths = path.take();
    if !subpaths.is_empty() {
        handler.on_path(PathEvent {
            subpaths,
            paint: op,
        });
    }
}

// --- Operand helpers ---

fn number(operands: &[Object], index: usize) -> Option<f64> {
    operands.get(index).and_then(|o| object_to_f64(o).ok())
}

fn set_number(target: &mut f64, operands: &[Object]) {
    if let Some(v) = number(operands, 0) {
        *target = v;
    }
}

fn point(operands: &[Object], index: usize, ctm: &Matrix) -> Option<(f64, f64)> {
    let x = number(operands, index)?;
    let y = number(operands, index + 1)?;
    Some(ctm.transform_point(x, y))
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let v: Vec<f64> = (0..6).map(|i| number(operands, i)).collect::<Option<_>>()?;
    Some(Matrix::new(v[0], v[1], v[2], v[3], v[4], v[5]))
}

fn name_operand(obj: &Object) -> Option<String> {
    obj.as_name()
        .ok()
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

fn string_operand(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}
