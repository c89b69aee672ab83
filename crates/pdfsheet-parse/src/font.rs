//! Font loading: glyph widths and code-to-text decoding.
//!
//! Only what text positioning needs is read: `/Widths` for simple fonts,
//! `/W` and `/DW` of the descendant for Type0 fonts, built-in widths for a
//! few standard 14 fonts, and the `/ToUnicode` CMap.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};
use tracing::debug;

use crate::cmap::ToUnicode;
use crate::document::{object_to_f64, resolve, stream_bytes};

/// Width used when a font gives no usable metrics (1/1000 text space).
const FALLBACK_WIDTH: f64 = 500.0;
/// Default `/DW` for CID fonts.
const DEFAULT_CID_WIDTH: f64 = 1000.0;
/// Widest `c_first c_last w` range accepted from a `/W` array.
const MAX_CID_RANGE: u32 = 0xFFFF;

/// Helvetica glyph widths for codes 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold glyph widths for codes 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum StandardMetrics {
    Table(&'static [u16; 95]),
    Monospace(f64),
}

impl StandardMetrics {
    fn lookup(base_name: &str) -> Option<Self> {
        match base_name {
            "Helvetica" | "Helvetica-Oblique" | "Arial" | "ArialMT" => {
                Some(Self::Table(&HELVETICA_WIDTHS))
            }
            "Helvetica-Bold" | "Helvetica-BoldOblique" | "Arial-BoldMT" => {
                Some(Self::Table(&HELVETICA_BOLD_WIDTHS))
            }
            "Courier" | "Courier-Bold" | "Courier-Oblique" | "Courier-BoldOblique" => {
                Some(Self::Monospace(600.0))
            }
            _ => None,
        }
    }

    fn width(&self, code: u32) -> Option<f64> {
        match self {
            Self::Table(table) => code
                .checked_sub(32)
                .and_then(|i| table.get(i as usize))
                .map(|w| f64::from(*w)),
            Self::Monospace(w) => Some(*w),
        }
    }
}

/// A font resource prepared for text decoding.
#[derive(Debug, Clone)]
pub struct Font {
    base_name: String,
    composite: bool,
    first_char: u32,
    widths: Vec<f64>,
    cid_widths: HashMap<u32, f64>,
    default_width: f64,
    standard: Option<StandardMetrics>,
    to_unicode: Option<ToUnicode>,
}

impl Font {
    /// Font used when a `Tf` names a resource that does not exist.
    pub fn fallback(name: &str) -> Self {
        let base_name = strip_subset_prefix(name).to_string();
        Self {
            standard: StandardMetrics::lookup(&base_name),
            base_name,
            composite: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: FALLBACK_WIDTH,
            to_unicode: None,
        }
    }

    /// Read a font dictionary. Malformed optional entries are skipped.
    pub fn load(doc: &Document, dict: &Dictionary, resource_name: &str) -> Self {
        let raw_name = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_else(|| resource_name.to_string());
        let mut font = Font::fallback(&raw_name);

        font.composite = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");

        if font.composite {
            font.default_width = DEFAULT_CID_WIDTH;
            if let Some(descendant) = descendant_font(doc, dict) {
                if let Some(dw) = descendant.get(b"DW").ok().and_then(|o| object_to_f64(o).ok()) {
                    font.default_width = dw;
                }
                if let Ok(w) = descendant.get(b"W") {
                    font.cid_widths = parse_cid_widths(doc, resolve(doc, w));
                }
            }
        } else {
            font.first_char = dict
                .get(b"FirstChar")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0);
            if let Some(widths) = dict
                .get(b"Widths")
                .ok()
                .and_then(|o| resolve(doc, o).as_array().ok())
            {
                font.widths = widths
                    .iter()
                    .map(|w| object_to_f64(resolve(doc, w)).unwrap_or(0.0))
                    .collect();
            }
            if let Some(missing) = dict
                .get(b"FontDescriptor")
                .ok()
                .and_then(|o| resolve(doc, o).as_dict().ok())
                .and_then(|fd| fd.get(b"MissingWidth").ok())
                .and_then(|o| object_to_f64(o).ok())
            {
                font.default_width = missing;
            }
        }

        font.to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| resolve(doc, o).as_stream().ok())
            .and_then(stream_bytes)
            .and_then(|bytes| match ToUnicode::parse(&bytes) {
                Ok(cmap) => Some(cmap),
                Err(e) => {
                    debug!(font = %font.base_name, "ignoring ToUnicode map: {e}");
                    None
                }
            });

        font
    }

    /// Font name without a subset prefix.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.composite {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => (u32::from(*hi) << 8) | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Horizontal displacement of a glyph in 1/1000 text space units.
    pub fn width(&self, code: u32) -> f64 {
        if self.composite {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize).copied())
            .or_else(|| self.standard.and_then(|s| s.width(code)))
            .unwrap_or(self.default_width)
    }

    /// Unicode text for a character code.
    ///
    /// Uses the ToUnicode map when present. Simple fonts otherwise read the
    /// code as Latin-1.
    pub fn decode(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.lookup(code)) {
            return text.to_string();
        }
        if self.composite {
            return char::REPLACEMENT_CHARACTER.to_string();
        }
        char::from_u32(code)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string()
    }

    /// Whether word spacing (`Tw`) applies to this code.
    pub fn is_word_space(&self, code: u32) -> bool {
        !self.composite && code == 32
    }
}

fn descendant_font<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    let array = resolve(doc, dict.get(b"DescendantFonts").ok()?).as_array().ok()?;
    resolve(doc, array.first()?).as_dict().ok()
}

/// Parse a CID `/W` array: `c [w1 w2 ...]` and `c_first c_last w` entries.
fn parse_cid_widths(doc: &Document, w: &Object) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let Ok(items) = w.as_array() else {
        return widths;
    };

    let mut i = 0;
    while i < items.len() {
        let Some(start) = items[i].as_i64().ok().and_then(|v| u32::try_from(v).ok()) else {
            break;
        };
        match items.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (offset, width) in list.iter().enumerate() {
                    let Some(cid) = u32::try_from(offset).ok().and_then(|o| start.checked_add(o))
                    else {
                        debug!(start, "CID width list runs past the code space");
                        break;
                    };
                    if let Ok(width) = object_to_f64(width) {
                        widths.insert(cid, width);
                    }
                }
                i += 2;
            }
            Some(end) => {
                let end = end.as_i64().ok().and_then(|v| u32::try_from(v).ok());
                let width = items.get(i + 2).and_then(|o| object_to_f64(o).ok());
                match (end, width) {
                    (Some(end), Some(_)) if end.saturating_sub(start) > MAX_CID_RANGE => {
                        debug!(start, end, "ignoring oversized CID width range");
                    }
                    (Some(end), Some(width)) => {
                        for cid in start..=end {
                            widths.insert(cid, width);
                        }
                    }
                    _ => break,
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

/// Remove a subset tag such as `ABCDEF+` from a font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}
