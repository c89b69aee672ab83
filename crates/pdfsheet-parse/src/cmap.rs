//! ToUnicode CMap parsing.
//!
//! Handles the subset of the CMap language found in `/ToUnicode` streams:
//! `codespacerange` (code width), `bfchar` and `bfrange` blocks with
//! UTF-16BE destinations. Anything else in the stream is skipped.

use std::collections::HashMap;

use tracing::debug;

use crate::error::BackendError;

/// Widest `bfrange` accepted, in codes.
const MAX_RANGE_SPAN: u32 = 0xFFFF;

/// Maps character codes of one font to Unicode text.
#[derive(Debug, Clone, Default)]
pub struct ToUnicode {
    mappings: HashMap<u32, String>,
    code_bytes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(String),
    ArrayStart,
    ArrayEnd,
    Keyword(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    CodeSpace,
    BfChar,
    BfRange,
}

impl ToUnicode {
    /// Parse the decoded bytes of a ToUnicode stream.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(data);
        let tokens = tokenize(&text)?;

        let mut cmap = ToUnicode::default();
        let mut section = Section::None;
        let mut operands: Vec<Token> = Vec::new();

        for token in tokens {
            match token {
                Token::Keyword(word) => {
                    match word.as_str() {
                        "begincodespacerange" => section = Section::CodeSpace,
                        "beginbfchar" => section = Section::BfChar,
                        "beginbfrange" => section = Section::BfRange,
                        w if w.starts_with("end") => section = Section::None,
                        _ => {}
                    }
                    operands.clear();
                }
                other => {
                    if section == Section::None {
                        continue;
                    }
                    operands.push(other);
                    if cmap.consume(section, &operands)? {
                        operands.clear();
                    }
                }
            }
        }

        Ok(cmap)
    }

    /// Apply a complete entry of the current section; returns whether the
    /// buffered operands formed one.
    fn consume(&mut self, section: Section, ops: &[Token]) -> Result<bool, BackendError> {
        match (section, ops) {
            (Section::CodeSpace, [Token::Hex(lo), Token::Hex(_)]) => {
                let width = lo.len().div_ceil(2);
                self.code_bytes = Some(self.code_bytes.map_or(width, |w| w.max(width)));
                Ok(true)
            }
            (Section::BfChar, [Token::Hex(src), Token::Hex(dst)]) => {
                self.note_width(src);
                self.mappings.insert(parse_code(src)?, decode_utf16be(dst)?);
                Ok(true)
            }
            (Section::BfRange, [Token::Hex(lo), Token::Hex(hi), Token::Hex(dst)]) => {
                self.note_width(lo);
                let (lo, hi) = (parse_code(lo)?, parse_code(hi)?);
                if hi.saturating_sub(lo) > MAX_RANGE_SPAN {
                    debug!(lo, hi, "ignoring oversized bfrange");
                    return Ok(true);
                }
                let base = decode_utf16be(dst)?;
                for (offset, code) in (lo..=hi).enumerate() {
                    self.mappings.insert(code, offset_last_char(&base, offset as u32));
                }
                Ok(true)
            }
            (Section::BfRange, [Token::Hex(lo), Token::Hex(hi), Token::ArrayStart, rest @ ..])
                if rest.last() == Some(&Token::ArrayEnd) =>
            {
                self.note_width(lo);
                let (lo, hi) = (parse_code(lo)?, parse_code(hi)?);
                let targets = rest.iter().filter_map(|t| match t {
                    Token::Hex(h) => Some(h),
                    _ => None,
                });
                for (code, dst) in (lo..=hi).zip(targets) {
                    self.mappings.insert(code, decode_utf16be(dst)?);
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn note_width(&mut self, src_hex: &str) {
        if self.code_bytes.is_none() {
            self.code_bytes = Some(src_hex.len().div_ceil(2));
        }
    }

    /// Unicode text for a character code.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// Byte width of codes in this map, when the map declares or implies one.
    pub fn code_bytes(&self) -> Option<usize> {
        self.code_bytes
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, BackendError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '<' => {
                if chars.peek().map(|(_, n)| *n) == Some('<') {
                    // dictionary open, irrelevant here
                    chars.next();
                    continue;
                }
                let mut hex = String::new();
                loop {
                    match chars.next() {
                        Some((_, '>')) => break,
                        Some((_, h)) if h.is_ascii_hexdigit() => hex.push(h),
                        Some((_, h)) if h.is_whitespace() => {}
                        Some((_, h)) => {
                            return Err(BackendError::Font(format!(
                                "invalid character {h:?} in CMap hex string"
                            )));
                        }
                        None => {
                            return Err(BackendError::Font(
                                "unterminated hex string in CMap".to_string(),
                            ));
                        }
                    }
                }
                tokens.push(Token::Hex(hex));
            }
            '>' => {}
            '[' => tokens.push(Token::ArrayStart),
            ']' => tokens.push(Token::ArrayEnd),
            '%' => {
                for (_, n) in chars.by_ref() {
                    if n == '\n' || n == '\r' {
                        break;
                    }
                }
            }
            '(' => {
                // literal strings only appear in CIDSystemInfo; skip them
                let mut depth = 1;
                for (_, n) in chars.by_ref() {
                    match n {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
            c if c.is_whitespace() => {}
            _ => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, n)) = chars.peek() {
                    if n.is_whitespace() || "<>[]()%/".contains(n) {
                        break;
                    }
                    end = i + n.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Keyword(text[start..end].to_string()));
            }
        }
    }

    Ok(tokens)
}

fn parse_code(hex: &str) -> Result<u32, BackendError> {
    u32::from_str_radix(hex, 16)
        .map_err(|e| BackendError::Font(format!("invalid CMap code <{hex}>: {e}")))
}

/// Decode a hex string holding UTF-16BE code units.
fn decode_utf16be(hex: &str) -> Result<String, BackendError> {
    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| {
            let pair = &hex[i..(i + 2).min(hex.len())];
            u8::from_str_radix(pair, 16)
                .map_err(|e| BackendError::Font(format!("invalid CMap value <{hex}>: {e}")))
        })
        .collect::<Result<Vec<u8>, _>>()?;

    if bytes.len() == 1 {
        return Ok(char::from(bytes[0]).to_string());
    }

    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| u16::from_be_bytes([c[0], *c.get(1).unwrap_or(&0)]))
        .collect();
    Ok(char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

/// `base` with its last character advanced by `offset` code points.
fn offset_last_char(base: &str, offset: u32) -> String {
    let mut chars: Vec<char> = base.chars().collect();
    if let Some(last) = chars.last_mut() {
        *last = (*last as u32)
            .checked_add(offset)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
    }
    chars.into_iter().collect()
}
