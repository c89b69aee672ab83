//! Raw string tables and cleaned, column-labelled frames.
//!
//! A [`RawTable`] is what extraction produces: a grid of cell strings plus a
//! note on whether its first row holds the column labels. [`clean`] turns it
//! into a [`Frame`] of numeric values restricted to the target columns, and
//! [`Frame::concat`] merges frames from many documents into one dataset.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// How the column labels of a [`RawTable`] are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The first row holds the column labels.
    HeaderRow,
    /// No labels; columns are named by position (`0`, `1`, ...).
    Unlabeled,
}

/// A table of cell strings as produced by an extraction strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub layout: Layout,
    /// Rows in reading order. Rows may differ in length.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn header_row(rows: Vec<Vec<String>>) -> Self {
        Self {
            layout: Layout::HeaderRow,
            rows,
        }
    }

    pub fn unlabeled(rows: Vec<Vec<String>>) -> Self {
        Self {
            layout: Layout::Unlabeled,
            rows,
        }
    }

    /// A table is empty when it has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Number of columns: the length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A single cell of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Number(f64),
    Text(String),
}

impl Value {
    /// Coerce a raw cell to a number.
    ///
    /// Surrounding whitespace is ignored. Blank, unparsable and NaN cells
    /// become [`Value::Missing`]. `inf` and `infinity` (any case, optionally
    /// signed) are kept as infinite numbers and written back as `inf`.
    pub fn coerce(raw: &str) -> Value {
        match raw.trim().parse::<f64>() {
            Ok(n) if !n.is_nan() => Value::Number(n),
            _ => Value::Missing,
        }
    }
}

/// Missing cells render as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Labelled columns over rows of [`Value`]s.
///
/// Every row has exactly one value per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Build a frame, padding short rows with [`Value::Missing`] and
    /// truncating long ones to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Missing);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// A frame without rows or without columns carries no data.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Values of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Set every row of column `name` to `value`.
    ///
    /// An existing column of that name is overwritten in place; otherwise
    /// the column is appended.
    pub fn with_column(mut self, name: &str, value: Value) -> Self {
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
        self
    }

    /// Keep only the named columns, in the order given. Unknown names are
    /// skipped.
    pub fn select(&self, names: &[&str]) -> Frame {
        let picks: Vec<usize> = names
            .iter()
            .filter_map(|name| self.columns.iter().position(|c| c == name))
            .collect();
        Frame {
            columns: picks.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| picks.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Stack frames vertically.
    ///
    /// The result's columns are the union of all input columns in order of
    /// first appearance; cells a frame does not have are
    /// [`Value::Missing`].
    pub fn concat(frames: &[Frame]) -> Frame {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for frame in frames {
            for name in &frame.columns {
                if !index.contains_key(name.as_str()) {
                    index.insert(name.as_str(), columns.len());
                    columns.push(name.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(frames.iter().map(Frame::len).sum());
        for frame in frames {
            let positions: Vec<usize> = frame.columns.iter().map(|c| index[c.as_str()]).collect();
            for row in &frame.rows {
                let mut out = vec![Value::Missing; columns.len()];
                for (value, &pos) in row.iter().zip(&positions) {
                    out[pos] = value.clone();
                }
                rows.push(out);
            }
        }

        Frame { columns, rows }
    }
}

/// Normalize a header label: line breaks collapse to a single space and
/// surrounding whitespace is trimmed.
pub fn normalize_label(raw: &str) -> String {
    raw.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Column labels for a table `width` columns wide.
///
/// Blank labels take their column position; repeated labels get `.1`,
/// `.2`, ... suffixes in order of appearance.
fn column_labels(header: Option<&[String]>, width: usize) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut labels = Vec::with_capacity(width);

    for i in 0..width {
        let base = header
            .and_then(|h| h.get(i))
            .map(|raw| normalize_label(raw))
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| i.to_string());

        let mut label = base.clone();
        while taken.contains(&label) {
            let n = counts.entry(base.clone()).or_insert(0);
            *n += 1;
            label = format!("{base}.{n}");
        }
        taken.insert(label.clone());
        labels.push(label);
    }
    labels
}

/// Clean one raw table into a numeric frame.
///
/// Labels are normalized (see [`normalize_label`]), every cell is coerced
/// with [`Value::coerce`], and if any of `targets` is among the labels the
/// frame is restricted to exactly those target columns, in `targets`
/// order. An empty raw table gives an empty frame.
pub fn clean(raw: &RawTable, targets: &[String]) -> Frame {
    if raw.is_empty() {
        return Frame::default();
    }

    let width = raw.width();
    let (header, body) = match raw.layout {
        Layout::HeaderRow => match raw.rows.split_first() {
            Some((first, rest)) => (Some(first.as_slice()), rest),
            None => (None, &raw.rows[..]),
        },
        Layout::Unlabeled => (None, &raw.rows[..]),
    };

    let columns = column_labels(header, width);
    let rows = body
        .iter()
        .map(|row| row.iter().map(|cell| Value::coerce(cell)).collect())
        .collect();
    let frame = Frame::new(columns, rows);

    let present: Vec<&str> = targets
        .iter()
        .map(String::as_str)
        .filter(|t| frame.columns.iter().any(|c| c == t))
        .collect();
    if present.is_empty() {
        frame
    } else {
        frame.select(&present)
    }
}
