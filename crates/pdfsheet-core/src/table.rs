//! Table detection types and pipeline.
//!
//! Provides the configuration types, data structures and orchestration for
//! detecting tables in PDF pages using the Lattice or Stream strategy.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::edges::{Edge, EdgeSource};
use crate::geometry::{BBox, Orientation};
use crate::text::Char;
use crate::words::{Word, WordExtractor, WordOptions, words_to_lines};

/// Strategy for table detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Detect tables from visible ruling lines and rectangle sides.
    #[default]
    Lattice,
    /// Detect tables from text alignment (no visible borders needed).
    Stream,
}

/// Configuration for table detection.
///
/// All tolerances default to 3.0 points.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSettings {
    pub strategy: Strategy,
    /// Parallel edges closer than this are snapped to a common position.
    pub snap_tolerance: f64,
    /// Collinear segments separated by at most this gap are joined.
    pub join_tolerance: f64,
    /// Edges shorter than this are ignored.
    pub edge_min_length: f64,
    /// Minimum words sharing a left edge before Stream treats it as a column.
    pub min_words_vertical: usize,
    /// Tolerance for grouping words by alignment (Stream) and into lines.
    pub text_tolerance: f64,
    /// Slack allowed when deciding whether two edges cross.
    pub intersection_tolerance: f64,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            edge_min_length: 3.0,
            min_words_vertical: 3,
            text_tolerance: 3.0,
            intersection_tolerance: 3.0,
        }
    }
}

impl TableSettings {
    /// Default settings with the given strategy.
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

/// A detected table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub bbox: BBox,
    /// Text content within the cell, if any.
    pub text: Option<String>,
}

/// A detected table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Bounding box enclosing the entire table.
    pub bbox: BBox,
    /// Cells organized into rows (top-to-bottom, left-to-right within each row).
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Text of every cell laid out on the table's column grid.
    ///
    /// Columns are the distinct left boundaries of all cells, so a row that
    /// lacks a cell (merged or missing ruling) gets an empty string in that
    /// position instead of shifting its remaining cells left.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let column_keys: BTreeSet<i64> = self
            .rows
            .iter()
            .flatten()
            .map(|cell| float_key(cell.bbox.x0))
            .collect();
        let column_index: HashMap<i64, usize> = column_keys
            .iter()
            .enumerate()
            .map(|(i, key)| (*key, i))
            .collect();

        self.rows
            .iter()
            .map(|row| {
                let mut out = vec![String::new(); column_keys.len()];
                for cell in row {
                    let idx = column_index[&float_key(cell.bbox.x0)];
                    out[idx] = cell.text.clone().unwrap_or_default();
                }
                out
            })
            .collect()
    }
}

/// Snap nearby parallel edges to aligned positions.
///
/// Horizontal edges cluster by y, vertical edges by x; each cluster takes
/// the mean position. Diagonal edges pass through unchanged.
pub fn snap_edges(edges: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    let (mut horizontals, mut verticals, mut result) = split_by_orientation(edges);

    snap_group(&mut horizontals, tolerance, |e| e.top, |e, v| {
        e.top = v;
        e.bottom = v;
    });
    snap_group(&mut verticals, tolerance, |e| e.x0, |e, v| {
        e.x0 = v;
        e.x1 = v;
    });

    result.extend(horizontals);
    result.extend(verticals);
    result
}

fn split_by_orientation(edges: Vec<Edge>) -> (Vec<Edge>, Vec<Edge>, Vec<Edge>) {
    let mut horizontals = Vec::new();
    let mut verticals = Vec::new();
    let mut other = Vec::new();
    for edge in edges {
        match edge.orientation {
            Orientation::Horizontal => horizontals.push(edge),
            Orientation::Vertical => verticals.push(edge),
            Orientation::Diagonal => other.push(edge),
        }
    }
    (horizontals, verticals, other)
}

/// Cluster edges along one axis and move each cluster to its mean.
fn snap_group<F, G>(edges: &mut [Edge], tolerance: f64, key: F, mut set: G)
where
    F: Fn(&Edge) -> f64,
    G: FnMut(&mut Edge, f64),
{
    edges.sort_by(|a, b| key(a).total_cmp(&key(b)));

    let mut start = 0;
    for i in 1..=edges.len() {
        let end_of_cluster = i == edges.len() || (key(&edges[i]) - key(&edges[start])) > tolerance;
        if end_of_cluster {
            let sum: f64 = edges[start..i].iter().map(&key).sum();
            let mean = sum / (i - start) as f64;
            for edge in &mut edges[start..i] {
                set(edge, mean);
            }
            start = i;
        }
    }
}

/// Merge overlapping or nearly touching collinear segments.
pub fn join_edges(edges: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    let (horizontals, verticals, mut result) = split_by_orientation(edges);

    result.extend(join_collinear(
        horizontals,
        |e| e.top,
        |e| (e.x0, e.x1),
        |proto, start, end| Edge {
            x0: start,
            x1: end,
            ..proto.clone()
        },
        tolerance,
    ));
    result.extend(join_collinear(
        verticals,
        |e| e.x0,
        |e| (e.top, e.bottom),
        |proto, start, end| Edge {
            top: start,
            bottom: end,
            ..proto.clone()
        },
        tolerance,
    ));
    result
}

fn join_collinear<K, S, B>(
    mut edges: Vec<Edge>,
    key: K,
    span: S,
    build: B,
    tolerance: f64,
) -> Vec<Edge>
where
    K: Fn(&Edge) -> f64,
    S: Fn(&Edge) -> (f64, f64),
    B: Fn(&Edge, f64, f64) -> Edge,
{
    edges.sort_by(|a, b| {
        key(a)
            .total_cmp(&key(b))
            .then_with(|| span(a).0.total_cmp(&span(b).0))
    });

    let mut result = Vec::new();
    let mut i = 0;
    while i < edges.len() {
        // After snapping, collinear edges share the exact same key.
        let line = key(&edges[i]);
        let mut j = i + 1;
        while j < edges.len() && (key(&edges[j]) - line).abs() < 1e-9 {
            j += 1;
        }

        let (mut cur_start, mut cur_end) = span(&edges[i]);
        let mut proto = i;
        for k in (i + 1)..j {
            let (s, e) = span(&edges[k]);
            if s <= cur_end + tolerance {
                cur_end = cur_end.max(e);
            } else {
                result.push(build(&edges[proto], cur_start, cur_end));
                (cur_start, cur_end, proto) = (s, e, k);
            }
        }
        result.push(build(&edges[proto], cur_start, cur_end));
        i = j;
    }
    result
}

/// An intersection point between a horizontal and a vertical edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub x: f64,
    pub y: f64,
}

/// Find every point where a vertical edge crosses a horizontal one.
///
/// Only actual segment overlaps count (with `tolerance` of slack on both
/// axes), never infinite line extensions. Results are sorted and unique.
pub fn edges_to_intersections(edges: &[Edge], tolerance: f64) -> Vec<Intersection> {
    let horizontals = edges
        .iter()
        .filter(|e| e.orientation == Orientation::Horizontal);

    let mut seen = HashSet::new();
    let mut points = Vec::new();
    for h in horizontals {
        let y = h.top;
        for v in edges
            .iter()
            .filter(|e| e.orientation == Orientation::Vertical)
        {
            let x = v.x0;
            let crosses = x >= h.x0 - tolerance
                && x <= h.x1 + tolerance
                && y >= v.top - tolerance
                && y <= v.bottom + tolerance;
            if crosses && seen.insert((float_key(x), float_key(y))) {
                points.push(Intersection { x, y });
            }
        }
    }

    points.sort_by(|a, b| a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y)));
    points
}

/// Build rectangular cells from intersection points.
///
/// Starting from each point as a top-left corner, the smallest rectangle
/// whose four corners are intersections and whose four sides are covered
/// by edges becomes a cell. Cells spanning merged rows or columns are found
/// because the inner corners are not connected.
pub fn intersections_to_cells(
    intersections: &[Intersection],
    edges: &[Edge],
    tolerance: f64,
) -> Vec<Cell> {
    let present: HashSet<(i64, i64)> = intersections
        .iter()
        .map(|p| (float_key(p.x), float_key(p.y)))
        .collect();
    let has = |x: f64, y: f64| present.contains(&(float_key(x), float_key(y)));
    let h_connected = |y: f64, xa: f64, xb: f64| {
        edges.iter().any(|e| {
            e.orientation == Orientation::Horizontal
                && (e.top - y).abs() <= tolerance
                && e.x0 - tolerance <= xa.min(xb)
                && e.x1 + tolerance >= xa.max(xb)
        })
    };
    let v_connected = |x: f64, ya: f64, yb: f64| {
        edges.iter().any(|e| {
            e.orientation == Orientation::Vertical
                && (e.x0 - x).abs() <= tolerance
                && e.top - tolerance <= ya.min(yb)
                && e.bottom + tolerance >= ya.max(yb)
        })
    };

    let mut cells = Vec::new();
    for (i, corner) in intersections.iter().enumerate() {
        let rest = &intersections[i + 1..];
        let below = rest.iter().filter(|p| float_key(p.x) == float_key(corner.x));
        let found = below
            .filter(|b| v_connected(corner.x, corner.y, b.y))
            .find_map(|b| {
                rest.iter()
                    .filter(|p| float_key(p.y) == float_key(corner.y))
                    .filter(|r| h_connected(corner.y, corner.x, r.x))
                    .find(|r| {
                        has(r.x, b.y) && v_connected(r.x, r.y, b.y) && h_connected(b.y, b.x, r.x)
                    })
                    .map(|r| BBox::new(corner.x, corner.y, r.x, b.y))
            });
        if let Some(bbox) = found {
            cells.push(Cell { bbox, text: None });
        }
    }
    cells
}

/// Group cells that share a boundary into distinct tables.
///
/// Uses union-find over shared edges. Tables come back ordered
/// top-to-bottom, then left-to-right.
pub fn cells_to_tables(cells: Vec<Cell>) -> Vec<Table> {
    let n = cells.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if cells_share_edge(&cells[i], &cells[j]) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<Cell>> = BTreeMap::new();
    for (i, cell) in cells.into_iter().enumerate() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(cell);
    }

    let mut tables: Vec<Table> = groups
        .into_values()
        .map(|group| {
            let bbox = group
                .iter()
                .skip(1)
                .fold(group[0].bbox, |acc, c| acc.union(&c.bbox));

            let mut row_map: BTreeMap<i64, Vec<Cell>> = BTreeMap::new();
            for cell in group {
                row_map.entry(float_key(cell.bbox.top)).or_default().push(cell);
            }
            let rows = row_map
                .into_values()
                .map(|mut row| {
                    row.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
                    row
                })
                .collect();

            Table { bbox, rows }
        })
        .collect();

    tables.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });
    tables
}

fn cells_share_edge(a: &Cell, b: &Cell) -> bool {
    let eps = 1e-6;
    let shared_vertical = ((a.bbox.x1 - b.bbox.x0).abs() < eps
        || (a.bbox.x0 - b.bbox.x1).abs() < eps)
        && a.bbox.top < b.bbox.bottom + eps
        && b.bbox.top < a.bbox.bottom + eps;
    let shared_horizontal = ((a.bbox.bottom - b.bbox.top).abs() < eps
        || (a.bbox.top - b.bbox.bottom).abs() < eps)
        && a.bbox.x0 < b.bbox.x1 + eps
        && b.bbox.x0 < a.bbox.x1 + eps;
    shared_vertical || shared_horizontal
}

/// Integer key for grouping floats (3 decimal places).
fn float_key(v: f64) -> i64 {
    (v * 1000.0).round() as i64
}

/// Fill each cell with the text of the chars whose center lies inside it.
///
/// Words on the same line are joined with spaces, lines with `\n`.
/// Cells without chars get `None`.
pub fn extract_text_for_cells(cells: &mut [Cell], chars: &[Char], options: &WordOptions) {
    for cell in cells.iter_mut() {
        let inside: Vec<Char> = chars
            .iter()
            .filter(|ch| {
                let (cx, cy) = ch.bbox.center();
                cell.bbox.contains(cx, cy)
            })
            .cloned()
            .collect();

        let words = WordExtractor::extract(&inside, options);
        cell.text = if words.is_empty() {
            None
        } else {
            let text = words_to_lines(&words, options.y_tolerance)
                .iter()
                .map(|line| {
                    line.iter()
                        .map(|w| w.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join("\n");
            Some(text)
        };
    }
}

/// Synthesize a ruling grid from text alignment for the Stream strategy.
///
/// Column boundaries sit at clusters of word left edges holding at least
/// `min_words_vertical` words; row boundaries sit at each text line's top.
/// The outer frame is the extent of all words, so every boundary spans the
/// whole text block and the grid closes. Returns no edges when no column
/// cluster qualifies.
pub fn words_to_edges_stream(
    words: &[Word],
    text_tolerance: f64,
    min_words_vertical: usize,
) -> Vec<Edge> {
    if words.is_empty() || min_words_vertical == 0 {
        return Vec::new();
    }

    let columns = cluster_positions(words, |w| w.bbox.x0, text_tolerance, min_words_vertical);
    if columns.is_empty() {
        return Vec::new();
    }
    let rows = cluster_positions(words, |w| w.bbox.top, text_tolerance, 1);

    let extent = words
        .iter()
        .skip(1)
        .fold(words[0].bbox, |acc, w| acc.union(&w.bbox));
    let first_row = rows.first().copied().unwrap_or(extent.top);

    let mut edges = Vec::new();
    for x in std::iter::once(extent.x0)
        .chain(columns)
        .chain(std::iter::once(extent.x1))
    {
        edges.push(Edge::vertical(x, first_row, extent.bottom, EdgeSource::Stream));
    }
    for y in rows.into_iter().chain(std::iter::once(extent.bottom)) {
        edges.push(Edge::horizontal(extent.x0, extent.x1, y, EdgeSource::Stream));
    }
    edges
}

/// Mean positions of word clusters along one coordinate.
fn cluster_positions<F>(words: &[Word], key: F, tolerance: f64, min_size: usize) -> Vec<f64>
where
    F: Fn(&Word) -> f64,
{
    let mut values: Vec<f64> = words.iter().map(key).collect();
    values.sort_by(f64::total_cmp);

    let mut positions = Vec::new();
    let mut start = 0;
    for i in 1..=values.len() {
        if i == values.len() || values[i] - values[start] > tolerance {
            let size = i - start;
            if size >= min_size {
                positions.push(values[start..i].iter().sum::<f64>() / size as f64);
            }
            start = i;
        }
    }
    positions
}

/// Runs the table detection pipeline over one page's content.
pub struct TableFinder<'a> {
    edges: Vec<Edge>,
    chars: &'a [Char],
    settings: TableSettings,
}

impl<'a> TableFinder<'a> {
    /// `edges` are the page's ruling edges; `chars` fill the detected cells.
    pub fn new(edges: Vec<Edge>, chars: &'a [Char], settings: TableSettings) -> Self {
        Self {
            edges,
            chars,
            settings,
        }
    }

    /// Detect tables and fill their cells with text.
    ///
    /// Pipeline: select edges → drop short ones → snap → join →
    /// intersections → cells → tables.
    pub fn find_tables(&self) -> Vec<Table> {
        let word_options = WordOptions {
            x_tolerance: self.settings.text_tolerance,
            y_tolerance: self.settings.text_tolerance,
        };

        let edges = match self.settings.strategy {
            Strategy::Lattice => self
                .edges
                .iter()
                .filter(|e| matches!(e.source, EdgeSource::Line | EdgeSource::Rect))
                .cloned()
                .collect(),
            Strategy::Stream => {
                let words = WordExtractor::extract(self.chars, &word_options);
                words_to_edges_stream(
                    &words,
                    self.settings.text_tolerance,
                    self.settings.min_words_vertical,
                )
            }
        };

        let edges: Vec<Edge> = edges
            .into_iter()
            .filter(|e| e.orientation != Orientation::Diagonal)
            .filter(|e| e.length() >= self.settings.edge_min_length)
            .collect();
        if edges.is_empty() {
            return Vec::new();
        }

        let edges = snap_edges(edges, self.settings.snap_tolerance);
        let edges = join_edges(edges, self.settings.join_tolerance);
        let intersections = edges_to_intersections(&edges, self.settings.intersection_tolerance);
        let cells = intersections_to_cells(
            &intersections,
            &edges,
            self.settings.intersection_tolerance,
        );
        let mut tables = cells_to_tables(cells);

        for table in &mut tables {
            for row in &mut table.rows {
                extract_text_for_cells(row, self.chars, &word_options);
            }
        }
        tables
    }
}
