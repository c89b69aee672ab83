//! Edges: axis-aligned line segments used by table detection.
//!
//! Ruling edges come from painted paths (straight segments and the four
//! sides of rectangles). Stream edges are synthesized from text alignment.

use crate::geometry::{BBox, Orientation};

/// Where an edge was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSource {
    /// A straight path segment.
    Line,
    /// One side of a rectangle.
    Rect,
    /// Synthetic edge generated from text alignment (stream detection).
    Stream,
}

/// A line segment edge for table detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Left x coordinate.
    pub x0: f64,
    /// Top y coordinate (distance from top of page).
    pub top: f64,
    /// Right x coordinate.
    pub x1: f64,
    /// Bottom y coordinate (distance from top of page).
    pub bottom: f64,
    pub orientation: Orientation,
    pub source: EdgeSource,
}

impl Edge {
    pub fn horizontal(x0: f64, x1: f64, y: f64, source: EdgeSource) -> Self {
        Self {
            x0: x0.min(x1),
            top: y,
            x1: x0.max(x1),
            bottom: y,
            orientation: Orientation::Horizontal,
            source,
        }
    }

    pub fn vertical(x: f64, top: f64, bottom: f64, source: EdgeSource) -> Self {
        Self {
            x0: x,
            top: top.min(bottom),
            x1: x,
            bottom: top.max(bottom),
            orientation: Orientation::Vertical,
            source,
        }
    }

    /// Length along the edge's own axis.
    pub fn length(&self) -> f64 {
        let dx = self.x1 - self.x0;
        let dy = self.bottom - self.top;
        (dx * dx + dy * dy).sqrt()
    }
}

const AXIS_TOLERANCE: f64 = 1e-6;

/// Build an edge from two points already in top-left page coordinates.
pub fn edge_from_segment(p0: (f64, f64), p1: (f64, f64)) -> Edge {
    let (x0, y0) = p0;
    let (x1, y1) = p1;
    let orientation = if (y1 - y0).abs() < AXIS_TOLERANCE {
        Orientation::Horizontal
    } else if (x1 - x0).abs() < AXIS_TOLERANCE {
        Orientation::Vertical
    } else {
        Orientation::Diagonal
    };
    Edge {
        x0: x0.min(x1),
        top: y0.min(y1),
        x1: x0.max(x1),
        bottom: y0.max(y1),
        orientation,
        source: EdgeSource::Line,
    }
}

/// The four sides of a rectangle: top, bottom, left, right.
pub fn edges_from_rect(rect: &BBox) -> [Edge; 4] {
    [
        Edge::horizontal(rect.x0, rect.x1, rect.top, EdgeSource::Rect),
        Edge::horizontal(rect.x0, rect.x1, rect.bottom, EdgeSource::Rect),
        Edge::vertical(rect.x0, rect.top, rect.bottom, EdgeSource::Rect),
        Edge::vertical(rect.x1, rect.top, rect.bottom, EdgeSource::Rect),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_orientation() {
        assert_eq!(
            edge_from_segment((0.0, 5.0), (10.0, 5.0)).orientation,
            Orientation::Horizontal
        );
        assert_eq!(
            edge_from_segment((3.0, 0.0), (3.0, 8.0)).orientation,
            Orientation::Vertical
        );
        assert_eq!(
            edge_from_segment((0.0, 0.0), (4.0, 3.0)).orientation,
            Orientation::Diagonal
        );
    }

    #[test]
    fn segment_coordinates_are_normalized() {
        let e = edge_from_segment((10.0, 8.0), (2.0, 8.0));
        assert_eq!((e.x0, e.x1), (2.0, 10.0));
        assert_eq!(e.length(), 8.0);
    }

    #[test]
    fn rect_has_four_sides() {
        let sides = edges_from_rect(&BBox::new(0.0, 0.0, 20.0, 10.0));
        let horizontals = sides
            .iter()
            .filter(|e| e.orientation == Orientation::Horizontal)
            .count();
        assert_eq!(horizontals, 2);
        assert!(sides.iter().all(|e| e.source == EdgeSource::Rect));
        assert_eq!(sides[3].x0, 20.0);
    }
}
