//! Conversion of interpreter events into page objects.
//!
//! PDF user space has its origin at the bottom-left of the media box; page
//! objects use a top-left origin, so every y is flipped against the top of
//! the media box and every x is shifted by its left side.

use pdfsheet_core::{BBox, Char, Edge, edge_from_segment, edges_from_rect};

use crate::handler::{CharEvent, PathEvent};

/// Glyph extent above the baseline, in em.
const ASCENT: f64 = 0.8;
/// Glyph extent below the baseline, in em.
const DESCENT: f64 = -0.2;

/// Flip a user-space point into top-left page coordinates.
fn to_page(media_box: &BBox, (x, y): (f64, f64)) -> (f64, f64) {
    // media_box.bottom holds the PDF y1 (top edge in user space)
    (x - media_box.x0, media_box.bottom - y)
}

/// Build a [`Char`] with its bounding box in top-left page coordinates.
pub fn char_from_event(event: &CharEvent, media_box: &BBox) -> Char {
    let corners = [
        (0.0, DESCENT),
        (event.width, DESCENT),
        (event.width, ASCENT),
        (0.0, ASCENT),
    ]
    .map(|(gx, gy)| to_page(media_box, event.trm.transform_point(gx, gy)));

    let (mut x0, mut top) = corners[0];
    let (mut x1, mut bottom) = corners[0];
    for (x, y) in &corners[1..] {
        x0 = x0.min(*x);
        x1 = x1.max(*x);
        top = top.min(*y);
        bottom = bottom.max(*y);
    }

    Char {
        text: event.text.clone(),
        bbox: BBox::new(x0, top, x1, bottom),
        fontname: event.font_name.clone(),
        size: event.font_size,
    }
}

/// Ruling edges of a painted path, in top-left page coordinates.
///
/// Rectangles drawn with `re` contribute their four sides; every other
/// straight segment becomes one edge. Zero-length segments are dropped.
pub fn edges_from_path(event: &PathEvent, media_box: &BBox) -> Vec<Edge> {
    let mut edges = Vec::new();
    for subpath in &event.subpaths {
        let points: Vec<(f64, f64)> = subpath
            .points
            .iter()
            .map(|p| to_page(media_box, *p))
            .collect();

        if subpath.rect && is_axis_aligned_rect(&points) {
            let bbox = points
                .iter()
                .fold(BBox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN), |b, (x, y)| {
                    BBox::new(b.x0.min(*x), b.top.min(*y), b.x1.max(*x), b.bottom.max(*y))
                });
            edges.extend(edges_from_rect(&bbox));
            continue;
        }

        for (p0, p1) in subpath.segments() {
            let (a, b) = (to_page(media_box, p0), to_page(media_box, p1));
            if a != b {
                edges.push(edge_from_segment(a, b));
            }
        }
    }
    edges
}

fn is_axis_aligned_rect(points: &[(f64, f64)]) -> bool {
    const EPS: f64 = 1e-6;
    points.len() == 4
        && (0..4).all(|i| {
            let (a, b) = (points[i], points[(i + 1) % 4]);
            (a.0 - b.0).abs() < EPS || (a.1 - b.1).abs() < EPS
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{PaintOp, Subpath};
    use pdfsheet_core::{EdgeSource, Matrix, Orientation};

    fn letter() -> BBox {
        BBox::new(0.0, 0.0, 612.0, 792.0)
    }

    #[test]
    fn char_box_is_flipped() {
        let event = CharEvent {
            text: "A".to_string(),
            font_name: "Helvetica".to_string(),
            font_size: 10.0,
            trm: Matrix::new(10.0, 0.0, 0.0, 10.0, 72.0, 700.0),
            width: 0.5,
        };
        let ch = char_from_event(&event, &letter());
        assert_eq!(ch.bbox.x0, 72.0);
        assert_eq!(ch.bbox.x1, 77.0);
        assert!((ch.bbox.top - (792.0 - 708.0)).abs() < 1e-9);
        assert!((ch.bbox.bottom - (792.0 - 698.0)).abs() < 1e-9);
        assert_eq!(ch.size, 10.0);
    }

    #[test]
    fn offset_media_box_shifts_coordinates() {
        let event = CharEvent {
            text: "x".to_string(),
            font_name: "F1".to_string(),
            font_size: 10.0,
            trm: Matrix::new(10.0, 0.0, 0.0, 10.0, 110.0, 200.0),
            width: 0.5,
        };
        let ch = char_from_event(&event, &BBox::new(100.0, 0.0, 400.0, 300.0));
        assert_eq!(ch.bbox.x0, 10.0);
        assert!((ch.bbox.top - 92.0).abs() < 1e-9);
    }

    #[test]
    fn rect_becomes_four_rect_edges() {
        let event = PathEvent {
            subpaths: vec![Subpath {
                points: vec![(0.0, 692.0), (100.0, 692.0), (100.0, 792.0), (0.0, 792.0)],
                closed: true,
                rect: true,
            }],
            paint: PaintOp::Fill,
        };
        let edges = edges_from_path(&event, &letter());
        assert_eq!(edges.len(), 4);
        assert!(edges.iter().all(|e| e.source == EdgeSource::Rect));
        assert_eq!((edges[0].top, edges[1].top), (0.0, 100.0));
    }

    #[test]
    fn line_segments_become_edges() {
        let event = PathEvent {
            subpaths: vec![Subpath {
                points: vec![(10.0, 700.0), (200.0, 700.0), (200.0, 700.0), (200.0, 600.0)],
                closed: false,
                rect: false,
            }],
            paint: PaintOp::Stroke,
        };
        let edges = edges_from_path(&event, &letter());
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].orientation, Orientation::Horizontal);
        assert_eq!(edges[0].top, 92.0);
        assert_eq!(edges[1].orientation, Orientation::Vertical);
        assert_eq!((edges[1].top, edges[1].bottom), (92.0, 192.0));
    }
}
