//! Stateless geometry over elements: bounding boxes, hit-testing, Bézier
//! midpoints and move offsets.

use crate::shapes::{Element, Freehand, HandlePosition, Image, Line, Rectangle};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned box around an element, padding included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Inflate `bounds` by `padding`. The reported `width` includes the
    /// padding on both sides while `height` includes it once; renderers size
    /// their selection frame from these values, so they are kept as is.
    fn padded(bounds: Rect, padding: f64) -> Self {
        let outer = bounds.inflate(padding, padding);
        Self {
            x1: outer.x0,
            y1: outer.y0,
            x2: outer.x1,
            y2: outer.y1,
            width: outer.width(),
            height: bounds.height() + padding,
        }
    }
}

impl From<BoundingBox> for Rect {
    fn from(bbox: BoundingBox) -> Self {
        Rect::new(bbox.x1, bbox.y1, bbox.x2, bbox.y2)
    }
}

/// Bounding box of an element in scene units.
///
/// Padding is a per-shape constant independent of zoom. Lines include the
/// Bézier midpoint since the curve may bulge past the chord. Returns `None`
/// for a freehand element without samples.
pub fn bounding_box(element: &Element) -> Option<BoundingBox> {
    match element {
        Element::Rectangle(r) => Some(BoundingBox::padded(r.bounds(), Rectangle::PADDING)),
        Element::Line(l) => Some(BoundingBox::padded(l.bounds(), 0.0)),
        Element::Freehand(f) => f.bounds().map(|b| BoundingBox::padded(b, Freehand::PADDING)),
        Element::Text(t) => Some(BoundingBox::padded(t.bounds(), 0.0)),
        Element::Image(i) => Some(BoundingBox::padded(i.bounds(), Image::PADDING)),
    }
}

/// Test a point against an element.
///
/// Rectangles and images report the grabbed handle (corner over edge over
/// interior); lines, freehand strokes and text report `Inside` on a hit.
pub fn hit_test(point: Point, element: &Element, tolerance: f64) -> Option<HandlePosition> {
    match element {
        Element::Rectangle(r) => r.hit_test(point, tolerance),
        Element::Line(l) => l.hit_test(point).then_some(HandlePosition::Inside),
        Element::Freehand(f) => f.hit_test(point, tolerance).then_some(HandlePosition::Inside),
        Element::Text(t) => t.hit_test(point).then_some(HandlePosition::Inside),
        Element::Image(i) => i.hit_test(point, tolerance),
    }
}

/// Index of the first element (array order) under `point`.
pub fn element_at(elements: &[Element], point: Point, tolerance: f64) -> Option<usize> {
    elements.iter().position(|e| hit_test(point, e, tolerance).is_some())
}

/// The quadratic Bézier of a line evaluated at `t = 0.5`.
pub fn bezier_midpoint(line: &Line) -> Point {
    line.midpoint()
}

/// Per-point offsets between a grab point and an element's anchors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Offsets {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Capture `point - anchor` for every anchor so a later move can rebuild each
/// position from the pointer alone.
///
/// Single-anchor shapes yield one entry; freehand strokes one per sample.
pub fn offsets(element: &Element, point: Point) -> Offsets {
    let anchors: Vec<Point> = match element {
        Element::Rectangle(r) => vec![Point::new(r.x1, r.y1)],
        Element::Line(l) => vec![l.start()],
        Element::Text(t) => vec![Point::new(t.x1, t.y1)],
        Element::Image(i) => vec![Point::new(i.x1, i.y1)],
        Element::Freehand(f) => f.stroke.iter().map(|s| s.point()).collect(),
    };
    let (x, y) = anchors.iter().map(|a| (point.x - a.x, point.y - a.y)).unzip();
    Offsets { x, y }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}
