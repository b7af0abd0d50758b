//! Rectangle element.

use super::{ElementId, ElementStyle, HandlePosition, Interaction};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle defined by two corner anchors.
///
/// The anchors may be out of order while a resize is in flight; they are
/// normalized when the drag finalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub id: ElementId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(flatten)]
    pub style: ElementStyle,
    #[serde(flatten)]
    pub interaction: Interaction,
}

impl Rectangle {
    /// Padding added around the bounding box, in scene units.
    pub const PADDING: f64 = 10.0;

    pub fn new(id: impl Into<ElementId>, x1: f64, y1: f64, x2: f64, y2: f64, style: ElementStyle) -> Self {
        Self {
            id: id.into(),
            x1,
            y1,
            x2,
            y2,
            style,
            interaction: Interaction::default(),
        }
    }

    pub fn normalized(&self) -> Self {
        let mut rect = self.clone();
        rect.x1 = self.x1.min(self.x2);
        rect.x2 = self.x1.max(self.x2);
        rect.y1 = self.y1.min(self.y2);
        rect.y2 = self.y1.max(self.y2);
        rect
    }

    /// The box between the anchors, whatever their order.
    pub fn bounds(&self) -> Rect {
        Rect::from_points((self.x1, self.y1), (self.x2, self.y2))
    }

    /// Reassign the anchors grabbed by `handle` to `point`.
    pub fn resized(&self, handle: HandlePosition, point: Point) -> Self {
        let mut rect = self.clone();
        let anchors = resize_anchors(Rect::new(self.x1, self.y1, self.x2, self.y2), handle, point);
        rect.x1 = anchors.x0;
        rect.y1 = anchors.y0;
        rect.x2 = anchors.x1;
        rect.y2 = anchors.y1;
        rect
    }

    /// Move so that the first anchor lands on `anchor`, keeping the size.
    pub fn translated_to(&self, anchor: Point) -> Self {
        let mut rect = self.clone();
        rect.x1 = anchor.x;
        rect.y1 = anchor.y;
        rect.x2 = anchor.x + (self.x2 - self.x1);
        rect.y2 = anchor.y + (self.y2 - self.y1);
        rect
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<HandlePosition> {
        hit_test_box(self.bounds(), point, tolerance)
    }
}

/// Reassign one or two anchors according to the dragged handle.
///
/// `anchors` holds `(x1, y1)` in `x0/y0` and `(x2, y2)` in `x1/y1`. No flip
/// handling: the result may be inverted on either axis.
pub(crate) fn resize_anchors(anchors: Rect, handle: HandlePosition, point: Point) -> Rect {
    match handle {
        HandlePosition::TopLeft => Rect { x0: point.x, y0: point.y, ..anchors },
        HandlePosition::TopRight => Rect { x1: point.x, y0: point.y, ..anchors },
        HandlePosition::BottomLeft => Rect { x0: point.x, y1: point.y, ..anchors },
        HandlePosition::BottomRight => Rect { x1: point.x, y1: point.y, ..anchors },
        HandlePosition::Top => Rect { y0: point.y, ..anchors },
        HandlePosition::Bottom => Rect { y1: point.y, ..anchors },
        HandlePosition::Left => Rect { x0: point.x, ..anchors },
        HandlePosition::Right => Rect { x1: point.x, ..anchors },
        _ => anchors,
    }
}

/// Classify a point against a normalized box: corners first, then edges,
/// then interior.
pub(crate) fn hit_test_box(bounds: Rect, point: Point, tolerance: f64) -> Option<HandlePosition> {
    let near = |a: f64, b: f64| (a - b).abs() <= tolerance;
    let corners = [
        (Point::new(bounds.x0, bounds.y0), HandlePosition::TopLeft),
        (Point::new(bounds.x1, bounds.y0), HandlePosition::TopRight),
        (Point::new(bounds.x0, bounds.y1), HandlePosition::BottomLeft),
        (Point::new(bounds.x1, bounds.y1), HandlePosition::BottomRight),
    ];
    if let Some((_, handle)) = corners
        .into_iter()
        .find(|(corner, _)| near(point.x, corner.x) && near(point.y, corner.y))
    {
        return Some(handle);
    }

    if bounds.inflate(tolerance, tolerance).contains(point) {
        let edges = [
            (near(point.y, bounds.y0), HandlePosition::Top),
            (near(point.y, bounds.y1), HandlePosition::Bottom),
            (near(point.x, bounds.x0), HandlePosition::Left),
            (near(point.x, bounds.x1), HandlePosition::Right),
        ];
        if let Some((_, handle)) = edges.into_iter().find(|(hit, _)| *hit) {
            return Some(handle);
        }
    }

    bounds.contains(point).then_some(HandlePosition::Inside)
}
