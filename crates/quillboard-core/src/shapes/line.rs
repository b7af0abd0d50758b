//! Line element with optional quadratic Bézier curvature.

use super::{ElementId, ElementStyle, HandlePosition, Interaction};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Number of parameter steps used when sampling the curve for hit-testing.
const HIT_SAMPLES: usize = 100;

/// Hit tolerance is `stroke_width / HIT_DIVISOR` on each axis.
const HIT_DIVISOR: f64 = 8.0;

/// A straight or quadratic-Bézier line between two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: ElementId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default)]
    pub is_curved: bool,
    /// Off-curve control point; only meaningful when `is_curved`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_point: Option<Point>,
    #[serde(flatten)]
    pub style: ElementStyle,
    #[serde(flatten)]
    pub interaction: Interaction,
}

impl Line {
    pub fn new(id: impl Into<ElementId>, x1: f64, y1: f64, x2: f64, y2: f64, style: ElementStyle) -> Self {
        Self {
            id: id.into(),
            x1,
            y1,
            x2,
            y2,
            is_curved: false,
            control_point: None,
            style,
            interaction: Interaction::default(),
        }
    }

    /// Make this line a quadratic Bézier with the given control point.
    pub fn with_control_point(mut self, control: Point) -> Self {
        self.is_curved = true;
        self.control_point = Some(control);
        self
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// The effective control point: the stored one when curved, else the
    /// chord midpoint.
    pub fn control(&self) -> Point {
        match (self.is_curved, self.control_point) {
            (true, Some(control)) => control,
            _ => self.start().midpoint(self.end()),
        }
    }

    /// Evaluate the quadratic Bézier at parameter `t`.
    pub fn point_at(&self, t: f64) -> Point {
        let (p0, c, p2) = (self.start(), self.control(), self.end());
        let u = 1.0 - t;
        Point::new(
            u * u * p0.x + 2.0 * u * t * c.x + t * t * p2.x,
            u * u * p0.y + 2.0 * u * t * c.y + t * t * p2.y,
        )
    }

    /// The on-curve point at `t = 0.5`.
    pub fn midpoint(&self) -> Point {
        self.point_at(0.5)
    }

    /// Box over both endpoints and the curve midpoint.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.start(), self.end()).union_pt(self.midpoint())
    }

    /// Coarse hit test: samples the curve at 101 evenly spaced parameters and
    /// reports a hit if any sample is within `stroke_width / 8` on both axes.
    pub fn hit_test(&self, point: Point) -> bool {
        let threshold = self.style.stroke_width / HIT_DIVISOR;
        (0..=HIT_SAMPLES).any(|i| {
            let sample = self.point_at(i as f64 / HIT_SAMPLES as f64);
            (sample.x - point.x).abs() <= threshold && (sample.y - point.y).abs() <= threshold
        })
    }

    /// Order endpoints left to right (top to bottom on ties).
    ///
    /// Swapping endpoints leaves a quadratic Bézier unchanged, so the control
    /// point is kept as is.
    pub fn normalized(&self) -> Self {
        let mut line = self.clone();
        if self.x1 > self.x2 || (self.x1 == self.x2 && self.y1 > self.y2) {
            line.x1 = self.x2;
            line.y1 = self.y2;
            line.x2 = self.x1;
            line.y2 = self.y1;
        }
        line
    }

    /// Move so that the start anchor lands on `anchor`; the end anchor and
    /// control point follow by the same delta.
    pub fn translated_to(&self, anchor: Point) -> Self {
        let dx = anchor.x - self.x1;
        let dy = anchor.y - self.y1;
        let mut line = self.clone();
        line.x1 += dx;
        line.y1 += dy;
        line.x2 += dx;
        line.y2 += dy;
        if let Some(control) = line.control_point.as_mut() {
            control.x += dx;
            control.y += dy;
        }
        line
    }

    /// Drag a single endpoint.
    pub fn with_endpoint(&self, handle: HandlePosition, point: Point) -> Self {
        let mut line = self.clone();
        match handle {
            HandlePosition::Start => {
                line.x1 = point.x;
                line.y1 = point.y;
            }
            HandlePosition::End => {
                line.x2 = point.x;
                line.y2 = point.y;
            }
            _ => {}
        }
        line
    }

    /// Bend the line so the curve passes through `point` at `t = 0.5`.
    pub fn bent_through(&self, point: Point) -> Self {
        let chord_mid = self.start().midpoint(self.end());
        let control = Point::new(2.0 * point.x - chord_mid.x, 2.0 * point.y - chord_mid.y);
        self.clone().with_control_point(control)
    }

    /// Resize by a box handle, keeping the control point at the same
    /// fractional position inside the curve's bounding box.
    ///
    /// Returns the resized line and the handle that continued dragging should
    /// use: when the dragged edge crosses the opposite edge the axis flips and
    /// the handle is mirrored.
    pub fn resized(&self, handle: HandlePosition, point: Point) -> (Self, HandlePosition) {
        let Rect { x0: min_x, y0: min_y, x1: max_x, y1: max_y } = self.bounds();
        let (mut new_min_x, mut new_max_x) = (min_x, max_x);
        let (mut new_min_y, mut new_max_y) = (min_y, max_y);
        let mut flip_x = false;
        let mut flip_y = false;

        if handle.moves_left() {
            if point.x > max_x {
                flip_x = true;
                new_min_x = max_x;
                new_max_x = point.x;
            } else {
                new_min_x = point.x;
            }
        } else if handle.moves_right() {
            if point.x < min_x {
                flip_x = true;
                new_min_x = point.x;
                new_max_x = min_x;
            } else {
                new_max_x = point.x;
            }
        }

        if handle.moves_top() {
            if point.y > max_y {
                flip_y = true;
                new_min_y = max_y;
                new_max_y = point.y;
            } else {
                new_min_y = point.y;
            }
        } else if handle.moves_bottom() {
            if point.y < min_y {
                flip_y = true;
                new_min_y = point.y;
                new_max_y = min_y;
            } else {
                new_max_y = point.y;
            }
        }

        let map_x = |x: f64| remap(x, (min_x, max_x), (new_min_x, new_max_x), flip_x);
        let map_y = |y: f64| remap(y, (min_y, max_y), (new_min_y, new_max_y), flip_y);

        let mut line = self.clone();
        line.x1 = map_x(self.x1);
        line.y1 = map_y(self.y1);
        line.x2 = map_x(self.x2);
        line.y2 = map_y(self.y2);
        if self.is_curved {
            let control = self.control();
            line.control_point = Some(Point::new(map_x(control.x), map_y(control.y)));
        }
        (line, handle.flipped(flip_x, flip_y))
    }
}

/// Fractional position of `value` inside `(min, max)`; zero for an empty span.
pub(crate) fn fraction(value: f64, (min, max): (f64, f64)) -> f64 {
    let span = max - min;
    if span.abs() < f64::EPSILON { 0.0 } else { (value - min) / span }
}

/// Map `value` from one span to another at the same fractional position,
/// mirrored when the axis flipped.
fn remap(value: f64, from: (f64, f64), to: (f64, f64), flipped: bool) -> f64 {
    let f = fraction(value, from);
    let f = if flipped { 1.0 - f } else { f };
    to.0 + f * (to.1 - to.0)
}
