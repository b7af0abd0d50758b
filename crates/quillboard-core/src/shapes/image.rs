//! Image element for embedding raster images.

use super::rectangle::{hit_test_box, resize_anchors};
use super::{ElementId, ElementStyle, HandlePosition, Interaction};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An image placed between two corner anchors.
///
/// Pixel data lives in the image store keyed by element id; `src` is only a
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: ElementId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub src: String,
    /// Width over height. When present, resizing keeps it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    #[serde(flatten)]
    pub style: ElementStyle,
    #[serde(flatten)]
    pub interaction: Interaction,
}

impl Image {
    /// Padding added around the bounding box, in scene units.
    pub const PADDING: f64 = 0.0;

    /// Create an image at `position` with the given display size. The aspect
    /// ratio lock is taken from that size.
    pub fn new(id: impl Into<ElementId>, src: impl Into<String>, position: Point, width: f64, height: f64) -> Self {
        let aspect_ratio = (height.abs() > f64::EPSILON).then(|| width / height);
        Self {
            id: id.into(),
            x1: position.x,
            y1: position.y,
            x2: position.x + width,
            y2: position.y + height,
            src: src.into(),
            aspect_ratio,
            style: ElementStyle::default(),
            interaction: Interaction::default(),
        }
    }

    /// Drop the aspect-ratio lock.
    pub fn unlocked(mut self) -> Self {
        self.aspect_ratio = None;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points((self.x1, self.y1), (self.x2, self.y2))
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<HandlePosition> {
        hit_test_box(self.bounds(), point, tolerance)
    }

    pub fn translated_to(&self, anchor: Point) -> Self {
        let mut image = self.clone();
        image.x1 = anchor.x;
        image.y1 = anchor.y;
        image.x2 = anchor.x + (self.x2 - self.x1);
        image.y2 = anchor.y + (self.y2 - self.y1);
        image
    }

    /// Resize by a handle, honouring the aspect-ratio lock if set.
    pub fn resized(&self, handle: HandlePosition, point: Point) -> Self {
        let mut image = self.clone();
        let Some(ratio) = self.aspect_ratio.filter(|r| *r > f64::EPSILON) else {
            let anchors = resize_anchors(Rect::new(self.x1, self.y1, self.x2, self.y2), handle, point);
            image.x1 = anchors.x0;
            image.y1 = anchors.y0;
            image.x2 = anchors.x1;
            image.y2 = anchors.y1;
            return image;
        };

        if handle.is_corner() {
            // The corner opposite the dragged one stays put.
            let fixed_x = if handle.moves_left() { self.x2 } else { self.x1 };
            let fixed_y = if handle.moves_top() { self.y2 } else { self.y1 };
            let old_w = if handle.moves_left() { self.x1 - fixed_x } else { self.x2 - fixed_x };
            let old_h = if handle.moves_top() { self.y1 - fixed_y } else { self.y2 - fixed_y };
            let raw_w = point.x - fixed_x;
            let raw_h = point.y - fixed_y;

            let (w, h) = if (raw_w - old_w).abs() >= (raw_h - old_h).abs() {
                (raw_w, raw_w.abs() / ratio * direction(raw_h, old_h))
            } else {
                (raw_h.abs() * ratio * direction(raw_w, old_w), raw_h)
            };

            if handle.moves_left() {
                image.x1 = fixed_x + w;
            } else {
                image.x2 = fixed_x + w;
            }
            if handle.moves_top() {
                image.y1 = fixed_y + h;
            } else {
                image.y2 = fixed_y + h;
            }
        } else if handle.is_edge() && (handle.moves_left() || handle.moves_right()) {
            if handle.moves_left() {
                image.x1 = point.x;
            } else {
                image.x2 = point.x;
            }
            let h = (image.x2 - image.x1).abs() / ratio;
            let center_y = self.bounds().center().y;
            let sign = if self.y2 >= self.y1 { 1.0 } else { -1.0 };
            image.y1 = center_y - sign * h / 2.0;
            image.y2 = center_y + sign * h / 2.0;
        } else if handle.is_edge() {
            if handle.moves_top() {
                image.y1 = point.y;
            } else {
                image.y2 = point.y;
            }
            let w = (image.y2 - image.y1).abs() * ratio;
            let center_x = self.bounds().center().x;
            let sign = if self.x2 >= self.x1 { 1.0 } else { -1.0 };
            image.x1 = center_x - sign * w / 2.0;
            image.x2 = center_x + sign * w / 2.0;
        }
        image
    }

    pub fn normalized(&self) -> Self {
        let mut image = self.clone();
        image.x1 = self.x1.min(self.x2);
        image.x2 = self.x1.max(self.x2);
        image.y1 = self.y1.min(self.y2);
        image.y2 = self.y1.max(self.y2);
        image
    }
}

/// Sign of the dragged extent, falling back to the previous one at zero.
fn direction(raw: f64, previous: f64) -> f64 {
    if raw != 0.0 {
        raw.signum()
    } else if previous < 0.0 {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Image {
        Image::new("i", "blob:i", Point::new(0.0, 0.0), 200.0, 100.0)
    }

    #[test]
    fn test_new_derives_aspect_ratio() {
        assert_eq!(image().aspect_ratio, Some(2.0));
    }

    #[test]
    fn test_locked_corner_resize_keeps_ratio() {
        let resized = image().resized(HandlePosition::BottomRight, Point::new(300.0, 110.0));
        assert_eq!((resized.x1, resized.y1), (0.0, 0.0));
        assert!((resized.x2 - 300.0).abs() < 1e-9);
        assert!((resized.y2 - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_locked_corner_resize_height_dominant() {
        let resized = image().resized(HandlePosition::TopLeft, Point::new(0.0, -100.0));
        // bottom-right corner is the fixed anchor
        assert_eq!((resized.x2, resized.y2), (200.0, 100.0));
        assert!((resized.y1 + 100.0).abs() < 1e-9);
        assert!((resized.x1 + 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_locked_edge_resize_recenters() {
        let resized = image().resized(HandlePosition::Right, Point::new(400.0, 999.0));
        assert!((resized.x2 - 400.0).abs() < 1e-9);
        assert!((resized.y1 + 50.0).abs() < 1e-9);
        assert!((resized.y2 - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_unlocked_resize_is_free() {
        let resized = image().unlocked().resized(HandlePosition::BottomRight, Point::new(50.0, 300.0));
        assert_eq!((resized.x2, resized.y2), (50.0, 300.0));
    }
}
