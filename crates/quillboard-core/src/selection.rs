//! Selection handles and the move/resize reducers applied while dragging.

use crate::config::CanvasConfig;
use crate::geometry::{self, bounding_box};
use crate::shapes::rectangle_box_hit;
use crate::shapes::{Element, HandlePosition, TextMeasurer};
use kurbo::Point;

/// Find which grip of an already selected element is under `point`.
///
/// Lines expose their endpoints and curve midpoint first, then the corners and
/// edge midpoints of the curve's bounding box. Every other shape uses its box:
/// corners, edges, then interior.
pub fn handle_at(element: &Element, point: Point, tolerance: f64) -> Option<HandlePosition> {
    let near = |p: Point| (p.x - point.x).abs() <= tolerance && (p.y - point.y).abs() <= tolerance;
    match element {
        Element::Line(line) => {
            if near(line.start()) {
                return Some(HandlePosition::Start);
            }
            if near(line.end()) {
                return Some(HandlePosition::End);
            }
            if near(line.midpoint()) {
                return Some(HandlePosition::Control);
            }
            let bounds = line.bounds();
            let center = bounds.center();
            let grips = [
                (Point::new(bounds.x0, bounds.y0), HandlePosition::TopLeft),
                (Point::new(bounds.x1, bounds.y0), HandlePosition::TopRight),
                (Point::new(bounds.x0, bounds.y1), HandlePosition::BottomLeft),
                (Point::new(bounds.x1, bounds.y1), HandlePosition::BottomRight),
                (Point::new(center.x, bounds.y0), HandlePosition::Top),
                (Point::new(center.x, bounds.y1), HandlePosition::Bottom),
                (Point::new(bounds.x0, center.y), HandlePosition::Left),
                (Point::new(bounds.x1, center.y), HandlePosition::Right),
            ];
            if let Some((_, handle)) = grips.into_iter().find(|(grip, _)| near(*grip)) {
                return Some(handle);
            }
            line.hit_test(point).then_some(HandlePosition::Inside)
        }
        Element::Rectangle(r) => r.hit_test(point, tolerance),
        Element::Image(i) => i.hit_test(point, tolerance),
        Element::Text(t) => rectangle_box_hit(t.bounds(), point, tolerance),
        Element::Freehand(_) => rectangle_box_hit(bounding_box(element)?.into(), point, tolerance),
    }
}

/// Prepare an element for moving: capture per-point offsets from the grab point.
pub fn begin_move(element: &Element, point: Point) -> Element {
    let offsets = geometry::offsets(element, point);
    let mut element = element.clone();
    let interaction = element.interaction_mut();
    interaction.selected_position = Some(HandlePosition::Inside);
    interaction.offset_x = offsets.x;
    interaction.offset_y = offsets.y;
    element
}

/// Prepare an element for resizing with the given handle.
pub fn begin_resize(element: &Element, handle: HandlePosition) -> Element {
    let mut element = element.clone();
    element.interaction_mut().selected_position = Some(handle);
    element
}

/// Rebuild every anchor from the pointer minus the captured offsets.
pub fn move_element(element: &Element, pointer: Point) -> Element {
    let interaction = element.interaction();
    let (Some(&ox), Some(&oy)) = (interaction.offset_x.first(), interaction.offset_y.first()) else {
        return element.clone();
    };
    let anchor = Point::new(pointer.x - ox, pointer.y - oy);
    match element {
        Element::Rectangle(r) => Element::Rectangle(r.translated_to(anchor)),
        Element::Line(l) => Element::Line(l.translated_to(anchor)),
        Element::Text(t) => Element::Text(t.translated_to(anchor)),
        Element::Image(i) => Element::Image(i.translated_to(anchor)),
        Element::Freehand(f) => Element::Freehand(f.translated(pointer, &interaction.offset_x, &interaction.offset_y)),
    }
}

/// Apply one pointer step of a resize using the element's grabbed handle.
///
/// The returned element carries the handle to use for the next step, which
/// differs from the current one when a curved line flips.
pub fn resize_element(element: &Element, pointer: Point, config: &CanvasConfig) -> Element {
    let Some(handle) = element.interaction().selected_position else {
        return element.clone();
    };
    match element {
        Element::Rectangle(r) => Element::Rectangle(r.resized(handle, pointer)),
        Element::Line(l) => match handle {
            HandlePosition::Start | HandlePosition::End => Element::Line(l.with_endpoint(handle, pointer)),
            HandlePosition::Control => Element::Line(l.bent_through(pointer)),
            _ => {
                let (mut line, next) = l.resized(handle, pointer);
                line.interaction.selected_position = Some(next);
                Element::Line(line)
            }
        },
        Element::Freehand(f) => Element::Freehand(f.resized(
            handle,
            pointer,
            config.freehand_resize_threshold,
            config.min_freehand_size,
        )),
        Element::Text(t) => Element::Text(t.resized(handle, pointer, config.min_text_size)),
        Element::Image(i) => Element::Image(i.resized(handle, pointer)),
    }
}

/// Normalize anchors once a move ends and clear transient fields.
pub fn finalize_move(element: &Element, measurer: &dyn TextMeasurer) -> Element {
    match element.normalized() {
        Element::Text(t) => Element::Text(t.relayout(measurer)),
        other => other,
    }
}

/// Normalize anchors once a resize ends; text refits its font to the box.
pub fn finalize_resize(element: &Element, measurer: &dyn TextMeasurer) -> Element {
    match element.normalized() {
        Element::Text(t) => Element::Text(t.fitted(measurer)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::bounding_box;
    use crate::shapes::{ElementStyle, Freehand, Line, MonospaceMeasurer, Rectangle, StrokeSample};

    fn rect() -> Element {
        Element::Rectangle(Rectangle::new("r", 0.0, 0.0, 100.0, 100.0, ElementStyle::default()))
    }

    #[test]
    fn test_handle_at_rectangle() {
        assert_eq!(handle_at(&rect(), Point::new(99.0, 1.0), 10.0), Some(HandlePosition::TopRight));
        assert_eq!(handle_at(&rect(), Point::new(50.0, 50.0), 10.0), Some(HandlePosition::Inside));
        assert_eq!(handle_at(&rect(), Point::new(200.0, 50.0), 10.0), None);
    }

    #[test]
    fn test_handle_at_line_prefers_endpoints() {
        let line = Element::Line(Line::new("l", 0.0, 0.0, 100.0, 50.0, ElementStyle::new("#000", 16.0)));
        assert_eq!(handle_at(&line, Point::new(1.0, 1.0), 10.0), Some(HandlePosition::Start));
        assert_eq!(handle_at(&line, Point::new(99.0, 49.0), 10.0), Some(HandlePosition::End));
        assert_eq!(handle_at(&line, Point::new(50.0, 25.0), 10.0), Some(HandlePosition::Control));
        assert_eq!(handle_at(&line, Point::new(100.0, 0.0), 10.0), Some(HandlePosition::TopRight));
        assert_eq!(handle_at(&line, Point::new(20.0, 10.0), 10.0), Some(HandlePosition::Inside));
    }

    #[test]
    fn test_handle_at_line_edge_midpoints() {
        let line = Element::Line(Line::new("l", 0.0, 0.0, 100.0, 60.0, ElementStyle::new("#000", 16.0)));
        assert_eq!(handle_at(&line, Point::new(50.0, 2.0), 5.0), Some(HandlePosition::Top));
        assert_eq!(handle_at(&line, Point::new(49.0, 60.0), 5.0), Some(HandlePosition::Bottom));
        assert_eq!(handle_at(&line, Point::new(0.0, 31.0), 5.0), Some(HandlePosition::Left));
        assert_eq!(handle_at(&line, Point::new(101.0, 30.0), 5.0), Some(HandlePosition::Right));
    }

    #[test]
    fn test_line_edge_handle_resizes_one_axis() {
        let config = CanvasConfig::default();
        let line = Element::Line(Line::new("l", 0.0, 0.0, 100.0, 60.0, ElementStyle::default()));
        let grabbed = begin_resize(&line, HandlePosition::Right);
        let Element::Line(resized) = resize_element(&grabbed, Point::new(150.0, 999.0), &config) else {
            panic!("expected line");
        };
        assert!((resized.x2 - 150.0).abs() < 1e-9);
        assert!((resized.y2 - 60.0).abs() < 1e-9);
        assert!((resized.x1 - 0.0).abs() < 1e-9);
        assert_eq!(resized.interaction.selected_position, Some(HandlePosition::Right));
    }

    #[test]
    fn test_handle_at_freehand_uses_padded_box() {
        let freehand = Element::Freehand(Freehand::from_samples(
            "f",
            vec![StrokeSample::new(0.0, 0.0, 0.5), StrokeSample::new(100.0, 100.0, 0.5)],
            ElementStyle::default(),
        ));
        assert_eq!(handle_at(&freehand, Point::new(-10.0, -10.0), 5.0), Some(HandlePosition::TopLeft));
        assert_eq!(handle_at(&freehand, Point::new(80.0, 20.0), 5.0), Some(HandlePosition::Inside));
    }

    #[test]
    fn test_move_freehand_from_interior_grab() {
        let freehand = Element::Freehand(Freehand::from_samples(
            "f",
            vec![
                StrokeSample::new(0.0, 0.0, 0.5),
                StrokeSample::new(10.0, 0.0, 0.5),
                StrokeSample::new(10.0, 10.0, 0.5),
            ],
            ElementStyle::default(),
        ));
        let grabbed = begin_move(&freehand, Point::new(10.0, 0.0));
        let Element::Freehand(moved) = move_element(&grabbed, Point::new(15.0, 5.0)) else {
            panic!("expected freehand");
        };
        assert_eq!(
            moved.stroke,
            vec![
                StrokeSample::new(5.0, 5.0, 0.5),
                StrokeSample::new(15.0, 5.0, 0.5),
                StrokeSample::new(15.0, 15.0, 0.5),
            ]
        );
    }

    #[test]
    fn test_move_rectangle_keeps_size() {
        let grabbed = begin_move(&rect(), Point::new(30.0, 40.0));
        let moved = move_element(&grabbed, Point::new(130.0, 140.0));
        let bbox = bounding_box(&moved).unwrap();
        assert_eq!((bbox.x1, bbox.y1, bbox.x2, bbox.y2), (90.0, 90.0, 210.0, 210.0));
    }

    #[test]
    fn test_resize_then_finalize_normalizes_rectangle() {
        let config = CanvasConfig::default();
        let grabbed = begin_resize(&rect(), HandlePosition::TopLeft);
        let dragged = resize_element(&grabbed, Point::new(150.0, 180.0), &config);
        let Element::Rectangle(r) = finalize_resize(&dragged, &MonospaceMeasurer) else {
            panic!("expected rectangle");
        };
        assert!(r.x1 <= r.x2 && r.y1 <= r.y2);
        assert_eq!((r.x1, r.y1, r.x2, r.y2), (100.0, 100.0, 150.0, 180.0));
        assert!(r.interaction.selected_position.is_none());
    }

    #[test]
    fn test_curved_line_resize_tracks_flipped_handle() {
        let config = CanvasConfig::default();
        let line = Element::Line(
            Line::new("l", 0.0, 0.0, 100.0, 100.0, ElementStyle::default()).with_control_point(Point::new(100.0, 0.0)),
        );
        let grabbed = begin_resize(&line, HandlePosition::TopRight);
        let flipped = resize_element(&grabbed, Point::new(-50.0, 0.0), &config);
        assert_eq!(flipped.interaction().selected_position, Some(HandlePosition::TopLeft));

        // continuing the drag with the remapped handle keeps working on the left side
        let further = resize_element(&flipped, Point::new(-80.0, 0.0), &config);
        let bbox = bounding_box(&further).unwrap();
        assert!((bbox.x1 + 80.0).abs() < 1e-9);
        assert!((bbox.x2 - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_control_handle_bends_line() {
        let config = CanvasConfig::default();
        let line = Element::Line(Line::new("l", 0.0, 0.0, 100.0, 0.0, ElementStyle::default()));
        let grabbed = begin_resize(&line, HandlePosition::Control);
        let Element::Line(bent) = resize_element(&grabbed, Point::new(50.0, 30.0), &config) else {
            panic!("expected line");
        };
        assert!(bent.is_curved);
        assert!((bent.midpoint().y - 30.0).abs() < 1e-9);
    }
}
