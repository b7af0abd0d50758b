//! Text element and its layout metrics.

use super::rectangle::resize_anchors;
use super::{ElementId, ElementStyle, HandlePosition, Interaction};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Font metrics provider.
///
/// Metrics differ between clients, so layout is always recomputed locally.
pub trait TextMeasurer {
    /// Advance width of a single line of text.
    fn line_width(&self, line: &str, font_size: f64, font_family: &str) -> f64;

    /// Distance between consecutive baselines.
    fn line_height(&self, font_size: f64, font_family: &str) -> f64;
}

/// Approximate metrics: every glyph is `0.6 × font_size` wide and lines are
/// `1.2 × font_size` apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceMeasurer;

impl TextMeasurer for MonospaceMeasurer {
    fn line_width(&self, line: &str, font_size: f64, _font_family: &str) -> f64 {
        line.chars().count() as f64 * font_size * 0.6
    }

    fn line_height(&self, font_size: f64, _font_family: &str) -> f64 {
        font_size * 1.2
    }
}

/// Result of laying out a text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Character offsets at which a new visual line starts.
    pub breaks: Vec<usize>,
    pub width: f64,
    pub height: f64,
}

/// Lay out `text`, one visual line per input line.
pub fn layout(text: &str, font_size: f64, font_family: &str, measurer: &dyn TextMeasurer) -> TextLayout {
    let mut breaks = Vec::new();
    let mut offset = 0;
    let mut width: f64 = 0.0;
    let mut line_count = 0;
    for line in text.split('\n') {
        if line_count > 0 {
            breaks.push(offset);
        }
        width = width.max(measurer.line_width(line, font_size, font_family));
        offset += line.chars().count() + 1;
        line_count += 1;
    }
    TextLayout {
        breaks,
        width,
        height: line_count as f64 * measurer.line_height(font_size, font_family),
    }
}

/// A block of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub id: ElementId,
    pub x1: f64,
    pub y1: f64,
    /// Right edge, derived from layout.
    #[serde(default)]
    pub x2: f64,
    /// Bottom edge, derived from layout.
    #[serde(default)]
    pub y2: f64,
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    #[serde(default)]
    pub breaks: Vec<usize>,
    #[serde(flatten)]
    pub style: ElementStyle,
    #[serde(flatten)]
    pub interaction: Interaction,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;

    pub fn new(
        id: impl Into<ElementId>,
        x1: f64,
        y1: f64,
        text: impl Into<String>,
        font_size: f64,
        font_family: impl Into<String>,
        style: ElementStyle,
    ) -> Self {
        Self {
            id: id.into(),
            x1,
            y1,
            x2: x1,
            y2: y1,
            text: text.into(),
            font_size,
            font_family: font_family.into(),
            breaks: Vec::new(),
            style,
            interaction: Interaction::default(),
        }
    }

    /// Recompute breaks and the box from the local font metrics.
    pub fn relayout(&self, measurer: &dyn TextMeasurer) -> Self {
        let metrics = layout(&self.text, self.font_size, &self.font_family, measurer);
        let mut text = self.clone();
        text.x2 = text.x1 + metrics.width;
        text.y2 = text.y1 + metrics.height;
        text.breaks = metrics.breaks;
        text
    }

    /// The visual lines, split at `breaks`.
    pub fn lines(&self) -> Vec<&str> {
        let mut lines = Vec::with_capacity(self.breaks.len() + 1);
        let mut start_byte = 0;
        for &brk in &self.breaks {
            let Some((byte, _)) = self.text.char_indices().nth(brk) else {
                break;
            };
            let end = self.text[..byte].strip_suffix('\n').map_or(byte, str::len);
            if end >= start_byte {
                lines.push(&self.text[start_byte..end]);
            }
            start_byte = byte;
        }
        lines.push(&self.text[start_byte..]);
        lines
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points((self.x1, self.y1), (self.x2, self.y2))
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    pub fn translated_to(&self, anchor: Point) -> Self {
        let mut text = self.clone();
        text.x1 = anchor.x;
        text.y1 = anchor.y;
        text.x2 = anchor.x + (self.x2 - self.x1);
        text.y2 = anchor.y + (self.y2 - self.y1);
        text
    }

    /// Reassign box anchors like a rectangle, keeping each side at least
    /// `min_size` from the opposite one.
    pub fn resized(&self, handle: HandlePosition, point: Point, min_size: f64) -> Self {
        let Rect { x0: mut x1, y0: mut y1, x1: mut x2, y1: mut y2 } =
            resize_anchors(Rect::new(self.x1, self.y1, self.x2, self.y2), handle, point);
        if handle.moves_left() {
            x1 = x1.min(x2 - min_size);
        } else if handle.moves_right() {
            x2 = x2.max(x1 + min_size);
        }
        if handle.moves_top() {
            y1 = y1.min(y2 - min_size);
        } else if handle.moves_bottom() {
            y2 = y2.max(y1 + min_size);
        }
        let mut text = self.clone();
        text.x1 = x1;
        text.y1 = y1;
        text.x2 = x2;
        text.y2 = y2;
        text
    }

    /// Fit the font size to the dragged box, then lay out again.
    ///
    /// The axis whose size changed most drives the new font size.
    pub fn fitted(&self, measurer: &dyn TextMeasurer) -> Self {
        let text = self.normalized();
        let natural = layout(&text.text, text.font_size, &text.font_family, measurer);
        let scale_x = ratio(text.x2 - text.x1, natural.width);
        let scale_y = ratio(text.y2 - text.y1, natural.height);
        let scale = if (scale_x - 1.0).abs() > (scale_y - 1.0).abs() { scale_x } else { scale_y };
        let mut fitted = text;
        fitted.font_size = (fitted.font_size * scale).max(1.0);
        fitted.relayout(measurer)
    }

    pub fn normalized(&self) -> Self {
        let mut text = self.clone();
        text.x1 = self.x1.min(self.x2);
        text.x2 = self.x1.max(self.x2);
        text.y1 = self.y1.min(self.y2);
        text.y2 = self.y1.max(self.y2);
        text
    }
}

fn ratio(new_span: f64, natural_span: f64) -> f64 {
    if natural_span <= f64::EPSILON { 1.0 } else { new_span / natural_span }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> Text {
        Text::new("t", 10.0, 20.0, content, 10.0, "sans-serif", ElementStyle::default())
    }

    #[test]
    fn test_layout_single_line() {
        let laid = text("hello").relayout(&MonospaceMeasurer);
        assert!(laid.breaks.is_empty());
        assert!((laid.x2 - 40.0).abs() < 1e-9);
        assert!((laid.y2 - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_breaks_are_line_starts() {
        let laid = text("ab\ncdef\ng").relayout(&MonospaceMeasurer);
        assert_eq!(laid.breaks, vec![3, 8]);
        assert_eq!(laid.lines(), vec!["ab", "cdef", "g"]);
        // widest line is four glyphs
        assert!((laid.x2 - laid.x1 - 24.0).abs() < 1e-9);
        assert!((laid.y2 - laid.y1 - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_inside_box() {
        let laid = text("hello").relayout(&MonospaceMeasurer);
        assert!(laid.hit_test(Point::new(20.0, 25.0)));
        assert!(!laid.hit_test(Point::new(60.0, 25.0)));
    }

    #[test]
    fn test_resize_floors_box() {
        let laid = text("hello").relayout(&MonospaceMeasurer);
        let resized = laid.resized(HandlePosition::Right, Point::new(-100.0, 0.0), 10.0);
        assert!((resized.x2 - resized.x1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_fitted_scales_font() {
        let laid = text("hello").relayout(&MonospaceMeasurer);
        let resized = laid.resized(HandlePosition::BottomRight, Point::new(70.0, 44.0), 10.0);
        let fitted = resized.fitted(&MonospaceMeasurer);
        assert!((fitted.font_size - 20.0).abs() < 1e-9);
        assert!((fitted.x2 - fitted.x1 - 60.0).abs() < 1e-9);
    }
}
