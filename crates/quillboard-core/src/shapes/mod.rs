//! Element definitions for the drawing surface.

mod freehand;
mod image;
mod line;
mod rectangle;
mod text;

pub use freehand::{Freehand, StrokeSample};
pub use image::Image;
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::{MonospaceMeasurer, Text, TextLayout, TextMeasurer, layout as layout_text};

pub(crate) use rectangle::hit_test_box as rectangle_box_hit;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements. Generated by the author, never reused.
pub type ElementId = String;

/// Generate a fresh element identifier.
pub fn new_element_id() -> ElementId {
    Uuid::new_v4().to_string()
}

fn default_opacity() -> f64 {
    1.0
}

/// Style properties shared by every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    /// Stroke color as a CSS color string.
    pub color: String,
    /// Stroke width in scene units.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl ElementStyle {
    pub fn new(color: impl Into<String>, stroke_width: f64) -> Self {
        Self {
            color: color.into(),
            stroke_width,
            opacity: 1.0,
        }
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self::new("#000000", 2.0)
    }
}

/// Named grip on a selected element.
///
/// The eight box handles plus `inside` come from the bounding box; `start`,
/// `end` and `control` only exist on lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlePosition {
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "br")]
    BottomRight,
    #[serde(rename = "t")]
    Top,
    #[serde(rename = "b")]
    Bottom,
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "inside")]
    Inside,
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "end")]
    End,
    #[serde(rename = "control")]
    Control,
}

impl HandlePosition {
    /// Check if this is one of the four corner handles.
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            HandlePosition::TopLeft
                | HandlePosition::TopRight
                | HandlePosition::BottomLeft
                | HandlePosition::BottomRight
        )
    }

    /// Check if this is one of the four edge-midpoint handles.
    pub fn is_edge(self) -> bool {
        matches!(
            self,
            HandlePosition::Top | HandlePosition::Bottom | HandlePosition::Left | HandlePosition::Right
        )
    }

    /// Whether dragging this handle moves the left side of the box.
    pub fn moves_left(self) -> bool {
        matches!(self, HandlePosition::TopLeft | HandlePosition::BottomLeft | HandlePosition::Left)
    }

    /// Whether dragging this handle moves the right side of the box.
    pub fn moves_right(self) -> bool {
        matches!(self, HandlePosition::TopRight | HandlePosition::BottomRight | HandlePosition::Right)
    }

    /// Whether dragging this handle moves the top side of the box.
    pub fn moves_top(self) -> bool {
        matches!(self, HandlePosition::TopLeft | HandlePosition::TopRight | HandlePosition::Top)
    }

    /// Whether dragging this handle moves the bottom side of the box.
    pub fn moves_bottom(self) -> bool {
        matches!(self, HandlePosition::BottomLeft | HandlePosition::BottomRight | HandlePosition::Bottom)
    }

    /// The handle that tracks the same grip after the box flips.
    pub fn flipped(self, flip_x: bool, flip_y: bool) -> Self {
        let mut handle = self;
        if flip_x {
            handle = match handle {
                HandlePosition::TopLeft => HandlePosition::TopRight,
                HandlePosition::TopRight => HandlePosition::TopLeft,
                HandlePosition::BottomLeft => HandlePosition::BottomRight,
                HandlePosition::BottomRight => HandlePosition::BottomLeft,
                HandlePosition::Left => HandlePosition::Right,
                HandlePosition::Right => HandlePosition::Left,
                other => other,
            };
        }
        if flip_y {
            handle = match handle {
                HandlePosition::TopLeft => HandlePosition::BottomLeft,
                HandlePosition::BottomLeft => HandlePosition::TopLeft,
                HandlePosition::TopRight => HandlePosition::BottomRight,
                HandlePosition::BottomRight => HandlePosition::TopRight,
                HandlePosition::Top => HandlePosition::Bottom,
                HandlePosition::Bottom => HandlePosition::Top,
                other => other,
            };
        }
        handle
    }
}

/// Transient fields used only while an element is being manipulated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Handle grabbed by the active drag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_position: Option<HandlePosition>,
    /// Per-point x offsets between the grab point and each anchor.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offset_x: Vec<f64>,
    /// Per-point y offsets between the grab point and each anchor.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offset_y: Vec<f64>,
}

impl Interaction {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Discriminator for the element variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Line,
    Freehand,
    Text,
    Image,
}

/// A scene element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Rectangle(Rectangle),
    Line(Line),
    Freehand(Freehand),
    Text(Text),
    Image(Image),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Element::Rectangle(s) => &s.id,
            Element::Line(s) => &s.id,
            Element::Freehand(s) => &s.id,
            Element::Text(s) => &s.id,
            Element::Image(s) => &s.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Rectangle(_) => ElementKind::Rectangle,
            Element::Line(_) => ElementKind::Line,
            Element::Freehand(_) => ElementKind::Freehand,
            Element::Text(_) => ElementKind::Text,
            Element::Image(_) => ElementKind::Image,
        }
    }

    pub fn style(&self) -> &ElementStyle {
        match self {
            Element::Rectangle(s) => &s.style,
            Element::Line(s) => &s.style,
            Element::Freehand(s) => &s.style,
            Element::Text(s) => &s.style,
            Element::Image(s) => &s.style,
        }
    }

    pub fn style_mut(&mut self) -> &mut ElementStyle {
        match self {
            Element::Rectangle(s) => &mut s.style,
            Element::Line(s) => &mut s.style,
            Element::Freehand(s) => &mut s.style,
            Element::Text(s) => &mut s.style,
            Element::Image(s) => &mut s.style,
        }
    }

    pub fn interaction(&self) -> &Interaction {
        match self {
            Element::Rectangle(s) => &s.interaction,
            Element::Line(s) => &s.interaction,
            Element::Freehand(s) => &s.interaction,
            Element::Text(s) => &s.interaction,
            Element::Image(s) => &s.interaction,
        }
    }

    pub fn interaction_mut(&mut self) -> &mut Interaction {
        match self {
            Element::Rectangle(s) => &mut s.interaction,
            Element::Line(s) => &mut s.interaction,
            Element::Freehand(s) => &mut s.interaction,
            Element::Text(s) => &mut s.interaction,
            Element::Image(s) => &mut s.interaction,
        }
    }

    /// Return a copy with the given opacity.
    pub fn with_opacity(&self, opacity: f64) -> Self {
        let mut element = self.clone();
        element.style_mut().opacity = opacity;
        element
    }

    /// Whether this element has no visible extent and should not be committed.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Element::Rectangle(r) => r.x1 == r.x2 && r.y1 == r.y2,
            Element::Line(l) => l.x1 == l.x2 && l.y1 == l.y2,
            Element::Freehand(f) => f.stroke.is_empty(),
            Element::Text(t) => t.text.trim().is_empty(),
            Element::Image(i) => i.x1 == i.x2 || i.y1 == i.y2,
        }
    }

    /// Return a copy with anchors ordered so that `x1 <= x2` (and `y1 <= y2`
    /// where the shape allows it) and transient fields cleared.
    pub fn normalized(&self) -> Self {
        let mut element = match self {
            Element::Rectangle(r) => Element::Rectangle(r.normalized()),
            Element::Line(l) => Element::Line(l.normalized()),
            Element::Freehand(f) => Element::Freehand(f.normalized()),
            Element::Text(t) => Element::Text(t.normalized()),
            Element::Image(i) => Element::Image(i.normalized()),
        };
        element.interaction_mut().clear();
        element
    }
}
