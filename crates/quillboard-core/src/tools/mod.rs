//! Tool selection and the style values new elements are created with.

use crate::shapes::{
    Element, ElementId, ElementStyle, Freehand, Line, Rectangle, StrokeSample, Text, new_element_id,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Rectangle,
    Line,
    Freehand,
    Text,
    Eraser,
}

/// Style and text settings applied to newly created elements.
///
/// Passed in explicitly by the embedder; nothing here is global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolContext {
    pub color: String,
    pub stroke_width: f64,
    pub font_size: f64,
    pub font_family: String,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            stroke_width: 2.0,
            font_size: Text::DEFAULT_FONT_SIZE,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl ToolContext {
    pub fn style(&self) -> ElementStyle {
        ElementStyle::new(self.color.clone(), self.stroke_width)
    }

    /// Create the transient element a drawing tool starts with at `point`.
    pub fn begin_element(&self, tool: ToolKind, point: Point, pressure: f64) -> Option<Element> {
        self.begin_element_with_id(new_element_id(), tool, point, pressure)
    }

    pub fn begin_element_with_id(
        &self,
        id: ElementId,
        tool: ToolKind,
        point: Point,
        pressure: f64,
    ) -> Option<Element> {
        let style = self.style();
        match tool {
            ToolKind::Rectangle => Some(Element::Rectangle(Rectangle::new(id, point.x, point.y, point.x, point.y, style))),
            ToolKind::Line => Some(Element::Line(Line::new(id, point.x, point.y, point.x, point.y, style))),
            ToolKind::Freehand => Some(Element::Freehand(Freehand::new(
                id,
                StrokeSample::new(point.x, point.y, pressure),
                style,
            ))),
            ToolKind::Text => Some(Element::Text(Text::new(
                id,
                point.x,
                point.y,
                "",
                self.font_size,
                self.font_family.clone(),
                style,
            ))),
            ToolKind::Select | ToolKind::Pan | ToolKind::Eraser => None,
        }
    }
}

/// Extend an in-progress element to the pointer: the far anchor for boxes and
/// lines, a new sample for freehand strokes.
pub fn extend_element(element: &Element, point: Point, pressure: f64) -> Element {
    match element {
        Element::Rectangle(r) => {
            let mut r = r.clone();
            r.x2 = point.x;
            r.y2 = point.y;
            Element::Rectangle(r)
        }
        Element::Line(l) => {
            let mut l = l.clone();
            l.x2 = point.x;
            l.y2 = point.y;
            Element::Line(l)
        }
        Element::Freehand(f) => {
            let mut f = f.clone();
            f.push_sample(StrokeSample::new(point.x, point.y, pressure));
            Element::Freehand(f)
        }
        Element::Text(_) | Element::Image(_) => element.clone(),
    }
}
