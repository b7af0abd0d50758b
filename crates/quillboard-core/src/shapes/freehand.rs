//! Freehand stroke element.

use super::{ElementId, ElementStyle, HandlePosition, Interaction};
use crate::geometry::point_to_segment_dist;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// One pointer sample of a freehand stroke. Serialized as `[x, y, pressure]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct StrokeSample {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
}

impl StrokeSample {
    pub fn new(x: f64, y: f64, pressure: f64) -> Self {
        Self { x, y, pressure }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<[f64; 3]> for StrokeSample {
    fn from([x, y, pressure]: [f64; 3]) -> Self {
        Self { x, y, pressure }
    }
}

impl From<StrokeSample> for [f64; 3] {
    fn from(sample: StrokeSample) -> Self {
        [sample.x, sample.y, sample.pressure]
    }
}

/// A freehand drawing (ordered pressure samples).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freehand {
    pub id: ElementId,
    /// Live samples.
    pub stroke: Vec<StrokeSample>,
    /// Snapshot taken when authoring ends; the reference for every resize.
    #[serde(default)]
    pub original_stroke: Vec<StrokeSample>,
    #[serde(flatten)]
    pub style: ElementStyle,
    #[serde(flatten)]
    pub interaction: Interaction,
}

impl Freehand {
    /// Padding added around the bounding box, in scene units.
    pub const PADDING: f64 = 10.0;

    /// Start a stroke from its first sample.
    pub fn new(id: impl Into<ElementId>, first: StrokeSample, style: ElementStyle) -> Self {
        Self {
            id: id.into(),
            stroke: vec![first],
            original_stroke: Vec::new(),
            style,
            interaction: Interaction::default(),
        }
    }

    /// Create from existing samples; the samples also become the resize reference.
    pub fn from_samples(id: impl Into<ElementId>, stroke: Vec<StrokeSample>, style: ElementStyle) -> Self {
        Self {
            id: id.into(),
            original_stroke: stroke.clone(),
            stroke,
            style,
            interaction: Interaction::default(),
        }
    }

    pub fn push_sample(&mut self, sample: StrokeSample) {
        self.stroke.push(sample);
    }

    /// Capture the resize reference once authoring ends.
    pub fn finish_authoring(&mut self) {
        self.original_stroke = self.stroke.clone();
    }

    pub fn len(&self) -> usize {
        self.stroke.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stroke.is_empty()
    }

    /// Box around the live samples, without padding.
    pub fn bounds(&self) -> Option<Rect> {
        sample_bounds(&self.stroke)
    }

    /// Walk consecutive sample pairs as line segments.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self.stroke.as_slice() {
            [] => false,
            [only] => only.point().distance(point) <= tolerance,
            samples => samples
                .windows(2)
                .any(|w| point_to_segment_dist(point, w[0].point(), w[1].point()) <= tolerance),
        }
    }

    /// Every sample is the pointer minus its captured offset.
    pub fn translated(&self, pointer: Point, offset_x: &[f64], offset_y: &[f64]) -> Self {
        let mut freehand = self.clone();
        for ((sample, ox), oy) in freehand.stroke.iter_mut().zip(offset_x).zip(offset_y) {
            sample.x = pointer.x - ox;
            sample.y = pointer.y - oy;
        }
        freehand
    }

    /// Resize by a box handle.
    ///
    /// Strokes shorter than `append_threshold` samples are still open to
    /// refinement: the pointer is appended as a new sample. Longer strokes are
    /// scaled from `original_stroke` into the box produced by the dragged
    /// handle, whose sides are floored at `min_size`. Handles sit on the
    /// padded box, so the pointer is pulled back by [`Self::PADDING`] on the
    /// sides it moves.
    pub fn resized(&self, handle: HandlePosition, point: Point, append_threshold: usize, min_size: f64) -> Self {
        let mut freehand = self.clone();
        if self.stroke.len() < append_threshold {
            let pressure = self.stroke.last().map_or(0.5, |s| s.pressure);
            freehand.stroke.push(StrokeSample::new(point.x, point.y, pressure));
            freehand.original_stroke = freehand.stroke.clone();
            return freehand;
        }

        let reference = if self.original_stroke.is_empty() {
            &self.stroke
        } else {
            &self.original_stroke
        };
        let (Some(current), Some(original)) = (self.bounds(), sample_bounds(reference)) else {
            return freehand;
        };

        let mut target = current;
        if handle.moves_left() {
            target.x0 = (point.x + Self::PADDING).min(current.x1 - min_size);
        } else if handle.moves_right() {
            target.x1 = (point.x - Self::PADDING).max(current.x0 + min_size);
        }
        if handle.moves_top() {
            target.y0 = (point.y + Self::PADDING).min(current.y1 - min_size);
        } else if handle.moves_bottom() {
            target.y1 = (point.y - Self::PADDING).max(current.y0 + min_size);
        }

        let scale_x = scale_factor(target.width(), original.width());
        let scale_y = scale_factor(target.height(), original.height());
        freehand.stroke = reference
            .iter()
            .map(|s| {
                StrokeSample::new(
                    target.x0 + (s.x - original.x0) * scale_x,
                    target.y0 + (s.y - original.y0) * scale_y,
                    s.pressure,
                )
            })
            .collect();
        freehand
    }

    /// Make sure a resize reference exists.
    pub fn normalized(&self) -> Self {
        let mut freehand = self.clone();
        if freehand.original_stroke.is_empty() {
            freehand.original_stroke = freehand.stroke.clone();
        }
        freehand
    }
}

fn scale_factor(new_span: f64, original_span: f64) -> f64 {
    if original_span.abs() < f64::EPSILON { 1.0 } else { new_span / original_span }
}

fn sample_bounds(samples: &[StrokeSample]) -> Option<Rect> {
    let (first, rest) = samples.split_first()?;
    let start = Rect::from_points(first.point(), first.point());
    Some(rest.iter().fold(start, |bounds, s| bounds.union_pt(s.point())))
}
