//! Canvas interaction state and pointer handling.

use crate::camera::Camera;
use crate::config::CanvasConfig;
use crate::geometry;
use crate::history::{History, Scene};
use crate::selection;
use crate::shapes::{Element, ElementId, HandlePosition, Image, MonospaceMeasurer, TextMeasurer, new_element_id};
use crate::tools::{ToolContext, ToolKind, extend_element};
use kurbo::{Point, Size};
use log::debug;

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    None,
    Drawing,
    Selecting,
    Moving,
    Resizing,
    Erasing,
    Panning,
    Writing,
}

/// A local edit that peers should learn about.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalChange {
    /// An element was created or changed, possibly mid-drag.
    Upsert(Element),
    /// Elements were removed.
    Erase(Vec<ElementId>),
}

/// The interaction state machine for a single drawing surface.
///
/// Pointer positions are given in screen pixels and converted through the
/// camera. The committed scene lives in the history; the selected element and
/// the element being drawn are held separately so a renderer can decorate
/// them.
pub struct Canvas {
    config: CanvasConfig,
    tool: ToolKind,
    context: ToolContext,
    action: Action,
    history: History,
    /// Live copy of the selected element, including drag state.
    selected: Option<Element>,
    /// Element being drawn or written, not yet in the scene.
    drawing: Option<Element>,
    /// Ids struck by the eraser during the current gesture.
    erase_set: Vec<ElementId>,
    camera: Camera,
    last_pan: Option<Point>,
    /// Whether the current drag already opened its history step.
    drag_recorded: bool,
    measurer: Box<dyn TextMeasurer>,
    changes: Vec<LocalChange>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Canvas {
    pub fn new(config: CanvasConfig) -> Self {
        let history = History::default().with_max_len(config.max_history);
        Self {
            config,
            tool: ToolKind::default(),
            context: ToolContext::default(),
            action: Action::None,
            history,
            selected: None,
            drawing: None,
            erase_set: Vec::new(),
            camera: Camera::new(),
            last_pan: None,
            drag_recorded: false,
            measurer: Box::new(MonospaceMeasurer),
            changes: Vec::new(),
        }
    }

    /// Use different font metrics for text layout.
    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    // --- Accessors used by renderers and embedders ---

    /// The committed scene, back to front in hit-test order.
    pub fn scene(&self) -> &[Element] {
        self.history.current()
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.as_ref()
    }

    pub fn drawing_element(&self) -> Option<&Element> {
        self.drawing.as_ref()
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    pub fn set_context(&mut self, context: ToolContext) {
        self.context = context;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drain the local edits recorded since the last call.
    ///
    /// Upserts of the same element are coalesced until drained, so only the
    /// latest value of each element is pending.
    pub fn take_changes(&mut self) -> Vec<LocalChange> {
        std::mem::take(&mut self.changes)
    }

    /// Switch tools. Pending text is committed and the selection cleared.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.action == Action::Writing {
            self.blur();
        }
        if tool != ToolKind::Select {
            self.selected = None;
        }
        self.tool = tool;
        self.set_action(Action::None);
    }

    // --- Pointer events ---

    pub fn pointer_down(&mut self, screen: Point, pressure: f64) {
        let point = self.camera.screen_to_scene(screen);
        match self.tool {
            ToolKind::Pan => {
                self.last_pan = Some(screen);
                self.set_action(Action::Panning);
            }
            ToolKind::Eraser => {
                self.selected = None;
                self.set_action(Action::Erasing);
                self.erase_at(point);
            }
            ToolKind::Text => {
                if self.action == Action::Writing {
                    self.blur();
                }
                self.selected = None;
                self.drawing = self
                    .context
                    .begin_element(ToolKind::Text, point, pressure)
                    .map(|e| self.laid_out(e));
                self.set_action(Action::Writing);
            }
            ToolKind::Rectangle | ToolKind::Line | ToolKind::Freehand => {
                self.selected = None;
                self.drawing = self.context.begin_element(self.tool, point, pressure);
                if let Some(element) = &self.drawing {
                    self.record_upsert(element.clone());
                }
                self.set_action(Action::Drawing);
            }
            ToolKind::Select => self.select_down(point),
        }
    }

    pub fn pointer_move(&mut self, screen: Point, pressure: f64) {
        let point = self.camera.screen_to_scene(screen);
        match self.action {
            Action::Drawing => {
                if let Some(element) = &self.drawing {
                    let extended = extend_element(element, point, pressure);
                    self.record_upsert(extended.clone());
                    self.drawing = Some(extended);
                }
            }
            Action::Moving => {
                if let Some(element) = &self.selected {
                    let moved = selection::move_element(element, point);
                    self.update_dragged(moved);
                }
            }
            Action::Resizing => {
                if let Some(element) = &self.selected {
                    let resized = selection::resize_element(element, point, &self.config);
                    self.update_dragged(resized);
                }
            }
            Action::Erasing => self.erase_at(point),
            Action::Panning => {
                if let Some(last) = self.last_pan {
                    self.camera.pan(screen - last);
                }
                self.last_pan = Some(screen);
            }
            Action::None | Action::Selecting | Action::Writing => {}
        }
    }

    pub fn pointer_up(&mut self, _screen: Point) {
        match self.action {
            Action::Drawing => {
                if let Some(element) = self.drawing.take() {
                    self.commit(element);
                }
            }
            Action::Moving | Action::Resizing => self.finish_drag(),
            Action::Erasing => self.commit_erase(),
            Action::Panning => self.last_pan = None,
            // text stays open until blur
            Action::Writing => return,
            Action::None | Action::Selecting => {}
        }
        self.set_action(Action::None);
    }

    fn select_down(&mut self, point: Point) {
        let tolerance = self.camera.screen_to_scene_distance(self.config.handle_tolerance);
        if let Some(selected) = &self.selected {
            if let Some(handle) = selection::handle_at(selected, point, tolerance) {
                self.drag_recorded = false;
                if handle == HandlePosition::Inside {
                    self.selected = Some(selection::begin_move(selected, point));
                    self.set_action(Action::Moving);
                } else {
                    self.selected = Some(selection::begin_resize(selected, handle));
                    self.set_action(Action::Resizing);
                }
                return;
            }
        }
        match geometry::element_at(self.scene(), point, tolerance) {
            Some(index) => {
                let element = self.scene()[index].clone();
                debug!("Selected element {}", element.id());
                self.selected = Some(element);
                self.set_action(Action::Selecting);
            }
            None => {
                self.selected = None;
                self.set_action(Action::None);
            }
        }
    }

    /// Write a drag step into the scene. The first step opens a history
    /// entry; later steps overwrite it.
    fn update_dragged(&mut self, element: Element) {
        let mut scene = self.history.current().to_vec();
        if let Some(slot) = scene.iter_mut().find(|e| e.id() == element.id()) {
            *slot = element.clone();
            self.history.set(scene, self.drag_recorded);
            self.drag_recorded = true;
        }
        self.record_upsert(element.clone());
        self.selected = Some(element);
    }

    fn finish_drag(&mut self) {
        let Some(element) = self.selected.take() else {
            return;
        };
        let finalized = match self.action {
            Action::Resizing => selection::finalize_resize(&element, self.measurer.as_ref()),
            _ => selection::finalize_move(&element, self.measurer.as_ref()),
        };
        if self.drag_recorded {
            let mut scene = self.history.current().to_vec();
            if let Some(slot) = scene.iter_mut().find(|e| e.id() == finalized.id()) {
                *slot = finalized.clone();
            }
            self.history.set(scene, true);
            self.record_upsert(finalized.clone());
            debug!("Finished drag of {}", finalized.id());
        }
        self.drag_recorded = false;
        self.selected = Some(finalized);
    }

    fn erase_at(&mut self, point: Point) {
        let tolerance = self.camera.screen_to_scene_distance(self.config.handle_tolerance);
        let struck: Vec<ElementId> = self
            .scene()
            .iter()
            .filter(|e| !self.erase_set.iter().any(|id| id == e.id()))
            .filter(|e| geometry::hit_test(point, e, tolerance).is_some())
            .map(|e| e.id().to_string())
            .collect();
        if struck.is_empty() {
            return;
        }
        let feedback = self.config.erase_feedback_opacity;
        let scene = self
            .scene()
            .iter()
            .map(|e| if struck.iter().any(|id| id == e.id()) { e.with_opacity(feedback) } else { e.clone() })
            .collect();
        self.history.set(scene, true);
        self.erase_set.extend(struck);
    }

    fn commit_erase(&mut self) {
        if self.erase_set.is_empty() {
            return;
        }
        let ids = std::mem::take(&mut self.erase_set);
        let scene = self
            .scene()
            .iter()
            .filter(|e| !ids.iter().any(|id| id == e.id()))
            .cloned()
            .collect();
        self.history.set(scene, false);
        debug!("Erased {} element(s)", ids.len());
        self.changes.push(LocalChange::Erase(ids));
    }

    /// Commit a finished drawing. Degenerate elements are dropped and peers
    /// that saw them live are told to forget them.
    fn commit(&mut self, element: Element) {
        let element = match element {
            Element::Freehand(mut f) => {
                f.finish_authoring();
                Element::Freehand(f)
            }
            other => other,
        };
        let element = self.laid_out(element.normalized());
        if element.is_degenerate() {
            debug!("Discarding degenerate {:?} {}", element.kind(), element.id());
            self.changes.push(LocalChange::Erase(vec![element.id().to_string()]));
            return;
        }
        let mut scene = self.history.current().to_vec();
        scene.push(element.clone());
        self.history.set(scene, false);
        debug!("Committed {:?} {}", element.kind(), element.id());
        self.record_upsert(element);
    }

    fn record_upsert(&mut self, element: Element) {
        for change in self.changes.iter_mut().rev() {
            match change {
                LocalChange::Upsert(pending) if pending.id() == element.id() => {
                    *pending = element;
                    return;
                }
                // a later upsert must not jump ahead of the erase
                LocalChange::Erase(ids) if ids.iter().any(|id| id == element.id()) => break,
                _ => {}
            }
        }
        self.changes.push(LocalChange::Upsert(element));
    }

    fn laid_out(&self, element: Element) -> Element {
        match element {
            Element::Text(t) => Element::Text(t.relayout(self.measurer.as_ref())),
            other => other,
        }
    }

    fn set_action(&mut self, action: Action) {
        if self.action != action {
            debug!("Action {:?} -> {:?}", self.action, action);
            self.action = action;
        }
    }

    // --- Text editing ---

    /// Replace the content of the text being written.
    pub fn set_text(&mut self, content: &str) {
        if self.action != Action::Writing {
            return;
        }
        let Some(Element::Text(text)) = &self.drawing else {
            return;
        };
        let mut text = text.clone();
        text.text = content.to_string();
        let element = Element::Text(text.relayout(self.measurer.as_ref()));
        self.record_upsert(element.clone());
        self.drawing = Some(element);
    }

    /// Input focus left the text being written: commit it, or drop it if blank.
    pub fn blur(&mut self) {
        if self.action != Action::Writing {
            return;
        }
        if let Some(element) = self.drawing.take() {
            self.commit(element);
        }
        self.set_action(Action::None);
    }

    // --- Scene commands ---

    /// Place an image with its display size; the size fixes the aspect ratio.
    /// Returns `None` for an empty size.
    pub fn insert_image(&mut self, src: impl Into<String>, position: Point, size: Size) -> Option<ElementId> {
        let mut image = Image::new(new_element_id(), src, position, size.width, size.height);
        image.style = self.context.style();
        let element = Element::Image(image).normalized();
        if element.is_degenerate() {
            return None;
        }
        let id = element.id().to_string();
        let mut scene = self.history.current().to_vec();
        scene.push(element.clone());
        self.history.set(scene, false);
        self.record_upsert(element);
        Some(id)
    }

    /// Remove the selected element. Returns whether anything was removed.
    pub fn delete_selected(&mut self) -> bool {
        let Some(selected) = self.selected.take() else {
            return false;
        };
        let id = selected.id().to_string();
        let scene: Scene = self.scene().iter().filter(|e| e.id() != id).cloned().collect();
        if scene.len() == self.scene().len() {
            return false;
        }
        self.history.set(scene, false);
        self.changes.push(LocalChange::Erase(vec![id]));
        self.set_action(Action::None);
        true
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        if self.scene().is_empty() {
            return;
        }
        let ids = self.scene().iter().map(|e| e.id().to_string()).collect();
        self.history.set(Scene::new(), false);
        self.selected = None;
        self.changes.push(LocalChange::Erase(ids));
        self.set_action(Action::None);
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo();
        if undone {
            self.selected = None;
            self.set_action(Action::None);
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo();
        if redone {
            self.selected = None;
            self.set_action(Action::None);
        }
        redone
    }

    /// Replace the current scene without opening an undo step. Used for
    /// remote updates.
    pub fn apply_remote_scene(&mut self, scene: Scene) {
        if let Some(selected) = &self.selected {
            match scene.iter().find(|e| e.id() == selected.id()) {
                None => {
                    self.selected = None;
                    if matches!(self.action, Action::Moving | Action::Resizing | Action::Selecting) {
                        self.set_action(Action::None);
                    }
                }
                Some(remote) if !matches!(self.action, Action::Moving | Action::Resizing) => {
                    self.selected = Some(remote.clone());
                }
                Some(_) => {}
            }
        }
        self.history.set(scene, true);
    }

    /// Start over from `scene` with empty history.
    pub fn reset_scene(&mut self, scene: Scene) {
        self.history.reset(scene);
        self.selected = None;
        self.drawing = None;
        self.erase_set.clear();
        self.drag_recorded = false;
        self.set_action(Action::None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ElementStyle, Freehand, Rectangle, StrokeSample};

    fn drag(canvas: &mut Canvas, from: (f64, f64), to: (f64, f64)) {
        canvas.pointer_down(Point::new(from.0, from.1), 0.5);
        canvas.pointer_move(Point::new(to.0, to.1), 0.5);
        canvas.pointer_up(Point::new(to.0, to.1));
    }

    fn canvas_with_rectangle() -> Canvas {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (0.0, 0.0), (100.0, 100.0));
        canvas.set_tool(ToolKind::Select);
        canvas
    }

    fn rect_coords(element: &Element) -> (f64, f64, f64, f64) {
        let Element::Rectangle(r) = element else {
            panic!("expected rectangle");
        };
        (r.x1, r.y1, r.x2, r.y2)
    }

    #[test]
    fn test_draw_rectangle_commits_on_release() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_down(Point::new(100.0, 80.0), 0.5);
        assert_eq!(canvas.action(), Action::Drawing);
        canvas.pointer_move(Point::new(20.0, 10.0), 0.5);
        assert!(canvas.scene().is_empty());
        canvas.pointer_up(Point::new(20.0, 10.0));

        assert_eq!(canvas.action(), Action::None);
        assert_eq!(canvas.scene().len(), 1);
        assert_eq!(rect_coords(&canvas.scene()[0]), (20.0, 10.0, 100.0, 80.0));
        assert!(canvas.drawing_element().is_none());
    }

    #[test]
    fn test_drawing_streams_changes() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Freehand);
        canvas.pointer_down(Point::new(0.0, 0.0), 0.3);
        canvas.pointer_move(Point::new(5.0, 5.0), 0.4);
        canvas.pointer_move(Point::new(9.0, 3.0), 0.6);
        canvas.pointer_up(Point::new(9.0, 3.0));

        let changes = canvas.take_changes();
        // start, two moves and commit collapse into the committed stroke
        assert_eq!(changes.len(), 1);
        let Some(LocalChange::Upsert(Element::Freehand(f))) = changes.last() else {
            panic!("expected committed freehand");
        };
        assert_eq!(f.stroke.len(), 3);
        assert_eq!(f.original_stroke, f.stroke);
        assert!(canvas.take_changes().is_empty());
    }

    #[test]
    fn test_pending_changes_stay_bounded_without_drain() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Freehand);
        canvas.pointer_down(Point::new(0.0, 0.0), 0.5);
        for i in 1..=1000 {
            canvas.pointer_move(Point::new(i as f64, (i % 7) as f64), 0.5);
        }
        canvas.pointer_up(Point::new(1000.0, 6.0));

        let changes = canvas.take_changes();
        assert_eq!(changes.len(), 1);
        let [LocalChange::Upsert(Element::Freehand(f))] = changes.as_slice() else {
            panic!("expected one freehand upsert");
        };
        assert_eq!(f.stroke.len(), 1001);
    }

    #[test]
    fn test_upsert_after_erase_keeps_order() {
        let mut canvas = canvas_with_rectangle();
        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_up(Point::new(50.0, 50.0));
        assert!(canvas.delete_selected());
        assert!(canvas.undo());
        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_up(Point::new(50.0, 50.0));
        drag(&mut canvas, (50.0, 50.0), (60.0, 60.0));

        let changes = canvas.take_changes();
        assert!(matches!(
            changes.as_slice(),
            [LocalChange::Upsert(_), LocalChange::Erase(_), LocalChange::Upsert(_)]
        ));
    }

    #[test]
    fn test_degenerate_drawing_is_discarded() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_down(Point::new(10.0, 10.0), 0.5);
        canvas.pointer_up(Point::new(10.0, 10.0));
        assert!(canvas.scene().is_empty());
        assert!(!canvas.can_undo());
        assert!(matches!(canvas.take_changes().last(), Some(LocalChange::Erase(_))));
    }

    #[test]
    fn test_first_click_only_selects() {
        let mut canvas = canvas_with_rectangle();
        drag(&mut canvas, (50.0, 50.0), (80.0, 80.0));
        assert_eq!(canvas.selected_element().map(Element::id), Some(canvas.scene()[0].id()));
        // no drag happened
        assert_eq!(rect_coords(&canvas.scene()[0]), (0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_move_selected_is_one_undo_step() {
        let mut canvas = canvas_with_rectangle();
        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_up(Point::new(50.0, 50.0));

        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        assert_eq!(canvas.action(), Action::Moving);
        canvas.pointer_move(Point::new(55.0, 60.0), 0.5);
        canvas.pointer_move(Point::new(60.0, 70.0), 0.5);
        canvas.pointer_up(Point::new(60.0, 70.0));

        assert_eq!(rect_coords(&canvas.scene()[0]), (10.0, 20.0, 110.0, 120.0));
        assert!(canvas.scene()[0].interaction().offset_x.is_empty());
        assert!(canvas.undo());
        assert_eq!(rect_coords(&canvas.scene()[0]), (0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_resize_normalizes_on_release() {
        let mut canvas = canvas_with_rectangle();
        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_up(Point::new(50.0, 50.0));

        canvas.pointer_down(Point::new(100.0, 100.0), 0.5);
        assert_eq!(canvas.action(), Action::Resizing);
        assert_eq!(
            canvas.selected_element().and_then(|e| e.interaction().selected_position),
            Some(HandlePosition::BottomRight)
        );
        canvas.pointer_move(Point::new(-40.0, -30.0), 0.5);
        canvas.pointer_up(Point::new(-40.0, -30.0));

        let (x1, y1, x2, y2) = rect_coords(&canvas.scene()[0]);
        assert!(x1 <= x2 && y1 <= y2);
        assert_eq!((x1, y1, x2, y2), (-40.0, -30.0, 0.0, 0.0));
    }

    #[test]
    fn test_click_on_empty_space_clears_selection() {
        let mut canvas = canvas_with_rectangle();
        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_up(Point::new(50.0, 50.0));
        canvas.pointer_down(Point::new(400.0, 400.0), 0.5);
        assert!(canvas.selected_element().is_none());
        assert_eq!(canvas.action(), Action::None);
    }

    #[test]
    fn test_click_on_other_element_reselects() {
        let mut canvas = canvas_with_rectangle();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (300.0, 300.0), (400.0, 400.0));
        canvas.set_tool(ToolKind::Select);
        let first = canvas.scene()[0].id().to_string();
        let second = canvas.scene()[1].id().to_string();

        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_up(Point::new(50.0, 50.0));
        assert_eq!(canvas.selected_element().map(Element::id), Some(first.as_str()));

        canvas.pointer_down(Point::new(350.0, 350.0), 0.5);
        assert_eq!(canvas.action(), Action::Selecting);
        assert_eq!(canvas.selected_element().map(Element::id), Some(second.as_str()));
        canvas.pointer_move(Point::new(380.0, 380.0), 0.5);
        canvas.pointer_up(Point::new(380.0, 380.0));
        assert_eq!(rect_coords(&canvas.scene()[1]), (300.0, 300.0, 400.0, 400.0));
    }

    #[test]
    fn test_grabbing_freehand_handle_without_moving_keeps_stroke() {
        let samples: Vec<StrokeSample> = (0..=10)
            .map(|i| StrokeSample::new(i as f64 * 10.0, i as f64 * 10.0, 0.5))
            .collect();
        let freehand = Freehand::from_samples("f", samples, ElementStyle::default());
        let mut canvas = Canvas::default();
        canvas.reset_scene(vec![Element::Freehand(freehand.clone())]);

        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_up(Point::new(50.0, 50.0));
        canvas.pointer_down(Point::new(-10.0, -10.0), 0.5);
        assert_eq!(canvas.action(), Action::Resizing);
        canvas.pointer_move(Point::new(-10.0, -10.0), 0.5);
        canvas.pointer_up(Point::new(-10.0, -10.0));

        let Element::Freehand(after) = &canvas.scene()[0] else {
            panic!("expected freehand");
        };
        assert_eq!(after.bounds(), freehand.bounds());
        assert_eq!(after.stroke, freehand.stroke);
    }

    #[test]
    fn test_eraser_marks_then_removes() {
        let mut canvas = canvas_with_rectangle();
        canvas.take_changes();
        canvas.set_tool(ToolKind::Eraser);
        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_move(Point::new(52.0, 50.0), 0.5);
        assert_eq!(canvas.scene().len(), 1);
        assert!((canvas.scene()[0].style().opacity - 0.5).abs() < f64::EPSILON);

        canvas.pointer_up(Point::new(52.0, 50.0));
        assert!(canvas.scene().is_empty());
        let changes = canvas.take_changes();
        assert!(matches!(changes.as_slice(), [LocalChange::Erase(ids)] if ids.len() == 1));

        assert!(canvas.undo());
        assert_eq!(canvas.scene().len(), 1);
        assert!((canvas.scene()[0].style().opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_eraser_release_without_hit_is_noop() {
        let mut canvas = canvas_with_rectangle();
        let index = canvas.history().index();
        canvas.set_tool(ToolKind::Eraser);
        canvas.pointer_down(Point::new(500.0, 500.0), 0.5);
        canvas.pointer_up(Point::new(500.0, 500.0));
        assert_eq!(canvas.history().index(), index);
        assert_eq!(canvas.scene().len(), 1);
    }

    #[test]
    fn test_pan_moves_camera_only() {
        let mut canvas = canvas_with_rectangle();
        canvas.set_tool(ToolKind::Pan);
        drag(&mut canvas, (10.0, 10.0), (40.0, 30.0));
        assert_eq!(canvas.camera().offset, kurbo::Vec2::new(30.0, 20.0));
        assert_eq!(rect_coords(&canvas.scene()[0]), (0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_pointer_goes_through_camera() {
        let mut canvas = Canvas::default();
        canvas.camera_mut().set_zoom(2.0);
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (20.0, 20.0), (220.0, 120.0));
        assert_eq!(rect_coords(&canvas.scene()[0]), (10.0, 10.0, 110.0, 60.0));
    }

    #[test]
    fn test_text_commits_on_blur() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(Point::new(10.0, 10.0), 0.5);
        canvas.pointer_up(Point::new(10.0, 10.0));
        assert_eq!(canvas.action(), Action::Writing);
        canvas.set_text("hi\nthere");
        canvas.blur();

        assert_eq!(canvas.action(), Action::None);
        let Element::Text(text) = &canvas.scene()[0] else {
            panic!("expected text");
        };
        assert_eq!(text.breaks, vec![3]);
        assert!(text.x2 > text.x1);
    }

    #[test]
    fn test_blank_text_is_discarded() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(Point::new(10.0, 10.0), 0.5);
        canvas.set_text("   ");
        canvas.set_tool(ToolKind::Select);
        assert!(canvas.scene().is_empty());
    }

    #[test]
    fn test_insert_image_keeps_aspect_ratio() {
        let mut canvas = Canvas::default();
        let id = canvas.insert_image("blob:1", Point::new(0.0, 0.0), Size::new(200.0, 100.0)).unwrap();
        let Element::Image(image) = &canvas.scene()[0] else {
            panic!("expected image");
        };
        assert_eq!(image.id, id);
        assert_eq!(image.aspect_ratio, Some(2.0));
        assert!(canvas.insert_image("blob:2", Point::ZERO, Size::ZERO).is_none());
    }

    #[test]
    fn test_delete_selected_and_clear() {
        let mut canvas = canvas_with_rectangle();
        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_up(Point::new(50.0, 50.0));
        assert!(canvas.delete_selected());
        assert!(canvas.scene().is_empty());
        assert!(!canvas.delete_selected());

        canvas.undo();
        canvas.clear();
        assert!(canvas.scene().is_empty());
        assert!(canvas.undo());
        assert_eq!(canvas.scene().len(), 1);
    }

    #[test]
    fn test_remote_scene_drops_missing_selection() {
        let mut canvas = canvas_with_rectangle();
        canvas.pointer_down(Point::new(50.0, 50.0), 0.5);
        canvas.pointer_up(Point::new(50.0, 50.0));
        let other = Element::Rectangle(Rectangle::new("other", 0.0, 0.0, 5.0, 5.0, Default::default()));
        let index = canvas.history().index();
        canvas.apply_remote_scene(vec![other]);
        assert!(canvas.selected_element().is_none());
        assert_eq!(canvas.history().index(), index);
    }
}
