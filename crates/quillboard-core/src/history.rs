//! Linear undo/redo over full scene snapshots.

use crate::shapes::Element;

/// Ordered list of elements; array order is also hit-test order.
pub type Scene = Vec<Element>;

/// A list of scene snapshots and the index of the current one.
///
/// A non-overwriting edit drops every snapshot after the current index and
/// appends; an overwriting edit replaces the current snapshot in place so a
/// continuous drag collapses into a single undo step.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Scene>,
    index: usize,
    /// Maximum number of snapshots kept (0 = unbounded).
    max_len: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Scene::new())
    }
}

impl History {
    pub fn new(initial: Scene) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            max_len: 0,
        }
    }

    /// Keep at most `max_len` snapshots, discarding the oldest (0 = unbounded).
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self.trim();
        self
    }

    /// The current scene.
    pub fn current(&self) -> &[Element] {
        &self.snapshots[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Record a new scene.
    pub fn set(&mut self, scene: Scene, overwrite: bool) {
        if overwrite {
            self.snapshots[self.index] = scene;
            return;
        }
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(scene);
        self.index += 1;
        self.trim();
    }

    /// Step back one snapshot. Opacity is reset on the restored snapshot so
    /// eraser feedback never survives into history. Returns `false` at the
    /// oldest snapshot.
    pub fn undo(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        for element in &mut self.snapshots[self.index] {
            element.style_mut().opacity = 1.0;
        }
        true
    }

    /// Step forward one snapshot. Returns `false` at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        if self.index + 1 >= self.snapshots.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Discard all history and start over from `scene`.
    pub fn reset(&mut self, scene: Scene) {
        self.snapshots = vec![scene];
        self.index = 0;
    }

    fn trim(&mut self) {
        if self.max_len == 0 || self.snapshots.len() <= self.max_len {
            return;
        }
        let excess = self.snapshots.len() - self.max_len;
        self.snapshots.drain(..excess);
        self.index = self.index.saturating_sub(excess);
    }
}
