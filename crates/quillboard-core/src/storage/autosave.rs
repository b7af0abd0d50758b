//! Periodic persistence of the current scene.

use crate::history::Scene;
use crate::shapes::Element;
use crate::storage::{Storage, StorageResult};
use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Key the scene is stored under.
pub const SCENE_KEY: &str = "elements";

/// Saves the scene when it has changed and the interval has elapsed.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    key: String,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            key: SCENE_KEY.to_string(),
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
        }
    }

    /// Store under a different key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the scene as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Check if enough time has passed for an auto-save.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if dirty and the interval elapsed. Returns true if a save happened.
    pub async fn maybe_save(&mut self, scene: &[Element]) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(scene).await?;
        Ok(true)
    }

    /// Force save immediately.
    pub async fn save(&mut self, scene: &[Element]) -> StorageResult<()> {
        self.storage.save(&self.key, scene).await?;
        self.last_save = Some(Instant::now());
        self.dirty = false;
        debug!("Saved {} element(s) under {}", scene.len(), self.key);
        Ok(())
    }

    /// Load the saved scene; `None` if there is none or it is unreadable.
    pub async fn load(&mut self) -> StorageResult<Option<Scene>> {
        let scene = self.storage.load(&self.key).await?;
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(scene)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create the platform storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

/// Auto-save manager backed by the platform storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformAutoSaveManager = AutoSaveManager<crate::storage::FileStorage>;

/// Create an auto-save manager with default storage.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_autosave_manager() -> StorageResult<PlatformAutoSaveManager> {
    Ok(AutoSaveManager::new(create_default_storage()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::storage::{MemoryStorage, block_on};
    use crate::tools::ToolKind;
    use kurbo::Point;

    fn drawn_canvas() -> Canvas {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_down(Point::new(0.0, 0.0), 0.5);
        canvas.pointer_move(Point::new(30.0, 20.0), 0.5);
        canvas.pointer_up(Point::new(30.0, 20.0));
        canvas
    }

    #[test]
    fn test_autosave_dirty_flag() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        assert!(!manager.should_save());
        manager.mark_dirty();
        assert!(manager.should_save());
    }

    #[test]
    fn test_autosave_saves_under_elements_key() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        let canvas = drawn_canvas();

        manager.mark_dirty();
        assert!(block_on(manager.maybe_save(canvas.scene())).unwrap());
        assert!(!manager.is_dirty());
        assert!(block_on(storage.exists("elements")).unwrap());
    }

    #[test]
    fn test_autosave_waits_for_interval() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        let canvas = drawn_canvas();
        manager.mark_dirty();
        block_on(manager.save(canvas.scene())).unwrap();

        manager.mark_dirty();
        assert!(!block_on(manager.maybe_save(canvas.scene())).unwrap());
        manager.set_interval(Duration::ZERO);
        assert!(block_on(manager.maybe_save(canvas.scene())).unwrap());
    }

    #[test]
    fn test_autosave_round_trip_into_canvas() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        let canvas = drawn_canvas();
        block_on(manager.save(canvas.scene())).unwrap();

        let mut restored = Canvas::default();
        let mut loader = AutoSaveManager::new(storage);
        let scene = block_on(loader.load()).unwrap().unwrap();
        restored.reset_scene(scene);
        assert_eq!(restored.scene(), canvas.scene());
    }

    #[test]
    fn test_autosave_corrupted_loads_as_none() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(SCENE_KEY, "][").unwrap();
        let mut manager = AutoSaveManager::new(storage);
        assert!(block_on(manager.load()).unwrap().is_none());
    }
}
