//! In-memory storage implementations.

use super::{BoxFuture, ImageStore, Storage, StorageError, StorageResult, decode_scene, encode_scene};
use crate::history::Scene;
use crate::shapes::Element;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory scene storage for testing and ephemeral use.
///
/// Scenes are kept as serialized JSON so loading goes through the same
/// parsing as persistent backends.
#[derive(Default)]
pub struct MemoryStorage {
    scenes: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw JSON under `key`, bypassing serialization.
    pub fn insert_raw(&self, key: &str, json: impl Into<String>) -> StorageResult<()> {
        let mut scenes = self.scenes.write().map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        scenes.insert(key.to_string(), json.into());
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, scene: &[Element]) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let json = encode_scene(scene);
        Box::pin(async move {
            let json = json?;
            let mut scenes = self.scenes.write().map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            scenes.insert(key, json);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Scene>>> {
        let key = key.to_string();
        Box::pin(async move {
            let scenes = self.scenes.read().map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(scenes.get(&key).and_then(|json| decode_scene(&key, json)))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut scenes = self.scenes.write().map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            scenes.remove(&key);
            Ok(())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let scenes = self.scenes.read().map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(scenes.contains_key(&key))
        })
    }
}

/// In-memory image blobs keyed by element id.
#[derive(Default)]
pub struct MemoryImageStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageStore for MemoryImageStore {
    fn store(&self, id: &str, blob: Vec<u8>) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut blobs = self.blobs.write().map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            blobs.insert(id, blob);
            Ok(())
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>> {
        let id = id.to_string();
        Box::pin(async move {
            let blobs = self.blobs.read().map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(blobs.get(&id).cloned())
        })
    }
}
