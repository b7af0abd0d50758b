//! Storage abstraction for scene persistence and image blobs.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS, SCENE_KEY};
pub use memory::{MemoryImageStore, MemoryStorage};

#[cfg(not(target_arch = "wasm32"))]
pub use autosave::{PlatformAutoSaveManager, create_autosave_manager, create_default_storage};
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::history::Scene;
use crate::shapes::Element;
use log::warn;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Scene persistence keyed by an opaque name.
///
/// Corrupted data is not an error: `load` logs it and reports the scene as
/// absent, and elements that fail to parse are skipped.
pub trait Storage: Send + Sync {
    /// Save a scene.
    fn save(&self, key: &str, scene: &[Element]) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a scene, `None` if missing or unreadable.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Scene>>>;

    /// Delete a scene.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Check if a scene exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Image bytes stored out of band from the scene, keyed by element id.
pub trait ImageStore: Send + Sync {
    fn store(&self, id: &str, blob: Vec<u8>) -> BoxFuture<'_, StorageResult<()>>;

    fn get(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>>;
}

pub(crate) fn encode_scene(scene: &[Element]) -> StorageResult<String> {
    serde_json::to_string(scene).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse a persisted scene, skipping elements that do not parse.
pub(crate) fn decode_scene(key: &str, json: &str) -> Option<Scene> {
    let values: Vec<Value> = match serde_json::from_str(json) {
        Ok(values) => values,
        Err(e) => {
            warn!("Ignoring corrupted scene {}: {}", key, e);
            return None;
        }
    };
    let scene = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Element>(value) {
            Ok(element) => Some(element),
            Err(e) => {
                warn!("Skipping unreadable element in {}: {}", key, e);
                None
            }
        })
        .collect();
    Some(scene)
}

#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_skips_bad_elements() {
        let json = r##"[{"type":"rectangle","id":"a","x1":0,"y1":0,"x2":1,"y2":1,"color":"#000","strokeWidth":1},{"type":"blob"}]"##;
        let scene = decode_scene("elements", json).unwrap();
        assert_eq!(scene.len(), 1);
        assert_eq!(scene[0].id(), "a");
    }

    #[test]
    fn test_decode_corrupted_is_absent() {
        assert!(decode_scene("elements", "{\"oops\"").is_none());
        assert!(decode_scene("elements", "{}").is_none());
    }
}
