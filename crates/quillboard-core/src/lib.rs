//! Quillboard Core Library
//!
//! Scene interaction engine for the Quillboard drawing surface: element model,
//! geometry, pointer-driven editing with undo/redo, and last-writer-wins room
//! synchronization. Rendering and the socket are left to the embedder.

pub mod camera;
pub mod canvas;
pub mod collaboration;
pub mod config;
pub mod geometry;
pub mod history;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod sync;
pub mod tools;

pub use camera::Camera;
pub use canvas::{Action, Canvas, LocalChange};
pub use collaboration::{MergeReport, Participant, SyncEngine, SyncEvent};
pub use config::{CanvasConfig, ConfigError};
pub use geometry::{BoundingBox, bounding_box, hit_test};
pub use history::{History, Scene};
pub use shapes::{Element, ElementId, ElementKind, ElementStyle, HandlePosition};
pub use sync::{ClientMessage, ConnectionState, MemoryTransport, ServerMessage, SyncError, Transport, TransportError};
pub use tools::{ToolContext, ToolKind};
