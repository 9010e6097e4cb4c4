//! # Rendering
//!
//! Tag-keyed resource registries, render layers and the batching pipeline
//! that turns submitted objects into backend draw calls.
//!
//! ## Frame flow
//!
//! ```text
//! submit(objects, camera)      FrustumCuller -> build_render_map
//!      ↓
//! render_map[layer][shader][InstanceBatchKey] -> [(object, camera)]
//!      ↓
//! flush_draw_commands          instanced or per-object draws
//!      ↓
//! flush_debug_line_draw_commands
//! ```
//!
//! The map is rebuilt every frame and cleared by the flush, so nothing
//! carries over between frames.
//!
//! The GPU sits behind [`RenderBackend`]. [`RecordingBackend`] implements it
//! headlessly.

pub mod backend;
pub mod backends;
pub mod batch_key;
pub mod camera;
pub mod culling;
pub mod debug_lines;
mod engine_shaders;
pub mod layers;
pub mod render_manager;
pub mod resources;

pub use backend::{BackendResult, InstanceData, LineVertex, Rect, RenderBackend};
pub use backends::{DrawCommand, RecordingBackend};
pub use batch_key::InstanceBatchKey;
pub use camera::Camera2D;
pub use culling::FrustumCuller;
pub use debug_lines::DebugLineQueue;
pub use layers::{RenderLayerManager, MAX_LAYERS};
pub use render_manager::{engine_tags, BatchEntry, RenderManager, RenderStats};

use thiserror::Error;

/// Rendering system errors
///
/// None of these abort a frame. Registration errors leave the registries
/// unchanged; lookups that fail fall back to engine resources instead of
/// returning an error.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A resource with this tag is already registered
    #[error("{kind} '{tag}' is already registered")]
    DuplicateTag {
        /// Registry the tag was rejected from
        kind: &'static str,
        /// Rejected tag
        tag: String,
    },

    /// No resource with this tag is registered
    #[error("{kind} '{tag}' not found")]
    NotFound {
        /// Registry that was searched
        kind: &'static str,
        /// Missing tag
        tag: String,
    },

    /// The resource is still referenced by a live object
    #[error("{kind} '{tag}' is still in use")]
    ResourceInUse {
        /// Registry the resource belongs to
        kind: &'static str,
        /// Tag of the resource
        tag: String,
    },

    /// A parameter is outside its valid range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Resource creation or loading failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
