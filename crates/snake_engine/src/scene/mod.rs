//! Scene management
//!
//! Game states, the objects and cameras they own, and the context handed to
//! their hooks.
//!
//! ## Architecture
//!
//! ```text
//! StateManager ──► GameState ──► Scene ─┬─► ObjectManager ──► Object + Behavior
//!                                       └─► CameraManager ──► Camera2D
//! ```
//!
//! Hooks receive an [`EngineContext`] (states) or [`ObjectContext`]
//! (objects) borrowing the render manager and request queue for the length
//! of the call.

mod camera_manager;
mod context;
mod game_state;
mod object;
mod object_manager;
mod state_manager;

pub use camera_manager::{CameraId, CameraManager, MAIN_CAMERA};
pub use context::{EngineContext, EngineRequests, ObjectContext};
pub use game_state::{GameState, Scene};
pub use object::{Behavior, Object, ObjectFlags, ObjectId, ObjectStore, TextComponent};
pub use object_manager::{ObjectManager, COLLIDER_DEBUG_COLOR};
pub use state_manager::StateManager;
