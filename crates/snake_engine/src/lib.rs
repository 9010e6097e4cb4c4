//! # SNAKE Engine
//!
//! A 2D game engine runtime: tag-keyed render resources, layered and
//! instanced batch rendering, spatial-hash collision with named groups, and
//! a game state lifecycle driving it all.
//!
//! ## Features
//!
//! - **Batch Rendering**: objects grouped by layer, shader and
//!   mesh/material/sprite sheet, with instanced draws where the material
//!   allows it
//! - **Camera Culling**: only objects overlapping the camera rectangle are
//!   submitted
//! - **Collision**: circle and box colliders, category/mask filtering and a
//!   uniform spatial hash broad phase
//! - **Game States**: deferred state switches and per-object lifecycle hooks
//! - **Headless**: a recording backend and headless platform run the whole
//!   loop without a GPU or window
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snake_engine::prelude::*;
//!
//! struct Title {
//!     scene: Scene,
//! }
//!
//! impl GameState for Title {
//!     fn scene(&self) -> &Scene {
//!         &self.scene
//!     }
//!
//!     fn scene_mut(&mut self) -> &mut Scene {
//!         &mut self.scene
//!     }
//!
//!     fn init(&mut self, ctx: &mut EngineContext<'_>) {
//!         let mut quad = Object::new();
//!         quad.set_mesh(ctx.render, engine_tags::DEFAULT_MESH);
//!         quad.set_material(ctx.render, engine_tags::ERROR_MATERIAL);
//!         self.scene.objects.add_object(quad, "quad");
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::load_or_default("engine.toml");
//!     let platform = HeadlessPlatform::new(config.window.width, config.window.height).with_frame_limit(60);
//!     let mut engine = Engine::new(config, platform, Box::new(RecordingBackend::new()))?;
//!     engine.change_state(Box::new(Title { scene: Scene::new() }));
//!     engine.run();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod platform;
pub mod render;
pub mod scene;
pub mod spatial;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, EngineConfig},
        foundation::{
            math::{Mat4, Transform2D, Vec2, Vec3, Vec4},
            time::Timer,
        },
        physics::{Collider, CollisionGroupRegistry},
        platform::{HeadlessPlatform, Platform},
        render::{
            engine_tags,
            resources::{Font, Material, Mesh, Shader, SpriteAnimator, SpriteSheet, TextAlignH, TextAlignV, Texture},
            Camera2D, RecordingBackend, RenderBackend, RenderError, RenderManager,
        },
        scene::{
            Behavior, CameraManager, EngineContext, GameState, Object, ObjectContext, ObjectId, ObjectManager, Scene,
        },
        Engine, EngineError,
    };
}
