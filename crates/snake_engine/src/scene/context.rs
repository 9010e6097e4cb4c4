//! Borrowed engine services handed to states and objects
//!
//! Managers are constructed explicitly and lent to hooks for the duration
//! of a call; nothing is global.

use crate::foundation::math::Vec2;
use crate::physics::CollisionGroupRegistry;
use crate::render::RenderManager;
use crate::scene::{CameraManager, GameState, Object};

/// Deferred requests raised by hooks and honoured between frames
#[derive(Default)]
pub struct EngineRequests {
    quit: bool,
    restart: bool,
    next_state: Option<Box<dyn GameState>>,
}

impl std::fmt::Debug for EngineRequests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRequests")
            .field("quit", &self.quit)
            .field("restart", &self.restart)
            .field("next_state", &self.next_state.is_some())
            .finish()
    }
}

impl EngineRequests {
    /// No pending requests
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the main loop after the current frame
    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    /// Whether a quit was requested
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Switch to `state` at the start of the next update
    pub fn change_state(&mut self, state: Box<dyn GameState>) {
        self.next_state = Some(state);
    }

    /// Free and re-initialise the current state at the next update
    pub fn restart_state(&mut self) {
        self.restart = true;
    }

    pub(crate) fn take_next_state(&mut self) -> Option<Box<dyn GameState>> {
        self.next_state.take()
    }

    pub(crate) fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart)
    }
}

/// Services available to game state hooks
pub struct EngineContext<'a> {
    /// Resource registries and the draw pipeline
    pub render: &'a mut RenderManager,
    /// Quit and state change requests
    pub requests: &'a mut EngineRequests,
    /// Window size in pixels
    pub window_size: Vec2,
    /// Whether collider outlines are drawn
    pub debug_draw: bool,
}

/// Services available to object hooks
pub struct ObjectContext<'a> {
    /// Resource registries and the draw pipeline
    pub render: &'a mut RenderManager,
    /// Cameras of the owning scene
    pub cameras: &'a mut CameraManager,
    /// Collision groups of the owning object manager
    pub collision_groups: &'a mut CollisionGroupRegistry,
    /// Quit and state change requests
    pub requests: &'a mut EngineRequests,
    /// Window size in pixels
    pub window_size: Vec2,
    pub(crate) spawned: &'a mut Vec<(Object, String)>,
}

impl ObjectContext<'_> {
    /// Queue a new object. It is initialised with the next batch of
    /// pending objects.
    pub fn spawn(&mut self, object: Object, tag: &str) {
        self.spawned.push((object, tag.to_string()));
    }
}
