//! Game states and the scene they own

use crate::scene::{CameraManager, EngineContext, ObjectManager};

/// Objects and cameras of one game state
#[derive(Debug, Default)]
pub struct Scene {
    /// Objects of the state
    pub objects: ObjectManager,
    /// Cameras of the state, `"main"` active by default
    pub cameras: CameraManager,
}

impl Scene {
    /// Empty scene with a main camera
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty scene whose collision grid uses `cell_size`
    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            objects: ObjectManager::with_cell_size(cell_size),
            cameras: CameraManager::new(),
        }
    }

    /// Advance every object by `dt`
    pub fn update(&mut self, dt: f32, ctx: &mut EngineContext<'_>) {
        self.objects.update_all(dt, ctx, &mut self.cameras);
    }

    /// Submit every object through the active camera
    pub fn draw(&mut self, ctx: &mut EngineContext<'_>) {
        self.objects.draw_all(ctx.render, self.cameras.active_camera());
    }
}

/// A screen of the game: title, level, game over.
///
/// Only [`scene`](Self::scene) and [`scene_mut`](Self::scene_mut) are
/// required. The default `update` and `draw` run the scene's objects; a
/// state overriding them should call [`Scene::update`] / [`Scene::draw`]
/// itself if it still wants that.
pub trait GameState {
    /// Owned scene
    fn scene(&self) -> &Scene;

    /// Owned scene, mutable
    fn scene_mut(&mut self) -> &mut Scene;

    /// Register resources the state needs
    fn load(&mut self, _ctx: &mut EngineContext<'_>) {}

    /// Create the initial objects
    fn init(&mut self, _ctx: &mut EngineContext<'_>) {}

    /// Called after the scene's objects were initialised
    fn late_init(&mut self, _ctx: &mut EngineContext<'_>) {}

    /// Per-frame logic
    fn update(&mut self, dt: f32, ctx: &mut EngineContext<'_>) {
        self.scene_mut().update(dt, ctx);
    }

    /// Called after collisions were dispatched
    fn late_update(&mut self, _dt: f32, _ctx: &mut EngineContext<'_>) {}

    /// Submit objects for drawing
    fn draw(&mut self, ctx: &mut EngineContext<'_>) {
        self.scene_mut().draw(ctx);
    }

    /// Called before the scene's objects are freed
    fn free(&mut self, _ctx: &mut EngineContext<'_>) {}

    /// Release resources registered in `load`
    fn unload(&mut self, _ctx: &mut EngineContext<'_>) {}
}

pub(crate) fn system_load(state: &mut dyn GameState, ctx: &mut EngineContext<'_>) {
    state.load(ctx);
}

pub(crate) fn system_init(state: &mut dyn GameState, ctx: &mut EngineContext<'_>) {
    state.init(ctx);
    {
        let Scene { objects, cameras } = state.scene_mut();
        objects.init_all(ctx, cameras);
    }
    state.late_init(ctx);
    let Scene { objects, cameras } = state.scene_mut();
    objects.add_all_pending_objects(ctx, cameras);
}

pub(crate) fn system_update(state: &mut dyn GameState, dt: f32, ctx: &mut EngineContext<'_>) {
    state.update(dt, ctx);
    {
        let Scene { objects, cameras } = state.scene_mut();
        objects.check_collision(ctx, cameras);
        if ctx.debug_draw {
            objects.draw_collider_debug(ctx.render, cameras.active_camera());
        }
    }
    state.late_update(dt, ctx);
}

pub(crate) fn system_free(state: &mut dyn GameState, ctx: &mut EngineContext<'_>) {
    state.free(ctx);
    let Scene { objects, cameras } = state.scene_mut();
    objects.free_all(ctx, cameras);
}

pub(crate) fn system_unload(state: &mut dyn GameState, ctx: &mut EngineContext<'_>) {
    state.unload(ctx);
}
