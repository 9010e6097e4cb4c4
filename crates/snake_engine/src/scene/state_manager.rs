//! Current game state plus deferred state switches

use crate::scene::game_state::{system_free, system_init, system_load, system_unload, system_update};
use crate::scene::{EngineContext, GameState};

/// Runs one [`GameState`] at a time.
///
/// Switches requested during a frame take effect at the start of the next
/// [`update`](Self::update), so a state is never replaced while one of its
/// own hooks is running.
#[derive(Default)]
pub struct StateManager {
    current: Option<Box<dyn GameState>>,
    next: Option<Box<dyn GameState>>,
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("has_state", &self.current.is_some())
            .field("switch_pending", &self.next.is_some())
            .finish()
    }
}

impl StateManager {
    /// No state
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `state` at the next update
    pub fn change_state(&mut self, state: Box<dyn GameState>) {
        self.next = Some(state);
    }

    /// Running state
    pub fn current(&self) -> Option<&dyn GameState> {
        self.current.as_deref()
    }

    /// Running state, mutable
    pub fn current_mut(&mut self) -> Option<&mut (dyn GameState + 'static)> {
        self.current.as_deref_mut()
    }

    /// Whether a switch is waiting for the next update
    pub fn has_pending_state(&self) -> bool {
        self.next.is_some()
    }

    /// Apply pending switches and restarts, then run one frame of the
    /// current state: update, collisions, collider debug, late update
    pub fn update(&mut self, dt: f32, ctx: &mut EngineContext<'_>) {
        if let Some(next) = ctx.requests.take_next_state() {
            self.next = Some(next);
        }
        if let Some(mut next) = self.next.take() {
            if let Some(mut old) = self.current.take() {
                system_free(old.as_mut(), ctx);
                system_unload(old.as_mut(), ctx);
            }
            system_load(next.as_mut(), ctx);
            system_init(next.as_mut(), ctx);
            next.scene_mut()
                .cameras
                .set_screen_size_for_all(ctx.window_size.x as u32, ctx.window_size.y as u32);
            self.current = Some(next);
            log::info!("Game state switched");
        }

        if ctx.requests.take_restart() {
            self.restart(ctx);
        }

        if let Some(state) = self.current.as_deref_mut() {
            system_update(state, dt, ctx);
        }
    }

    /// Let the current state submit, then flush the draw and debug line
    /// queues
    pub fn draw(&mut self, ctx: &mut EngineContext<'_>) {
        let Some(state) = self.current.as_deref_mut() else { return };
        state.draw(ctx);
        let window_size = ctx.window_size;
        ctx.render
            .flush_draw_commands(state.scene_mut().objects.objects_mut(), window_size);
        ctx.render.flush_debug_line_draw_commands(window_size);
    }

    /// Free and re-initialise the current state without unloading it
    pub fn restart(&mut self, ctx: &mut EngineContext<'_>) {
        if let Some(state) = self.current.as_deref_mut() {
            system_free(state, ctx);
            system_init(state, ctx);
            log::info!("Game state restarted");
        }
    }

    /// Free and unload the current state
    pub fn free(&mut self, ctx: &mut EngineContext<'_>) {
        if let Some(mut state) = self.current.take() {
            system_free(state.as_mut(), ctx);
            system_unload(state.as_mut(), ctx);
        }
        self.next = None;
    }
}
