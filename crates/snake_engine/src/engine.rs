//! Core engine implementation

use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::foundation::logging;
use crate::foundation::math::{Vec2, Vec4};
use crate::foundation::time::Timer;
use crate::platform::Platform;
use crate::render::{Rect, RenderBackend, RenderError, RenderManager};
use crate::scene::{EngineContext, EngineRequests, GameState, StateManager};

/// Main engine struct
///
/// Owns the render manager, the state manager and the platform, and drives
/// the frame loop:
///
/// ```text
/// tick timer -> poll events -> clear -> state update -> state draw -> swap
/// ```
pub struct Engine<P: Platform> {
    config: EngineConfig,
    platform: P,
    render: RenderManager,
    states: StateManager,
    requests: EngineRequests,
    timer: Timer,
    running: bool,
    debug_draw: bool,
    viewport: (u32, u32),
}

impl<P: Platform> std::fmt::Debug for Engine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("running", &self.running)
            .field("debug_draw", &self.debug_draw)
            .field("render", &self.render)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

impl<P: Platform> Engine<P> {
    /// Create a new engine drawing through `backend` into `platform`'s window
    pub fn new(config: EngineConfig, platform: P, backend: Box<dyn RenderBackend>) -> Result<Self, EngineError> {
        logging::init_with_level(config.debug.level_filter());
        log::info!("Initializing engine...");

        let mut render = RenderManager::new(backend)?;
        for (tag, id) in &config.render.layers {
            if let Err(e) = render.register_render_layer(tag, *id) {
                log::error!("Render layer '{tag}' not registered: {e}");
            }
        }

        Ok(Self {
            debug_draw: config.debug.draw_colliders,
            config,
            platform,
            render,
            states: StateManager::new(),
            requests: EngineRequests::new(),
            timer: Timer::new(),
            running: true,
            viewport: (0, 0),
        })
    }

    /// Queue the first (or next) game state
    pub fn change_state(&mut self, state: Box<dyn GameState>) {
        self.states.change_state(state);
    }

    /// Run frames until quit is requested or the platform closes, then free
    /// the current state
    pub fn run(&mut self) {
        log::info!("Starting main loop...");
        self.running = true;
        while self.running && !self.platform.should_close() {
            let dt = self.timer.tick();
            self.frame(dt);
        }
        self.shutdown();
        log::info!("Engine shutdown complete");
    }

    /// Run exactly one frame with a fixed `dt`
    pub fn step(&mut self, dt: f32) {
        let dt = self.timer.advance(dt);
        self.frame(dt);
    }

    fn frame(&mut self, dt: f32) {
        if self.config.window.show_fps_in_title {
            if let Some(fps) = self.timer.take_fps_sample() {
                let title = format!("{} - FPS: {fps}", self.config.window.title);
                self.platform.set_title(&title);
            }
        }

        self.platform.poll_events();

        let (width, height) = self.platform.window_size();
        if self.viewport != (width, height) {
            self.viewport = (width, height);
            let clamp = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
            self.render.set_viewport(Rect::new(0, 0, clamp(width), clamp(height)));
        }
        self.platform.clear_screen(Vec4::from(self.config.render.clear_color));

        let mut ctx = EngineContext {
            render: &mut self.render,
            requests: &mut self.requests,
            window_size: Vec2::new(width as f32, height as f32),
            debug_draw: self.debug_draw,
        };
        self.states.update(dt, &mut ctx);
        self.states.draw(&mut ctx);

        self.platform.swap_buffers();

        if self.requests.quit_requested() {
            self.running = false;
        }
    }

    /// Free the current state
    pub fn shutdown(&mut self) {
        let (width, height) = self.platform.window_size();
        let mut ctx = EngineContext {
            render: &mut self.render,
            requests: &mut self.requests,
            window_size: Vec2::new(width as f32, height as f32),
            debug_draw: self.debug_draw,
        };
        self.states.free(&mut ctx);
    }

    /// Stop the loop after the current frame
    pub fn request_quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop will run another frame
    pub fn is_running(&self) -> bool {
        self.running && !self.platform.should_close()
    }

    /// Toggle collider outline drawing
    pub fn render_debug_draws(&mut self, enabled: bool) {
        self.debug_draw = enabled;
    }

    /// Whether collider outlines are drawn
    pub fn should_render_debug_draws(&self) -> bool {
        self.debug_draw
    }

    /// Render manager, e.g. to register resources before the first state
    pub fn render(&self) -> &RenderManager {
        &self.render
    }

    /// Mutable render manager
    pub fn render_mut(&mut self) -> &mut RenderManager {
        &mut self.render
    }

    /// State manager
    pub fn states(&self) -> &StateManager {
        &self.states
    }

    /// Platform
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable platform
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Frame timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Configuration the engine was created with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine initialization failed
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Rendering setup failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessPlatform;
    use crate::render::backends::{DrawCommand, RecordingBackend};
    use crate::render::engine_tags;
    use crate::scene::{Behavior, Object, ObjectContext, Scene};

    struct QuitAfter {
        frames: u32,
    }

    impl Behavior for QuitAfter {
        fn update(&mut self, _object: &mut Object, _dt: f32, ctx: &mut ObjectContext<'_>) {
            self.frames -= 1;
            if self.frames == 0 {
                ctx.requests.request_quit();
            }
        }
    }

    struct Demo {
        scene: Scene,
        quit_after: u32,
    }

    impl GameState for Demo {
        fn scene(&self) -> &Scene {
            &self.scene
        }
        fn scene_mut(&mut self) -> &mut Scene {
            &mut self.scene
        }
        fn init(&mut self, ctx: &mut EngineContext<'_>) {
            let mut object = Object::new().with_behavior(QuitAfter { frames: self.quit_after });
            object.set_mesh(ctx.render, engine_tags::DEFAULT_MESH);
            object.set_material(ctx.render, engine_tags::ERROR_MATERIAL);
            self.scene.objects.add_object(object, "timer");
        }
    }

    fn engine(frame_limit: u64) -> Engine<HeadlessPlatform> {
        let config = EngineConfig::default().with_window("Demo", 320, 240).with_layer("Background", 0);
        let platform = HeadlessPlatform::new(320, 240).with_frame_limit(frame_limit);
        Engine::new(config, platform, Box::new(RecordingBackend::new())).unwrap()
    }

    #[test]
    fn test_run_stops_when_platform_closes() {
        let mut engine = engine(3);
        engine.change_state(Box::new(Demo { scene: Scene::new(), quit_after: 100 }));
        engine.run();

        assert_eq!(engine.platform().frames_presented(), 3);
        assert!(engine.states().current().is_none());
        assert_eq!(engine.render().layers().layer_id("Background"), Some(0));
    }

    #[test]
    fn test_quit_request_ends_loop() {
        let mut engine = engine(100);
        engine.change_state(Box::new(Demo { scene: Scene::new(), quit_after: 2 }));
        engine.run();

        // The object is initialised and updated in the first frame.
        assert_eq!(engine.platform().frames_presented(), 2);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_step_draws_and_sets_viewport() {
        let mut engine = engine(100);
        engine.change_state(Box::new(Demo { scene: Scene::new(), quit_after: 100 }));
        engine.step(0.016);

        let backend = engine.render().backend().as_any().downcast_ref::<RecordingBackend>().unwrap();
        assert!(backend.commands().contains(&DrawCommand::Viewport(Rect::new(0, 0, 320, 240))));
        assert_eq!(backend.draw_count(), 1);
    }

    #[test]
    fn test_fps_shown_in_title() {
        let mut engine = engine(100);
        for _ in 0..5 {
            engine.step(0.25);
        }
        assert!(engine.platform().title().starts_with("Demo - FPS: "));
    }
}
