//! Window and event pump boundary
//!
//! The engine never creates a window itself. A [`Platform`] wraps whatever
//! windowing library the game uses and is driven once per frame.

use crate::foundation::math::Vec4;

/// Windowing services consumed by the main loop
pub trait Platform {
    /// Current drawable size in pixels
    fn window_size(&self) -> (u32, u32);

    /// Pump pending window and input events
    fn poll_events(&mut self);

    /// Whether the user asked to close the window
    fn should_close(&self) -> bool;

    /// Clear the whole back buffer to `color`
    fn clear_screen(&mut self, color: Vec4);

    /// Present the back buffer
    fn swap_buffers(&mut self);

    /// Replace the window title
    fn set_title(&mut self, title: &str);
}

/// Windowless platform that asks to close after a fixed number of frames
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    width: u32,
    height: u32,
    frames_left: Option<u64>,
    frames_presented: u64,
    title: String,
}

impl HeadlessPlatform {
    /// Platform reporting a `width`×`height` window that never closes
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames_left: None,
            frames_presented: 0,
            title: String::new(),
        }
    }

    /// Close after `frames` presented frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frames_left = Some(frames);
        self
    }

    /// Change the reported window size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Frames presented so far
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Last title set
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Platform for HeadlessPlatform {
    fn window_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn poll_events(&mut self) {}

    fn should_close(&self) -> bool {
        self.frames_left == Some(0)
    }

    fn clear_screen(&mut self, _color: Vec4) {}

    fn swap_buffers(&mut self) {
        self.frames_presented += 1;
        if let Some(left) = &mut self.frames_left {
            *left = left.saturating_sub(1);
        }
    }

    fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
    }
}
