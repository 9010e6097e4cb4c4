//! Time management utilities

use std::time::Instant;

/// Frame timer with a once-per-second FPS sample
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    fps_accumulator: f32,
    fps_frames: u32,
    last_fps: Option<u32>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            fps_accumulator: 0.0,
            fps_frames: 0,
            last_fps: None,
        }
    }

    /// Advance by the wall-clock time since the previous tick.
    /// Returns the delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(elapsed)
    }

    /// Advance by an explicit delta, used for fixed-step and headless runs
    pub fn advance(&mut self, delta: f32) -> f32 {
        self.delta_time = delta.max(0.0);
        self.total_time += self.delta_time;
        self.frame_count += 1;

        self.fps_accumulator += self.delta_time;
        self.fps_frames += 1;
        if self.fps_accumulator >= 1.0 {
            self.last_fps = Some(self.fps_frames);
            self.fps_accumulator = 0.0;
            self.fps_frames = 0;
        }
        self.delta_time
    }

    /// Frames counted during the last full second, taken once.
    /// Returns `None` until a new sample is available.
    pub fn take_fps_sample(&mut self) -> Option<u32> {
        self.last_fps.take()
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
