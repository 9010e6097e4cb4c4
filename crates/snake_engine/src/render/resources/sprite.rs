//! Sprite sheets and frame animation
//!
//! A sheet slices a texture into a grid of equally sized frames, numbered
//! left to right and top to bottom. UV offsets address rows bottom-up, the
//! way textures are laid out on upload.

use std::collections::HashMap;

use crate::foundation::math::Vec2;
use crate::render::resources::{SpriteSheetId, Texture, TextureId};
use crate::render::{RenderError, RenderResult};

/// Named frame sequence
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteClip {
    /// Frame indices in playback order
    pub frames: Vec<usize>,
    /// Seconds per frame
    pub frame_duration: f32,
    /// Restart after the last frame
    pub looping: bool,
}

/// Texture sliced into a frame grid
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    texture: TextureId,
    texture_size: (u32, u32),
    frame_size: (u32, u32),
    columns: u32,
    rows: u32,
    clips: HashMap<String, SpriteClip>,
}

impl SpriteSheet {
    /// Slice `texture` into `frame_width` x `frame_height` frames
    pub fn new(texture_id: TextureId, texture: &Texture, frame_width: u32, frame_height: u32) -> RenderResult<Self> {
        if frame_width == 0 || frame_height == 0 {
            return Err(RenderError::InvalidConfiguration(format!(
                "sprite frame size must be non-zero, got {frame_width}x{frame_height}"
            )));
        }
        let columns = texture.width() / frame_width;
        let rows = texture.height() / frame_height;
        if columns == 0 || rows == 0 {
            return Err(RenderError::InvalidConfiguration(format!(
                "sprite frame {frame_width}x{frame_height} is larger than texture {}x{}",
                texture.width(),
                texture.height()
            )));
        }
        Ok(Self {
            texture: texture_id,
            texture_size: (texture.width(), texture.height()),
            frame_size: (frame_width, frame_height),
            columns,
            rows,
            clips: HashMap::new(),
        })
    }

    /// Source texture
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// Frames per row
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Rows of frames
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total frame count
    pub fn frame_count(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    /// UV offset of the bottom-left corner of `frame`
    pub fn uv_offset(&self, frame: usize) -> Vec2 {
        let columns = self.columns as usize;
        let col = frame % columns;
        let row = (frame / columns).min(self.rows as usize - 1);
        let flipped_row = self.rows as usize - 1 - row;
        Vec2::new(
            (col as u32 * self.frame_size.0) as f32 / self.texture_size.0 as f32,
            (flipped_row as u32 * self.frame_size.1) as f32 / self.texture_size.1 as f32,
        )
    }

    /// UV extent of one frame
    pub fn uv_scale(&self) -> Vec2 {
        Vec2::new(
            self.frame_size.0 as f32 / self.texture_size.0 as f32,
            self.frame_size.1 as f32 / self.texture_size.1 as f32,
        )
    }

    /// Register a named clip, replacing any clip with the same name
    pub fn add_clip(&mut self, name: &str, frames: Vec<usize>, frame_duration: f32, looping: bool) {
        if let Some(bad) = frames.iter().find(|&&f| f >= self.frame_count()) {
            log::warn!("Clip '{name}' references frame {bad} outside the sheet ({} frames)", self.frame_count());
        }
        self.clips.insert(name.to_string(), SpriteClip { frames, frame_duration, looping });
    }

    /// Clip registered under `name`
    pub fn clip(&self, name: &str) -> Option<&SpriteClip> {
        self.clips.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Playback {
    Range { start: usize, end: usize, looping: bool },
    Clip { clip: SpriteClip, index: usize },
}

/// Advances frames of a sprite sheet over time
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAnimator {
    sheet: SpriteSheetId,
    frame_time: f32,
    elapsed: f32,
    current_frame: usize,
    playback: Playback,
}

impl SpriteAnimator {
    /// Animator over the whole sheet at `frame_time` seconds per frame
    pub fn new(sheet_id: SpriteSheetId, sheet: &SpriteSheet, frame_time: f32, looping: bool) -> Self {
        Self {
            sheet: sheet_id,
            frame_time,
            elapsed: 0.0,
            current_frame: 0,
            playback: Playback::Range {
                start: 0,
                end: sheet.frame_count().saturating_sub(1),
                looping,
            },
        }
    }

    /// Sheet being animated
    pub fn sheet(&self) -> SpriteSheetId {
        self.sheet
    }

    /// Frame currently shown
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Jump to a frame and reset timing
    pub fn set_frame(&mut self, frame: usize) {
        self.current_frame = frame;
        self.elapsed = 0.0;
    }

    /// Seconds per frame for range playback
    pub fn set_frame_time(&mut self, frame_time: f32) {
        self.frame_time = frame_time;
    }

    /// Play frames `start..=end`
    pub fn play_range(&mut self, start: usize, end: usize, looping: bool) {
        self.playback = Playback::Range { start, end: end.max(start), looping };
        self.current_frame = start;
        self.elapsed = 0.0;
    }

    /// Play a named clip of `sheet`. Returns false if the clip is unknown.
    pub fn play_clip(&mut self, sheet: &SpriteSheet, name: &str) -> bool {
        let Some(clip) = sheet.clip(name) else {
            log::warn!("Sprite clip '{name}' not found");
            return false;
        };
        if clip.frames.is_empty() {
            log::warn!("Sprite clip '{name}' has no frames");
            return false;
        }
        self.current_frame = clip.frames[0];
        self.elapsed = 0.0;
        self.playback = Playback::Clip { clip: clip.clone(), index: 0 };
        true
    }

    /// Advance by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        let frame_time = match &self.playback {
            Playback::Range { .. } => self.frame_time,
            Playback::Clip { clip, .. } => clip.frame_duration,
        };
        if frame_time <= 0.0 {
            return;
        }

        self.elapsed += dt;
        while self.elapsed >= frame_time {
            self.elapsed -= frame_time;
            match &mut self.playback {
                Playback::Range { start, end, looping } => {
                    self.current_frame += 1;
                    if self.current_frame > *end {
                        self.current_frame = if *looping { *start } else { *end };
                    }
                }
                Playback::Clip { clip, index } => {
                    *index += 1;
                    if *index >= clip.frames.len() {
                        *index = if clip.looping { 0 } else { clip.frames.len() - 1 };
                    }
                    self.current_frame = clip.frames[*index];
                }
            }
        }
    }
}
