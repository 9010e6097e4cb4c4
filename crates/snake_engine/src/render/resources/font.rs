//! Text rendering boundary
//!
//! Glyph rasterisation happens outside the engine. A [`Font`] hands over a
//! baked atlas texture and turns strings into meshes that sample it.
//! [`BitmapFont`] implements the layout half for any pre-baked glyph table.

use std::collections::HashMap;

use crate::foundation::math::Vec2;
use crate::render::resources::{Mesh, PrimitiveType, Texture, Vertex};

/// Smallest accepted font pixel size
pub const MIN_FONT_PIXEL_SIZE: u32 = 4;
/// Largest accepted font pixel size
pub const MAX_FONT_PIXEL_SIZE: u32 = 64;

/// Horizontal text alignment relative to x = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignH {
    /// Lines start at x = 0
    #[default]
    Left,
    /// Lines are centred on x = 0
    Center,
    /// Lines end at x = 0
    Right,
}

/// Vertical text alignment relative to y = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignV {
    /// The first line starts at y = 0 and lines go down
    #[default]
    Top,
    /// The block is centred on y = 0
    Middle,
    /// The last line ends at y = 0
    Bottom,
}

/// Baked font that can lay out text
pub trait Font {
    /// Nominal pixel size the atlas was baked at
    fn pixel_size(&self) -> u32;

    /// Glyph atlas sampled by generated meshes
    fn atlas(&self) -> &Texture;

    /// Width of the widest line and total height of `text`
    fn text_size(&self, text: &str) -> Vec2;

    /// Quad mesh for `text`, aligned around the origin
    fn generate_text_mesh(&self, text: &str, align_h: TextAlignH, align_v: TextAlignV) -> Mesh;
}

/// Placement of one glyph inside the atlas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Bitmap size in pixels
    pub size: Vec2,
    /// Offset from the pen position to the bitmap's left/top edge
    pub bearing: Vec2,
    /// Pen advance in pixels
    pub advance: f32,
    /// UV of the bitmap's bottom-left corner
    pub uv_min: Vec2,
    /// UV of the bitmap's top-right corner
    pub uv_max: Vec2,
}

/// Font backed by a pre-baked glyph table and atlas
pub struct BitmapFont {
    pixel_size: u32,
    atlas: Texture,
    glyphs: HashMap<char, Glyph>,
    fallback: char,
}

impl BitmapFont {
    /// Font from an atlas and its glyph table. Unknown characters render as `'?'`.
    pub fn new(pixel_size: u32, atlas: Texture, glyphs: HashMap<char, Glyph>) -> Self {
        Self { pixel_size, atlas, glyphs, fallback: '?' }
    }

    /// Character substituted for glyphs missing from the table
    pub fn with_fallback(mut self, fallback: char) -> Self {
        self.fallback = fallback;
        self
    }

    fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c).or_else(|| self.glyphs.get(&self.fallback))
    }

    fn line_width(&self, line: &str) -> f32 {
        line.chars().filter_map(|c| self.glyph(c)).map(|g| g.advance).sum()
    }
}

impl Font for BitmapFont {
    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    fn atlas(&self) -> &Texture {
        &self.atlas
    }

    fn text_size(&self, text: &str) -> Vec2 {
        let width = text.split('\n').map(|line| self.line_width(line)).fold(0.0, f32::max);
        let lines = text.split('\n').count();
        Vec2::new(width, (lines as u32 * self.pixel_size) as f32)
    }

    fn generate_text_mesh(&self, text: &str, align_h: TextAlignH, align_v: TextAlignV) -> Mesh {
        let line_height = self.pixel_size as f32;
        let block = self.text_size(text);
        let top = match align_v {
            TextAlignV::Top => 0.0,
            TextAlignV::Middle => block.y * 0.5,
            TextAlignV::Bottom => block.y,
        };

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for (line_index, line) in text.split('\n').enumerate() {
            let width = self.line_width(line);
            let mut pen_x = match align_h {
                TextAlignH::Left => 0.0,
                TextAlignH::Center => -width * 0.5,
                TextAlignH::Right => -width,
            };
            let baseline = top - (line_index as f32 + 1.0) * line_height;

            for c in line.chars() {
                let Some(glyph) = self.glyph(c) else { continue };
                let x = pen_x + glyph.bearing.x;
                let y = baseline - (glyph.size.y - glyph.bearing.y);
                let (w, h) = (glyph.size.x, glyph.size.y);
                let (u0, v0, u1, v1) = (glyph.uv_min.x, glyph.uv_min.y, glyph.uv_max.x, glyph.uv_max.y);

                let base = vertices.len() as u32;
                vertices.extend_from_slice(&[
                    Vertex::new([x, y + h, 0.0], [u0, v1]),
                    Vertex::new([x, y, 0.0], [u0, v0]),
                    Vertex::new([x + w, y, 0.0], [u1, v0]),
                    Vertex::new([x + w, y + h, 0.0], [u1, v1]),
                ]);
                indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
                pen_x += glyph.advance;
            }
        }

        Mesh::new(vertices, indices, PrimitiveType::Triangles)
    }
}
