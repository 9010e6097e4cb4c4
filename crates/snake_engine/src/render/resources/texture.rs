//! CPU-side texture data and sampler settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::render::{RenderError, RenderResult};

/// Minification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureMinFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
    /// Nearest texel, nearest mip
    NearestMipmapNearest,
    /// Bilinear, nearest mip
    LinearMipmapNearest,
    /// Nearest texel, blended mips
    NearestMipmapLinear,
    /// Trilinear
    LinearMipmapLinear,
}

/// Magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureMagFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
}

/// Coordinate wrapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureWrap {
    /// Clamp to the edge texel
    ClampToEdge,
    /// Clamp to the border colour
    ClampToBorder,
    /// Tile
    Repeat,
    /// Tile, mirroring every other repetition
    MirroredRepeat,
}

/// Sampler settings applied when the texture is uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSettings {
    /// Minification filter
    pub min_filter: TextureMinFilter,
    /// Magnification filter
    pub mag_filter: TextureMagFilter,
    /// Horizontal wrap
    pub wrap_s: TextureWrap,
    /// Vertical wrap
    pub wrap_t: TextureWrap,
    /// Generate a mip chain on upload
    pub generate_mipmap: bool,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            min_filter: TextureMinFilter::Linear,
            mag_filter: TextureMagFilter::Linear,
            wrap_s: TextureWrap::ClampToEdge,
            wrap_t: TextureWrap::ClampToEdge,
            generate_mipmap: true,
        }
    }
}

impl TextureSettings {
    /// Nearest filtering without mipmaps, for pixel art
    pub fn pixelated(wrap: TextureWrap) -> Self {
        Self {
            min_filter: TextureMinFilter::Nearest,
            mag_filter: TextureMagFilter::Nearest,
            wrap_s: wrap,
            wrap_t: wrap,
            generate_mipmap: false,
        }
    }
}

/// Pixel data plus the settings to upload it with
#[derive(Debug, Clone)]
pub struct Texture {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    settings: TextureSettings,
}

impl Texture {
    /// Texture from raw pixel data. `channels` is 1 (grey), 3 (RGB) or 4 (RGBA).
    pub fn from_pixels(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        settings: TextureSettings,
    ) -> RenderResult<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(RenderError::ResourceCreationFailed(format!(
                "unsupported channel count {channels}"
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if pixels.len() != expected {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture data is {} bytes, expected {expected} for {width}x{height}x{channels}",
                pixels.len()
            )));
        }
        Ok(Self { pixels, width, height, channels, settings })
    }

    /// Load an image file and convert it to RGBA
    pub fn from_file(path: impl AsRef<Path>, settings: TextureSettings) -> RenderResult<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| {
                RenderError::ResourceCreationFailed(format!("failed to load texture {}: {e}", path.display()))
            })?
            .flipv()
            .to_rgba8();
        let (width, height) = image.dimensions();
        log::debug!("Loaded texture {} ({width}x{height})", path.display());
        Self::from_pixels(image.into_raw(), width, height, 4, settings)
    }

    /// Yellow/black checkerboard used when a material has no texture
    pub fn checkerboard(size: u32) -> Self {
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                if (x + y) % 2 == 0 {
                    pixels.extend_from_slice(&[255, 255, 0, 255]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 0, 255]);
                }
            }
        }
        Self {
            pixels,
            width: size,
            height: size,
            channels: 4,
            settings: TextureSettings::pixelated(TextureWrap::MirroredRepeat),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Raw pixel rows, bottom row first for images loaded from disk
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Sampler settings
    pub fn settings(&self) -> &TextureSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_pattern() {
        let texture = Texture::checkerboard(8);
        assert_eq!(texture.pixels().len(), 8 * 8 * 4);
        assert_eq!(&texture.pixels()[0..4], &[255, 255, 0, 255]);
        assert_eq!(&texture.pixels()[4..8], &[0, 0, 0, 255]);
        // Second row starts black.
        assert_eq!(&texture.pixels()[32..36], &[0, 0, 0, 255]);
        assert_eq!(texture.settings().mag_filter, TextureMagFilter::Nearest);
        assert_eq!(texture.settings().wrap_s, TextureWrap::MirroredRepeat);
    }

    #[test]
    fn test_pixel_size_mismatch_rejected() {
        let result = Texture::from_pixels(vec![0; 10], 2, 2, 4, TextureSettings::default());
        assert!(result.is_err());
        let grey = Texture::from_pixels(vec![0; 4], 2, 2, 1, TextureSettings::default()).unwrap();
        assert_eq!(grey.channels(), 1);
    }
}
