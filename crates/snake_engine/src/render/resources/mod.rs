//! Render resources
//!
//! CPU-side descriptions of shaders, textures, meshes, materials, sprite
//! sheets and fonts. The [`RenderManager`](crate::render::RenderManager)
//! owns them and hands out the typed handles declared here.

pub mod font;
pub mod material;
pub mod mesh;
pub mod shader;
pub mod sprite;
pub mod texture;

pub use font::{BitmapFont, Font, Glyph, TextAlignH, TextAlignV, MAX_FONT_PIXEL_SIZE, MIN_FONT_PIXEL_SIZE};
pub use material::{Material, UniformSet, UniformValue};
pub use mesh::{Mesh, PrimitiveType, Vertex};
pub use shader::{Shader, ShaderStage, INSTANCE_MODEL_ATTRIBUTE};
pub use sprite::{SpriteAnimator, SpriteClip, SpriteSheet};
pub use texture::{Texture, TextureMagFilter, TextureMinFilter, TextureSettings, TextureWrap};

slotmap::new_key_type! {
    /// Handle to a registered shader
    pub struct ShaderId;
    /// Handle to a registered texture
    pub struct TextureId;
    /// Handle to a registered mesh
    pub struct MeshId;
    /// Handle to a registered material
    pub struct MaterialId;
    /// Handle to a registered font
    pub struct FontId;
    /// Handle to a registered sprite sheet
    pub struct SpriteSheetId;
}
