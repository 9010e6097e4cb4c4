//! Backend abstraction trait for the rendering system
//!
//! This module defines the trait that graphics backends implement so the
//! [`RenderManager`](crate::render::RenderManager) can batch and submit
//! work without knowing the API underneath. Resource uploads may fail;
//! per-draw state changes are fire-and-forget.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Vec2, Vec4};
use crate::render::resources::{Mesh, MeshId, Shader, ShaderId, Texture, TextureId, UniformValue};
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Per-instance attributes for instanced draws
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Column-major model matrix
    pub model: [[f32; 4]; 4],
    /// RGBA tint
    pub color: [f32; 4],
    /// Sprite frame UV offset
    pub uv_offset: [f32; 2],
    /// Sprite frame UV scale
    pub uv_scale: [f32; 2],
}

impl InstanceData {
    /// Pack instance attributes
    pub fn new(model: &Mat4, color: Vec4, uv_offset: Vec2, uv_scale: Vec2) -> Self {
        Self {
            model: (*model).into(),
            color: color.into(),
            uv_offset: uv_offset.into(),
            uv_scale: uv_scale.into(),
        }
    }
}

/// Debug line vertex, interleaved `[x, y, r, g, b, a]`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    /// Position
    pub position: [f32; 2],
    /// RGBA colour
    pub color: [f32; 4],
}

/// Pixel rectangle in window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Rect {
    /// Create a rectangle
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Main rendering backend trait
pub trait RenderBackend {
    /// Compile and link a shader program
    fn compile_shader(&mut self, id: ShaderId, shader: &Shader) -> BackendResult<()>;

    /// Release a shader program
    fn release_shader(&mut self, id: ShaderId);

    /// Upload texture pixels and sampler state
    fn upload_texture(&mut self, id: TextureId, texture: &Texture) -> BackendResult<()>;

    /// Release a texture
    fn release_texture(&mut self, id: TextureId);

    /// Upload mesh geometry
    fn upload_mesh(&mut self, id: MeshId, mesh: &Mesh) -> BackendResult<()>;

    /// Release mesh geometry and its instance buffer
    fn release_mesh(&mut self, id: MeshId);

    /// Make `shader` the active program
    fn use_shader(&mut self, shader: ShaderId);

    /// Deactivate the current program
    fn unuse_shader(&mut self);

    /// Bind a texture to a sampler unit
    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    /// Unbind whatever is bound to `unit`
    fn unbind_texture(&mut self, unit: u32);

    /// Set a uniform on `shader`
    fn set_uniform(&mut self, shader: ShaderId, name: &str, value: UniformValue);

    /// Replace the instance buffer attached to `mesh`
    fn upload_instances(&mut self, mesh: MeshId, instances: &[InstanceData]) -> BackendResult<()>;

    /// Draw `mesh` once
    fn draw_mesh(&mut self, mesh: MeshId) -> BackendResult<()>;

    /// Draw `mesh` `instance_count` times using its instance buffer
    fn draw_mesh_instanced(&mut self, mesh: MeshId, instance_count: u32) -> BackendResult<()>;

    /// Draw line segments, two vertices per segment
    fn draw_lines(&mut self, vertices: &[LineVertex]) -> BackendResult<()>;

    /// Rasterised line width for subsequent line draws
    fn set_line_width(&mut self, width: f32);

    /// Set the viewport rectangle
    fn set_viewport(&mut self, rect: Rect);

    /// Clear only `rect` to `color`
    fn clear_rect(&mut self, rect: Rect, color: Vec4);

    /// Downcast to the concrete backend type
    fn as_any(&self) -> &dyn std::any::Any;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_instance_data_is_column_major() {
        let model = Mat4::new_translation(&crate::foundation::math::Vec3::new(3.0, 4.0, 0.0));
        let data = InstanceData::new(&model, Vec4::new(1.0, 0.5, 0.25, 1.0), Vec2::zeros(), Vec2::new(1.0, 1.0));
        assert_relative_eq!(data.model[3][0], 3.0);
        assert_relative_eq!(data.model[3][1], 4.0);
        assert_eq!(std::mem::size_of::<InstanceData>(), 96);
        assert_eq!(bytemuck::bytes_of(&data).len(), 96);
    }
}
