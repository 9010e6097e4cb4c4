//! Headless backend that records every call
//!
//! Used for headless runs and for asserting draw order, batching and
//! uniform values in tests. Nothing touches a GPU.

use std::collections::{HashMap, HashSet};

use crate::foundation::math::Vec4;
use crate::render::backend::{BackendResult, InstanceData, LineVertex, Rect, RenderBackend};
use crate::render::resources::{Mesh, MeshId, Shader, ShaderId, Texture, TextureId, UniformValue};
use crate::render::RenderError;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// `use_shader`
    UseShader(ShaderId),
    /// `unuse_shader`
    UnuseShader,
    /// `bind_texture`
    BindTexture {
        /// Sampler unit
        unit: u32,
        /// Bound texture
        texture: TextureId,
    },
    /// `unbind_texture`
    UnbindTexture(u32),
    /// `set_uniform`
    SetUniform {
        /// Target program
        shader: ShaderId,
        /// Uniform name
        name: String,
        /// Value sent
        value: UniformValue,
    },
    /// `upload_instances`
    UploadInstances {
        /// Target mesh
        mesh: MeshId,
        /// Instance attributes
        instances: Vec<InstanceData>,
    },
    /// `draw_mesh`
    Draw(MeshId),
    /// `draw_mesh_instanced`
    DrawInstanced {
        /// Drawn mesh
        mesh: MeshId,
        /// Instance count
        count: u32,
    },
    /// `draw_lines`
    DrawLines(Vec<LineVertex>),
    /// `set_line_width`
    LineWidth(f32),
    /// `set_viewport`
    Viewport(Rect),
    /// `clear_rect`
    ClearRect {
        /// Cleared area
        rect: Rect,
        /// Clear colour
        color: Vec4,
    },
}

/// Backend that records calls instead of executing them
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<DrawCommand>,
    shaders: HashSet<ShaderId>,
    textures: HashSet<TextureId>,
    meshes: HashMap<MeshId, usize>,
}

impl RecordingBackend {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded since the last [`clear_commands`](Self::clear_commands)
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget recorded commands, keeping uploaded resources
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Meshes drawn, in order, one entry per draw call of either kind
    pub fn drawn_meshes(&self) -> Vec<MeshId> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Draw(mesh) | DrawCommand::DrawInstanced { mesh, .. } => Some(*mesh),
                _ => None,
            })
            .collect()
    }

    /// Number of non-instanced draws
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Draw(_))).count()
    }

    /// Number of instanced draws
    pub fn instanced_draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawInstanced { .. }))
            .count()
    }

    /// Last value sent to uniform `name`
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.commands.iter().rev().find_map(|cmd| match cmd {
            DrawCommand::SetUniform { name: n, value, .. } if n == name => Some(*value),
            _ => None,
        })
    }

    /// Whether `shader` is currently compiled
    pub fn has_shader(&self, shader: ShaderId) -> bool {
        self.shaders.contains(&shader)
    }

    /// Whether `texture` is currently uploaded
    pub fn has_texture(&self, texture: TextureId) -> bool {
        self.textures.contains(&texture)
    }

    /// Whether `mesh` is currently uploaded
    pub fn has_mesh(&self, mesh: MeshId) -> bool {
        self.meshes.contains_key(&mesh)
    }

    /// Number of live GPU-side meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    fn require_mesh(&self, mesh: MeshId) -> BackendResult<()> {
        if self.meshes.contains_key(&mesh) {
            Ok(())
        } else {
            Err(RenderError::BackendError(format!("mesh {mesh:?} was never uploaded")))
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn compile_shader(&mut self, id: ShaderId, shader: &Shader) -> BackendResult<()> {
        if shader.stages().is_empty() {
            return Err(RenderError::ResourceCreationFailed("shader has no stages".to_string()));
        }
        self.shaders.insert(id);
        Ok(())
    }

    fn release_shader(&mut self, id: ShaderId) {
        self.shaders.remove(&id);
    }

    fn upload_texture(&mut self, id: TextureId, _texture: &Texture) -> BackendResult<()> {
        self.textures.insert(id);
        Ok(())
    }

    fn release_texture(&mut self, id: TextureId) {
        self.textures.remove(&id);
    }

    fn upload_mesh(&mut self, id: MeshId, mesh: &Mesh) -> BackendResult<()> {
        self.meshes.insert(id, mesh.element_count());
        Ok(())
    }

    fn release_mesh(&mut self, id: MeshId) {
        self.meshes.remove(&id);
    }

    fn use_shader(&mut self, shader: ShaderId) {
        self.commands.push(DrawCommand::UseShader(shader));
    }

    fn unuse_shader(&mut self) {
        self.commands.push(DrawCommand::UnuseShader);
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.commands.push(DrawCommand::BindTexture { unit, texture });
    }

    fn unbind_texture(&mut self, unit: u32) {
        self.commands.push(DrawCommand::UnbindTexture(unit));
    }

    fn set_uniform(&mut self, shader: ShaderId, name: &str, value: UniformValue) {
        self.commands.push(DrawCommand::SetUniform {
            shader,
            name: name.to_string(),
            value,
        });
    }

    fn upload_instances(&mut self, mesh: MeshId, instances: &[InstanceData]) -> BackendResult<()> {
        self.require_mesh(mesh)?;
        self.commands.push(DrawCommand::UploadInstances {
            mesh,
            instances: instances.to_vec(),
        });
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: MeshId) -> BackendResult<()> {
        self.require_mesh(mesh)?;
        self.commands.push(DrawCommand::Draw(mesh));
        Ok(())
    }

    fn draw_mesh_instanced(&mut self, mesh: MeshId, instance_count: u32) -> BackendResult<()> {
        self.require_mesh(mesh)?;
        self.commands.push(DrawCommand::DrawInstanced { mesh, count: instance_count });
        Ok(())
    }

    fn draw_lines(&mut self, vertices: &[LineVertex]) -> BackendResult<()> {
        self.commands.push(DrawCommand::DrawLines(vertices.to_vec()));
        Ok(())
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Viewport(rect));
    }

    fn clear_rect(&mut self, rect: Rect, color: Vec4) {
        self.commands.push(DrawCommand::ClearRect { rect, color });
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_draw_requires_uploaded_mesh() {
        let mut meshes: SlotMap<MeshId, ()> = SlotMap::with_key();
        let id = meshes.insert(());
        let mut backend = RecordingBackend::new();

        assert!(backend.draw_mesh(id).is_err());
        backend.upload_mesh(id, &Mesh::unit_quad()).unwrap();
        backend.draw_mesh(id).unwrap();
        backend.draw_mesh_instanced(id, 3).unwrap();

        assert_eq!(backend.drawn_meshes(), vec![id, id]);
        assert_eq!(backend.draw_count(), 1);
        assert_eq!(backend.instanced_draw_count(), 1);

        backend.release_mesh(id);
        assert!(!backend.has_mesh(id));
    }
}
