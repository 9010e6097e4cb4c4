//! Materials: a shader plus staged textures and uniforms

use std::collections::BTreeMap;

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::resources::{Shader, ShaderId, TextureId};

/// Value that can be sent to a shader uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Integer (also sampler units)
    Int(i32),
    /// Scalar
    Float(f32),
    /// 2-component vector
    Vec2(Vec2),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector or colour
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

/// Named uniforms and sampler bindings
///
/// Ordered by name so texture units are assigned deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformSet {
    values: BTreeMap<String, UniformValue>,
    textures: BTreeMap<String, TextureId>,
}

impl UniformSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a uniform value
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Bind a texture to a sampler uniform
    pub fn set_texture(&mut self, sampler: &str, texture: TextureId) {
        self.textures.insert(sampler.to_string(), texture);
    }

    /// Staged value for `name`
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    /// Texture bound to `sampler`
    pub fn texture(&self, sampler: &str) -> Option<TextureId> {
        self.textures.get(sampler).copied()
    }

    /// Staged values in name order
    pub fn values(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sampler bindings in name order
    pub fn textures(&self) -> impl Iterator<Item = (&str, TextureId)> {
        self.textures.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Whether any sampler is bound
    pub fn has_textures(&self) -> bool {
        !self.textures.is_empty()
    }

    /// Whether `texture` is bound to any sampler
    pub fn uses_texture(&self, texture: TextureId) -> bool {
        self.textures.values().any(|t| *t == texture)
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.values.clear();
        self.textures.clear();
    }

    /// `self` with every entry of `overrides` layered on top
    pub fn merged_with(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        merged.values.extend(overrides.values.iter().map(|(k, v)| (k.clone(), *v)));
        merged.textures.extend(overrides.textures.iter().map(|(k, v)| (k.clone(), *v)));
        merged
    }
}

/// Shader plus the textures and uniforms it is drawn with
#[derive(Debug, Clone)]
pub struct Material {
    shader: ShaderId,
    shader_supports_instancing: bool,
    instancing_enabled: bool,
    uniforms: UniformSet,
}

impl Material {
    /// Material drawing with `shader`
    pub fn new(shader_id: ShaderId, shader: &Shader) -> Self {
        Self {
            shader: shader_id,
            shader_supports_instancing: shader.supports_instancing(),
            instancing_enabled: false,
            uniforms: UniformSet::new(),
        }
    }

    /// Shader handle
    pub fn shader(&self) -> ShaderId {
        self.shader
    }

    /// Whether the material draws with `shader`
    pub fn has_shader(&self, shader: ShaderId) -> bool {
        self.shader == shader
    }

    /// Bind a texture to a sampler uniform
    pub fn set_texture(&mut self, sampler: &str, texture: TextureId) {
        self.uniforms.set_texture(sampler, texture);
    }

    /// Stage a uniform value
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.uniforms.set(name, value);
    }

    /// Staged uniforms and textures
    pub fn uniforms(&self) -> &UniformSet {
        &self.uniforms
    }

    /// Whether any sampler is bound
    pub fn has_texture(&self) -> bool {
        self.uniforms.has_textures()
    }

    /// Whether `texture` is bound to any sampler
    pub fn uses_texture(&self, texture: TextureId) -> bool {
        self.uniforms.uses_texture(texture)
    }

    /// Turn instanced drawing on or off.
    ///
    /// Refused with a warning when the shader has no per-instance model
    /// attribute. Returns whether instancing is now enabled.
    pub fn enable_instancing(&mut self, enable: bool) -> bool {
        if enable && !self.shader_supports_instancing {
            log::warn!("Enable instancing skipped: shader does not declare 'i_Model'");
            return false;
        }
        self.instancing_enabled = enable;
        self.instancing_enabled
    }

    /// Whether instancing was requested
    pub fn is_instancing_enabled(&self) -> bool {
        self.instancing_enabled
    }

    /// Whether batches with this material take the instanced path
    pub fn is_instancing_supported(&self) -> bool {
        self.instancing_enabled && self.shader_supports_instancing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids() -> (ShaderId, TextureId, TextureId) {
        let mut shaders: SlotMap<ShaderId, ()> = SlotMap::with_key();
        let mut textures: SlotMap<TextureId, ()> = SlotMap::with_key();
        (shaders.insert(()), textures.insert(()), textures.insert(()))
    }

    #[test]
    fn test_instancing_requires_shader_support() {
        let (shader_id, _, _) = ids();
        let plain = Shader::from_sources("uniform mat4 u_Model;", "");
        let instanced = Shader::from_sources("in mat4 i_Model;", "");

        let mut material = Material::new(shader_id, &plain);
        assert!(!material.enable_instancing(true));
        assert!(!material.is_instancing_supported());

        let mut material = Material::new(shader_id, &instanced);
        assert!(!material.is_instancing_supported());
        assert!(material.enable_instancing(true));
        assert!(material.is_instancing_supported());
        assert!(!material.enable_instancing(false));
        assert!(!material.is_instancing_supported());
    }

    #[test]
    fn test_overrides_win_when_merged() {
        let (_, tex_a, tex_b) = ids();
        let mut base = UniformSet::new();
        base.set("u_Color", Vec4::new(1.0, 1.0, 1.0, 1.0));
        base.set_texture("u_Texture", tex_a);

        let mut overrides = UniformSet::new();
        overrides.set("u_Color", Vec4::new(1.0, 0.0, 0.0, 1.0));
        overrides.set_texture("u_Texture", tex_b);
        overrides.set("u_Time", 2.0);

        let merged = base.merged_with(&overrides);
        assert_eq!(merged.texture("u_Texture"), Some(tex_b));
        assert_eq!(merged.get("u_Color"), Some(&UniformValue::Vec4(Vec4::new(1.0, 0.0, 0.0, 1.0))));
        assert_eq!(merged.get("u_Time"), Some(&UniformValue::Float(2.0)));
        // The base set is untouched.
        assert_eq!(base.texture("u_Texture"), Some(tex_a));
    }
}
