//! Shader programs as stage sources
//!
//! Compilation is the backend's job; the engine only keeps the sources and
//! inspects them for the per-instance model attribute.

use std::path::Path;

use crate::render::{RenderError, RenderResult};

/// Vertex attribute that marks a shader as instancing-capable
pub const INSTANCE_MODEL_ATTRIBUTE: &str = "i_Model";

/// Pipeline stage of a shader source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
    /// Geometry stage
    Geometry,
    /// Tessellation control stage
    TessControl,
    /// Tessellation evaluation stage
    TessEval,
    /// Compute stage
    Compute,
}

/// Shader program built from per-stage sources
#[derive(Debug, Clone, Default)]
pub struct Shader {
    stages: Vec<(ShaderStage, String)>,
}

impl Shader {
    /// Empty program with no stages attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Program from a vertex and a fragment source
    pub fn from_sources(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        let mut shader = Self::new();
        shader.attach_source(ShaderStage::Vertex, vertex);
        shader.attach_source(ShaderStage::Fragment, fragment);
        shader
    }

    /// Program from `(stage, path)` pairs read from disk
    pub fn from_files<P: AsRef<Path>>(sources: &[(ShaderStage, P)]) -> RenderResult<Self> {
        let mut shader = Self::new();
        for (stage, path) in sources {
            shader.attach_file(*stage, path)?;
        }
        Ok(shader)
    }

    /// Attach (or replace) the source for `stage`
    pub fn attach_source(&mut self, stage: ShaderStage, source: impl Into<String>) {
        let source = source.into();
        if let Some(entry) = self.stages.iter_mut().find(|(s, _)| *s == stage) {
            entry.1 = source;
        } else {
            self.stages.push((stage, source));
        }
    }

    /// Read `path` and attach it as `stage`
    pub fn attach_file(&mut self, stage: ShaderStage, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            RenderError::ResourceCreationFailed(format!("failed to read shader {}: {e}", path.display()))
        })?;
        self.attach_source(stage, source);
        Ok(())
    }

    /// Source of `stage`, if attached
    pub fn source(&self, stage: ShaderStage) -> Option<&str> {
        self.stages
            .iter()
            .find_map(|(s, src)| (*s == stage).then_some(src.as_str()))
    }

    /// All attached stages
    pub fn stages(&self) -> &[(ShaderStage, String)] {
        &self.stages
    }

    /// Whether the vertex stage declares the per-instance model attribute
    pub fn supports_instancing(&self) -> bool {
        self.source(ShaderStage::Vertex)
            .is_some_and(|src| src.contains(INSTANCE_MODEL_ATTRIBUTE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instancing_detected_from_vertex_stage() {
        let plain = Shader::from_sources("uniform mat4 u_Model;", "void main() {}");
        assert!(!plain.supports_instancing());

        let instanced = Shader::from_sources("layout(location = 2) in mat4 i_Model;", "void main() {}");
        assert!(instanced.supports_instancing());

        let mut fragment_only = Shader::new();
        fragment_only.attach_source(ShaderStage::Fragment, "i_Model");
        assert!(!fragment_only.supports_instancing());
    }

    #[test]
    fn test_attach_replaces_existing_stage() {
        let mut shader = Shader::from_sources("a", "b");
        shader.attach_source(ShaderStage::Vertex, "c");
        assert_eq!(shader.stages().len(), 2);
        assert_eq!(shader.source(ShaderStage::Vertex), Some("c"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Shader::from_files(&[(ShaderStage::Vertex, "does/not/exist.vert")]);
        assert!(matches!(result, Err(RenderError::ResourceCreationFailed(_))));
    }
}
