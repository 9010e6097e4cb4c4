//! Mesh geometry
//!
//! Vertices are `[x, y, z]` + `[u, v]`. The local half extents are cached
//! at construction and feed bounding-radius computation for culling.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Vec2;

/// Interleaved mesh vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Texture coordinate
    pub uv: [f32; 2],
}

impl Vertex {
    /// Create a vertex
    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

/// How the vertex stream is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    /// Independent triangles
    #[default]
    Triangles,
    /// Independent line segments
    Lines,
    /// Points
    Points,
    /// Fan around the first vertex
    TriangleFan,
    /// Strip of triangles
    TriangleStrip,
    /// Connected line strip
    LineStrip,
}

/// Geometry plus cached local bounds
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    primitive: PrimitiveType,
    local_half_extents: Vec2,
}

impl Mesh {
    /// Build a mesh. An empty index list means non-indexed drawing.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, primitive: PrimitiveType) -> Self {
        let local_half_extents = compute_local_half_extents(&vertices);
        Self { vertices, indices, primitive, local_half_extents }
    }

    /// Unit quad centred on the origin, vertices at +-0.5
    pub fn unit_quad() -> Self {
        Self::new(
            vec![
                Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0]),
                Vertex::new([0.5, -0.5, 0.0], [1.0, 0.0]),
                Vertex::new([0.5, 0.5, 0.0], [1.0, 1.0]),
                Vertex::new([-0.5, 0.5, 0.0], [0.0, 1.0]),
            ],
            vec![0, 1, 2, 2, 3, 0],
            PrimitiveType::Triangles,
        )
    }

    /// Vertex data
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Index data
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Whether draws use the index buffer
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Number of elements one draw consumes
    pub fn element_count(&self) -> usize {
        if self.is_indexed() {
            self.indices.len()
        } else {
            self.vertices.len()
        }
    }

    /// Primitive assembly mode
    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }

    /// Half of the XY bounding box of the vertices
    pub fn local_half_extents(&self) -> Vec2 {
        self.local_half_extents
    }
}

fn compute_local_half_extents(vertices: &[Vertex]) -> Vec2 {
    match vertices {
        [] => Vec2::new(0.5, 0.5),
        [_] => Vec2::new(0.0001, 0.0001),
        [first, rest @ ..] => {
            let start = Vec2::new(first.position[0], first.position[1]);
            let (min, max) = rest.iter().fold((start, start), |(min, max), v| {
                let p = Vec2::new(v.position[0], v.position[1]);
                (min.inf(&p), max.sup(&p))
            });
            (max - min) * 0.5
        }
    }
}
