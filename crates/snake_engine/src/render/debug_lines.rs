//! Immediate-mode debug lines, grouped per camera and line width

use crate::foundation::math::{Vec2, Vec4};
use crate::render::backend::LineVertex;
use crate::render::Camera2D;

/// Lines sharing one camera and width; drawn with a single call
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    /// Camera the lines are viewed through, `None` for screen space
    pub camera: Option<Camera2D>,
    /// Rasterised width
    pub width: f32,
    /// Two vertices per segment
    pub vertices: Vec<LineVertex>,
}

/// Per-frame queue of debug lines
#[derive(Debug, Default)]
pub struct DebugLineQueue {
    groups: Vec<LineGroup>,
}

impl DebugLineQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a segment. Groups are keyed by camera snapshot and width, in
    /// order of first use.
    pub fn push(&mut self, from: Vec2, to: Vec2, camera: Option<&Camera2D>, color: Vec4, width: f32) {
        let camera = camera.copied();
        let index = match self
            .groups
            .iter()
            .position(|g| g.camera == camera && g.width.to_bits() == width.to_bits())
        {
            Some(index) => index,
            None => {
                self.groups.push(LineGroup { camera, width, vertices: Vec::new() });
                self.groups.len() - 1
            }
        };

        let color: [f32; 4] = color.into();
        self.groups[index].vertices.extend([
            LineVertex { position: from.into(), color },
            LineVertex { position: to.into(), color },
        ]);
    }

    /// Queued groups
    pub fn groups(&self) -> &[LineGroup] {
        &self.groups
    }

    /// Total queued segments
    pub fn segment_count(&self) -> usize {
        self.groups.iter().map(|g| g.vertices.len() / 2).sum()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Hand over every group, leaving the queue empty
    pub fn drain(&mut self) -> std::vec::Drain<'_, LineGroup> {
        self.groups.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_camera_and_width() {
        let mut queue = DebugLineQueue::new();
        let camera = Camera2D::new(800, 600);
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);

        queue.push(Vec2::zeros(), Vec2::new(1.0, 0.0), Some(&camera), red, 1.0);
        queue.push(Vec2::zeros(), Vec2::new(0.0, 1.0), Some(&camera), red, 1.0);
        queue.push(Vec2::zeros(), Vec2::new(0.0, 1.0), Some(&camera), red, 2.0);
        queue.push(Vec2::zeros(), Vec2::new(0.0, 1.0), None, red, 1.0);

        assert_eq!(queue.groups().len(), 3);
        assert_eq!(queue.segment_count(), 4);
        assert_eq!(queue.groups()[0].vertices.len(), 4);
    }

    #[test]
    fn test_vertices_interleave_position_and_color() {
        let mut queue = DebugLineQueue::new();
        queue.push(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), None, Vec4::new(0.1, 0.2, 0.3, 0.4), 1.0);
        let floats: &[f32] = bytemuck::cast_slice(&queue.groups()[0].vertices);
        assert_eq!(floats, &[1.0, 2.0, 0.1, 0.2, 0.3, 0.4, 3.0, 4.0, 0.1, 0.2, 0.3, 0.4]);

        assert_eq!(queue.drain().count(), 1);
        assert!(queue.is_empty());
    }
}
