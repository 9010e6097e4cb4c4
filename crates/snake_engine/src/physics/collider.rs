//! 2D collider shapes and narrow-phase tests
//!
//! Colliders are stored on their owning object and carry a world-space
//! centre that is synced from the owner's transform before every collision
//! pass. Shape pairs are resolved by matching on both discriminants, so
//! every concrete pair has exactly one test.

use crate::foundation::math::{utils, Vec2};

/// Number of segments used for circle debug outlines
pub const CIRCLE_DEBUG_SEGMENTS: usize = 20;

/// Collider shape with its base (unscaled) and effective sizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Circle
    Circle {
        /// Radius as authored
        base_radius: f32,
        /// Radius after transform scale is applied
        radius: f32,
    },
    /// Axis-aligned box, stored as half extents
    Aabb {
        /// Half extents as authored
        base_half_size: Vec2,
        /// Half extents after transform scale is applied
        half_size: Vec2,
    },
}

/// Shape discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderType {
    /// Circle collider
    Circle,
    /// Axis-aligned box collider
    Aabb,
}

/// Collision volume owned by an object
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    shape: ColliderShape,
    world_position: Vec2,
    use_transform_scale: bool,
}

impl Collider {
    /// Circle collider with the given radius
    pub fn circle(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Circle { base_radius: radius, radius },
            world_position: Vec2::zeros(),
            use_transform_scale: true,
        }
    }

    /// Box collider with the given half extents
    pub fn aabb(half_size: Vec2) -> Self {
        Self {
            shape: ColliderShape::Aabb { base_half_size: half_size, half_size },
            world_position: Vec2::zeros(),
            use_transform_scale: true,
        }
    }

    /// Box collider from full width and height
    pub fn aabb_from_size(size: Vec2) -> Self {
        Self::aabb(size * 0.5)
    }

    /// Shape discriminator
    pub fn collider_type(&self) -> ColliderType {
        match self.shape {
            ColliderShape::Circle { .. } => ColliderType::Circle,
            ColliderShape::Aabb { .. } => ColliderType::Aabb,
        }
    }

    /// Shape with base and effective sizes
    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// Couple (or decouple) the effective size to the owner's scale.
    /// Decoupling restores the base size.
    pub fn set_use_transform_scale(&mut self, use_scale: bool) {
        self.use_transform_scale = use_scale;
        if !use_scale {
            match &mut self.shape {
                ColliderShape::Circle { base_radius, radius } => *radius = *base_radius,
                ColliderShape::Aabb { base_half_size, half_size } => *half_size = *base_half_size,
            }
        }
    }

    /// Whether the owner's scale drives the effective size
    pub fn uses_transform_scale(&self) -> bool {
        self.use_transform_scale
    }

    /// Set the circle radius. Ignored for boxes.
    pub fn set_radius(&mut self, new_radius: f32) {
        let coupled = self.use_transform_scale;
        if let ColliderShape::Circle { base_radius, radius } = &mut self.shape {
            *base_radius = new_radius;
            if !coupled {
                *radius = new_radius;
            }
        } else {
            log::warn!("set_radius called on a box collider");
        }
    }

    /// Set the box half extents. Ignored for circles.
    pub fn set_half_size(&mut self, new_half_size: Vec2) {
        let coupled = self.use_transform_scale;
        if let ColliderShape::Aabb { base_half_size, half_size } = &mut self.shape {
            *base_half_size = new_half_size;
            if !coupled {
                *half_size = new_half_size;
            }
        } else {
            log::warn!("set_half_size called on a circle collider");
        }
    }

    /// Recompute the effective size from the owner's scale
    pub fn sync_with_transform_scale(&mut self, scale: Vec2) {
        if !self.use_transform_scale {
            return;
        }
        match &mut self.shape {
            ColliderShape::Circle { base_radius, radius } => {
                *radius = *base_radius * scale.x.abs().max(scale.y.abs());
            }
            ColliderShape::Aabb { base_half_size, half_size } => {
                *half_size = base_half_size.component_mul(&utils::abs_2d(scale));
            }
        }
    }

    /// Set the world-space centre
    pub fn set_world_position(&mut self, position: Vec2) {
        self.world_position = position;
    }

    /// World-space centre
    pub fn world_position(&self) -> Vec2 {
        self.world_position
    }

    /// Radius of a circle enclosing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self.shape {
            ColliderShape::Circle { radius, .. } => radius,
            ColliderShape::Aabb { half_size, .. } => half_size.norm(),
        }
    }

    /// Whether `point` lies inside the shape (boundary inclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self.shape {
            ColliderShape::Circle { radius, .. } => {
                (self.world_position - point).norm_squared() <= radius * radius
            }
            ColliderShape::Aabb { half_size, .. } => {
                let min = self.world_position - half_size;
                let max = self.world_position + half_size;
                point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
            }
        }
    }

    /// Narrow-phase overlap test. Touching shapes count as colliding.
    pub fn check_collision(&self, other: &Self) -> bool {
        match (self.shape, other.shape) {
            (ColliderShape::Circle { radius: ra, .. }, ColliderShape::Circle { radius: rb, .. }) => {
                circle_vs_circle(self.world_position, ra, other.world_position, rb)
            }
            (ColliderShape::Circle { radius, .. }, ColliderShape::Aabb { half_size, .. }) => {
                aabb_vs_circle(other.world_position, half_size, self.world_position, radius)
            }
            (ColliderShape::Aabb { half_size, .. }, ColliderShape::Circle { radius, .. }) => {
                aabb_vs_circle(self.world_position, half_size, other.world_position, radius)
            }
            (ColliderShape::Aabb { half_size: ha, .. }, ColliderShape::Aabb { half_size: hb, .. }) => {
                aabb_vs_aabb(self.world_position, ha, other.world_position, hb)
            }
        }
    }

    /// Outline as line segments for the debug overlay
    pub fn debug_outline(&self) -> Vec<(Vec2, Vec2)> {
        let center = self.world_position;
        match self.shape {
            ColliderShape::Circle { radius, .. } => {
                let step = std::f32::consts::TAU / CIRCLE_DEBUG_SEGMENTS as f32;
                (0..CIRCLE_DEBUG_SEGMENTS)
                    .map(|i| {
                        let a = i as f32 * step;
                        let b = (i + 1) as f32 * step;
                        (
                            center + Vec2::new(a.cos(), a.sin()) * radius,
                            center + Vec2::new(b.cos(), b.sin()) * radius,
                        )
                    })
                    .collect()
            }
            ColliderShape::Aabb { half_size, .. } => {
                let min = center - half_size;
                let max = center + half_size;
                vec![
                    (Vec2::new(min.x, min.y), Vec2::new(max.x, min.y)),
                    (Vec2::new(max.x, min.y), Vec2::new(max.x, max.y)),
                    (Vec2::new(max.x, max.y), Vec2::new(min.x, max.y)),
                    (Vec2::new(min.x, max.y), Vec2::new(min.x, min.y)),
                ]
            }
        }
    }
}

fn circle_vs_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let sum = ra + rb;
    (a - b).norm_squared() <= sum * sum
}

fn aabb_vs_circle(box_center: Vec2, half: Vec2, circle_center: Vec2, radius: f32) -> bool {
    let closest = utils::clamp_2d(circle_center, box_center - half, box_center + half);
    (circle_center - closest).norm_squared() <= radius * radius
}

fn aabb_vs_aabb(a: Vec2, ha: Vec2, b: Vec2, hb: Vec2) -> bool {
    (a.x - b.x).abs() <= ha.x + hb.x && (a.y - b.y).abs() <= ha.y + hb.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at(mut collider: Collider, x: f32, y: f32) -> Collider {
        collider.set_world_position(Vec2::new(x, y));
        collider
    }

    #[test]
    fn test_circle_circle_overlap_and_separation() {
        let a = at(Collider::circle(10.0), 0.0, 0.0);
        assert!(a.check_collision(&at(Collider::circle(10.0), 15.0, 0.0)));
        assert!(!a.check_collision(&at(Collider::circle(10.0), 25.0, 0.0)));
    }

    #[test]
    fn test_touching_circles_collide() {
        let a = at(Collider::circle(10.0), 0.0, 0.0);
        let b = at(Collider::circle(10.0), 20.0, 0.0);
        assert!(a.check_collision(&b));
    }

    #[test]
    fn test_aabb_circle_uses_clamped_point() {
        let aabb = at(Collider::aabb(Vec2::new(5.0, 5.0)), 0.0, 0.0);
        let far = at(Collider::circle(1.0), 10.0, 10.0);
        let side = at(Collider::circle(1.0), 6.0, 5.0);
        let diagonal = at(Collider::circle(1.0), 5.5, 5.5);
        // Nearest point (5, 5) is sqrt(2) away, beyond the radius.
        let corner = at(Collider::circle(1.0), 6.0, 6.0);

        assert!(!aabb.check_collision(&far));
        assert!(!far.check_collision(&aabb));
        assert!(aabb.check_collision(&side));
        assert!(side.check_collision(&aabb));
        assert!(aabb.check_collision(&diagonal));
        assert!(diagonal.check_collision(&aabb));
        assert!(!aabb.check_collision(&corner));
        assert!(!corner.check_collision(&aabb));
    }

    #[test]
    fn test_aabb_aabb_interval_overlap() {
        let a = at(Collider::aabb(Vec2::new(5.0, 5.0)), 0.0, 0.0);
        assert!(a.check_collision(&at(Collider::aabb(Vec2::new(5.0, 5.0)), 10.0, 0.0)));
        assert!(!a.check_collision(&at(Collider::aabb(Vec2::new(5.0, 5.0)), 10.1, 0.0)));
        assert!(!a.check_collision(&at(Collider::aabb(Vec2::new(5.0, 5.0)), 0.0, 10.5)));
    }

    #[test]
    fn test_zero_size_behaves_as_point() {
        let point = at(Collider::circle(0.0), 3.0, 3.0);
        let aabb = at(Collider::aabb(Vec2::new(5.0, 5.0)), 0.0, 0.0);
        assert!(aabb.check_collision(&point));
        assert_relative_eq!(point.bounding_radius(), 0.0);
    }

    #[test]
    fn test_sync_with_transform_scale() {
        let mut circle = Collider::circle(2.0);
        circle.sync_with_transform_scale(Vec2::new(-3.0, 1.5));
        assert_relative_eq!(circle.bounding_radius(), 6.0);

        let mut aabb = Collider::aabb(Vec2::new(1.0, 2.0));
        aabb.sync_with_transform_scale(Vec2::new(2.0, -0.5));
        match aabb.shape() {
            ColliderShape::Aabb { half_size, .. } => {
                assert_relative_eq!(half_size.x, 2.0);
                assert_relative_eq!(half_size.y, 1.0);
            }
            ColliderShape::Circle { .. } => panic!("expected box"),
        }

        aabb.set_use_transform_scale(false);
        aabb.sync_with_transform_scale(Vec2::new(10.0, 10.0));
        assert_relative_eq!(aabb.bounding_radius(), Vec2::new(1.0, 2.0).norm());
    }

    #[test]
    fn test_contains_point() {
        let circle = at(Collider::circle(1.0), 0.0, 0.0);
        assert!(circle.contains_point(Vec2::new(1.0, 0.0)));
        assert!(!circle.contains_point(Vec2::new(1.0, 1.0)));

        let aabb = at(Collider::aabb_from_size(Vec2::new(4.0, 2.0)), 0.0, 0.0);
        assert!(aabb.contains_point(Vec2::new(2.0, -1.0)));
        assert!(!aabb.contains_point(Vec2::new(2.1, 0.0)));
    }

    #[test]
    fn test_debug_outline_segment_counts() {
        let circle = at(Collider::circle(5.0), 1.0, 1.0);
        let outline = circle.debug_outline();
        assert_eq!(outline.len(), CIRCLE_DEBUG_SEGMENTS);
        assert_relative_eq!(outline[0].0.x, 6.0, epsilon = 1e-5);
        assert_relative_eq!(outline.last().unwrap().1.x, 6.0, epsilon = 1e-4);

        let aabb = Collider::aabb(Vec2::new(1.0, 1.0));
        assert_eq!(aabb.debug_outline().len(), 4);
    }
}
