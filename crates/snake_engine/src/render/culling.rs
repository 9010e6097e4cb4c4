//! Camera-rectangle culling

use crate::foundation::math::Vec2;
use crate::render::Camera2D;
use crate::scene::{ObjectId, ObjectStore};

/// Filters objects against a camera's visible rectangle
pub struct FrustumCuller;

impl FrustumCuller {
    /// Collect the visible subset of `candidates` into `out_visible`.
    ///
    /// `out_visible` is cleared first. Dead, hidden and unknown objects are
    /// dropped. Screen-space objects are always kept. Everything else is
    /// kept when its bounding circle overlaps
    /// `camera.position ± viewport_size / (2 * zoom)`.
    pub fn cull_visible(
        camera: &Camera2D,
        objects: &ObjectStore,
        candidates: &[ObjectId],
        out_visible: &mut Vec<ObjectId>,
        viewport_size: Vec2,
    ) {
        out_visible.clear();
        for &id in candidates {
            let Some(object) = objects.get(id) else { continue };
            if !object.is_alive() || !object.is_visible() {
                continue;
            }
            if object.ignores_camera()
                || camera.is_in_view(object.transform().position(), object.bounding_radius(), viewport_size)
            {
                out_visible.push(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Object;

    fn at(objects: &mut ObjectStore, x: f32, y: f32) -> ObjectId {
        let mut object = Object::new();
        object.transform_mut().set_position(Vec2::new(x, y));
        objects.insert(object)
    }

    #[test]
    fn test_objects_outside_camera_rect_are_culled() {
        let mut objects = ObjectStore::with_key();
        let inside = at(&mut objects, 100.0, 100.0);
        let edge = at(&mut objects, 400.5, 0.0);
        let outside = at(&mut objects, 1000.0, 0.0);

        let camera = Camera2D::new(800, 600);
        let mut visible = vec![outside];
        FrustumCuller::cull_visible(&camera, &objects, &[inside, edge, outside], &mut visible, camera.screen_size());
        assert_eq!(visible, vec![inside, edge]);
    }

    #[test]
    fn test_circle_near_corner_is_culled_unless_it_touches() {
        let mut objects = ObjectStore::with_key();
        // Unit quad: bounding radius sqrt(0.5), about 0.707.
        let beyond_corner = at(&mut objects, 400.6, 300.6);
        let on_corner = at(&mut objects, 400.4, 300.4);
        let beside_edge = at(&mut objects, 400.6, 0.0);

        let camera = Camera2D::new(800, 600);
        let mut visible = Vec::new();
        FrustumCuller::cull_visible(
            &camera,
            &objects,
            &[beyond_corner, on_corner, beside_edge],
            &mut visible,
            camera.screen_size(),
        );
        assert_eq!(visible, vec![on_corner, beside_edge]);
    }

    #[test]
    fn test_dead_and_hidden_objects_are_dropped() {
        let mut objects = ObjectStore::with_key();
        let dead = at(&mut objects, 0.0, 0.0);
        let hidden = at(&mut objects, 0.0, 0.0);
        objects[dead].kill();
        objects[hidden].set_visible(false);

        let camera = Camera2D::new(800, 600);
        let mut visible = Vec::new();
        FrustumCuller::cull_visible(&camera, &objects, &[dead, hidden], &mut visible, camera.screen_size());
        assert!(visible.is_empty());
    }

    #[test]
    fn test_screen_space_objects_always_visible() {
        let mut objects = ObjectStore::with_key();
        let hud = at(&mut objects, 5000.0, 5000.0);
        objects[hud].set_ignore_camera(true, None);

        let camera = Camera2D::new(800, 600);
        let mut visible = Vec::new();
        FrustumCuller::cull_visible(&camera, &objects, &[hud], &mut visible, camera.screen_size());
        assert_eq!(visible, vec![hud]);
    }

    #[test]
    fn test_zoom_narrows_the_rectangle() {
        let mut objects = ObjectStore::with_key();
        let id = at(&mut objects, 300.0, 0.0);

        let mut camera = Camera2D::new(800, 600);
        let mut visible = Vec::new();
        FrustumCuller::cull_visible(&camera, &objects, &[id], &mut visible, camera.screen_size());
        assert_eq!(visible.len(), 1);

        camera.set_zoom(2.0);
        FrustumCuller::cull_visible(&camera, &objects, &[id], &mut visible, camera.screen_size());
        assert!(visible.is_empty());
    }
}
