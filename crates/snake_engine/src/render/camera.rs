//! # 2D Camera
//!
//! A camera is a position, a zoom factor and the pixel size of the screen
//! area it renders to. World units map to pixels at zoom 1.
//!
//! The view matrix is `scale(zoom) * translate(-position)`; the projection
//! is an orthographic box of the screen size centred on the origin.

use crate::foundation::math::{utils, Mat4, Vec2};

/// Default screen width for new cameras
pub const DEFAULT_SCREEN_WIDTH: u32 = 800;
/// Default screen height for new cameras
pub const DEFAULT_SCREEN_HEIGHT: u32 = 600;

/// Orthographic 2D camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    position: Vec2,
    zoom: f32,
    screen_width: u32,
    screen_height: u32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(DEFAULT_SCREEN_WIDTH, DEFAULT_SCREEN_HEIGHT)
    }
}

impl Camera2D {
    /// Camera at the origin, zoom 1, rendering to a `width` x `height` area
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            position: Vec2::zeros(),
            zoom: 1.0,
            screen_width,
            screen_height,
        }
    }

    /// Resize the screen area
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_width = width;
        self.screen_height = height;
    }

    /// Screen width in pixels
    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    /// Screen height in pixels
    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    /// Screen size as a vector
    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.screen_width as f32, self.screen_height as f32)
    }

    /// Move to `position`
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Move by `delta`
    pub fn add_position(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// World position at the screen centre
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Set the zoom factor. Non-positive values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom > 0.0 {
            self.zoom = zoom;
        } else {
            log::warn!("Ignoring non-positive camera zoom {zoom}");
        }
    }

    /// Zoom factor, greater than zero
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// World-to-view transform
    pub fn view_matrix(&self) -> Mat4 {
        utils::scale_2d(Vec2::new(self.zoom, self.zoom)) * utils::translation_2d(-self.position)
    }

    /// Orthographic projection sized to the screen
    pub fn projection_matrix(&self) -> Mat4 {
        utils::centered_ortho(self.screen_width as f32, self.screen_height as f32)
    }

    /// Whether a circle overlaps the visible world rectangle for a
    /// viewport of `viewport_size` pixels
    pub fn is_in_view(&self, center: Vec2, radius: f32, viewport_size: Vec2) -> bool {
        let half = viewport_size / (2.0 * self.zoom);
        let closest = utils::clamp_2d(center, self.position - half, self.position + half);
        (center - closest).norm_squared() <= radius * radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_view_matrix_centres_camera_position() {
        let mut camera = Camera2D::new(800, 600);
        camera.set_position(Vec2::new(100.0, 50.0));
        camera.set_zoom(2.0);
        let p = camera.view_matrix().transform_point(&Point3::new(110.0, 50.0, 0.0));
        assert_relative_eq!(p.x, 20.0);
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn test_is_in_view_edges() {
        let camera = Camera2D::new(800, 600);
        let viewport = camera.screen_size();
        assert!(camera.is_in_view(Vec2::new(0.0, 0.0), 1.0, viewport));
        assert!(camera.is_in_view(Vec2::new(405.0, 0.0), 5.0, viewport));
        assert!(!camera.is_in_view(Vec2::new(406.0, 0.0), 5.0, viewport));
        assert!(!camera.is_in_view(Vec2::new(0.0, -320.0), 10.0, viewport));
        // Inside the radius-grown rectangle but 7.07 from the corner.
        assert!(!camera.is_in_view(Vec2::new(405.0, 305.0), 7.0, viewport));
        assert!(camera.is_in_view(Vec2::new(405.0, 305.0), 7.1, viewport));
    }

    #[test]
    fn test_zoom_shrinks_visible_area() {
        let mut camera = Camera2D::new(800, 600);
        camera.set_zoom(2.0);
        let viewport = camera.screen_size();
        assert!(camera.is_in_view(Vec2::new(200.0, 0.0), 0.0, viewport));
        assert!(!camera.is_in_view(Vec2::new(201.0, 0.0), 0.0, viewport));

        camera.set_zoom(0.0);
        assert_relative_eq!(camera.zoom(), 2.0);
    }
}
