//! Tag-keyed cameras with one active camera

use crate::foundation::collections::TaggedMap;
use crate::render::Camera2D;

slotmap::new_key_type! {
    /// Handle to a camera owned by a [`CameraManager`]
    pub struct CameraId;
}

/// Tag of the camera every manager starts with
pub const MAIN_CAMERA: &str = "main";

/// Owns the cameras of one scene
#[derive(Debug)]
pub struct CameraManager {
    cameras: TaggedMap<CameraId, Camera2D>,
    active: Option<CameraId>,
}

impl Default for CameraManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraManager {
    /// Manager holding a [`MAIN_CAMERA`] camera, which is active
    pub fn new() -> Self {
        let mut cameras = TaggedMap::new();
        let active = cameras.insert_tagged(MAIN_CAMERA, Camera2D::new(1, 1));
        Self { cameras, active }
    }

    /// Register `camera` under `tag`, replacing any camera already there.
    ///
    /// A replaced camera keeps its handle.
    pub fn register_camera(&mut self, tag: &str, camera: Camera2D) -> CameraId {
        if let Some(id) = self.cameras.key_of(tag) {
            if let Some(slot) = self.cameras.get_mut(id) {
                *slot = camera;
            }
            return id;
        }
        // The tag is free, so the tagged insert cannot be refused
        self.cameras.insert_tagged(tag, camera).unwrap_or_else(|| self.cameras.insert(camera))
    }

    /// Handle of the camera tagged `tag`
    pub fn camera_id(&self, tag: &str) -> Option<CameraId> {
        self.cameras.key_of(tag)
    }

    /// Camera by handle
    pub fn camera(&self, id: CameraId) -> Option<&Camera2D> {
        self.cameras.get(id)
    }

    /// Mutable camera by handle
    pub fn camera_mut(&mut self, id: CameraId) -> Option<&mut Camera2D> {
        self.cameras.get_mut(id)
    }

    /// Camera by tag
    pub fn camera_by_tag(&self, tag: &str) -> Option<&Camera2D> {
        self.cameras.get_by_tag(tag)
    }

    /// Mutable camera by tag
    pub fn camera_by_tag_mut(&mut self, tag: &str) -> Option<&mut Camera2D> {
        let id = self.cameras.key_of(tag)?;
        self.cameras.get_mut(id)
    }

    /// Make the camera tagged `tag` active. Unknown tags are ignored.
    pub fn set_active_camera(&mut self, tag: &str) {
        match self.cameras.key_of(tag) {
            Some(id) => self.active = Some(id),
            None => log::warn!("Camera '{tag}' not found, active camera unchanged"),
        }
    }

    /// Active camera handle
    pub fn active_camera_id(&self) -> Option<CameraId> {
        self.active
    }

    /// Active camera
    pub fn active_camera(&self) -> Option<&Camera2D> {
        self.cameras.get(self.active?)
    }

    /// Mutable active camera
    pub fn active_camera_mut(&mut self) -> Option<&mut Camera2D> {
        self.cameras.get_mut(self.active?)
    }

    /// Tag of the active camera
    pub fn active_camera_tag(&self) -> Option<&str> {
        self.cameras.tag_of(self.active?)
    }

    /// Resize every camera's screen area
    pub fn set_screen_size_for_all(&mut self, width: u32, height: u32) {
        for id in self.ids() {
            if let Some(camera) = self.cameras.get_mut(id) {
                camera.set_screen_size(width, height);
            }
        }
    }

    /// Drop every camera. The active handle then resolves to nothing.
    pub fn clear(&mut self) {
        self.cameras.clear();
    }

    /// Number of cameras
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Whether there are no cameras
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    fn ids(&self) -> Vec<CameraId> {
        self.cameras.iter().map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;

    #[test]
    fn test_starts_with_active_main_camera() {
        let cameras = CameraManager::new();
        assert_eq!(cameras.len(), 1);
        assert_eq!(cameras.active_camera_tag(), Some(MAIN_CAMERA));
        assert!(cameras.active_camera().is_some());
    }

    #[test]
    fn test_register_replaces_and_keeps_handle() {
        let mut cameras = CameraManager::new();
        let ui = cameras.register_camera("ui", Camera2D::new(320, 240));
        let mut moved = Camera2D::new(320, 240);
        moved.set_position(Vec2::new(5.0, 0.0));
        assert_eq!(cameras.register_camera("ui", moved), ui);
        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras.camera(ui).map(Camera2D::position), Some(Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn test_unknown_active_tag_is_ignored() {
        let mut cameras = CameraManager::new();
        cameras.register_camera("ui", Camera2D::default());
        cameras.set_active_camera("nope");
        assert_eq!(cameras.active_camera_tag(), Some(MAIN_CAMERA));
        cameras.set_active_camera("ui");
        assert_eq!(cameras.active_camera_tag(), Some("ui"));
    }

    #[test]
    fn test_screen_size_for_all() {
        let mut cameras = CameraManager::new();
        let ui = cameras.register_camera("ui", Camera2D::default());
        cameras.set_screen_size_for_all(1024, 768);
        assert_eq!(cameras.active_camera().map(Camera2D::screen_width), Some(1024));
        assert_eq!(cameras.camera(ui).map(Camera2D::screen_height), Some(768));
    }
}
