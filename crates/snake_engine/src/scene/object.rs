//! # Scene objects
//!
//! An [`Object`] is plain data: transform, render handles, optional sprite
//! animator, collider and text. Game logic plugs in through a [`Behavior`]
//! whose hooks the [`ObjectManager`](crate::scene::ObjectManager) calls.
//!
//! ## Lifecycle
//!
//! ```text
//! add_object -> pending -> init/late_init -> update (while alive)
//!            -> kill() -> free/late_free -> erased
//! ```
//!
//! Objects are owned by their manager and referenced everywhere else by
//! [`ObjectId`]. Render map entries and collision candidates holding ids
//! never outlive the frame that produced them.

use bitflags::bitflags;
use slotmap::SlotMap;

use crate::foundation::math::{Transform2D, Vec2, Vec4};
use crate::physics::{Collider, CollisionGroupRegistry};
use crate::render::resources::{FontId, MaterialId, MeshId, SpriteAnimator, TextAlignH, TextAlignV, UniformSet};
use crate::render::RenderManager;
use crate::scene::{CameraId, CameraManager, ObjectContext};

slotmap::new_key_type! {
    /// Stable handle to an object owned by an object manager
    pub struct ObjectId;
}

/// Object storage shared by the object manager and the render pipeline
pub type ObjectStore = SlotMap<ObjectId, Object>;

bitflags! {
    /// Per-object state bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u8 {
        /// Updated and drawn; cleared by `kill`
        const ALIVE = 1 << 0;
        /// Submitted for drawing
        const VISIBLE = 1 << 1;
        /// Drawn in screen space with an identity view
        const IGNORE_CAMERA = 1 << 2;
        /// Mirror horizontally
        const FLIP_U = 1 << 3;
        /// Mirror vertically
        const FLIP_V = 1 << 4;
    }
}

/// Content hooks for an object
///
/// Every hook has an empty default. While a hook runs, the behavior is
/// detached from its object, so `object` never contains `self`.
pub trait Behavior {
    /// Called once when the object leaves the pending queue
    fn init(&mut self, _object: &mut Object, _ctx: &mut ObjectContext<'_>) {}

    /// Called after every object of the same batch has been initialised
    fn late_init(&mut self, _object: &mut Object, _ctx: &mut ObjectContext<'_>) {}

    /// Called every frame while the object is alive
    fn update(&mut self, _object: &mut Object, _dt: f32, _ctx: &mut ObjectContext<'_>) {}

    /// Called right before the object's draw call is issued.
    ///
    /// Uniforms staged here are sent with the draw and override the
    /// material's own values for this draw only.
    fn draw(&mut self, _object: &Object, _uniforms: &mut UniformSet) {}

    /// Called when the object is erased after being killed
    fn free(&mut self, _object: &mut Object, _ctx: &mut ObjectContext<'_>) {}

    /// Called after every dead object of the frame has been freed
    fn late_free(&mut self, _object: &mut Object, _ctx: &mut ObjectContext<'_>) {}

    /// Called when this object's collider overlaps `other` and this
    /// object's collision mask targets the other's category
    fn on_collision(&mut self, _object: &mut Object, _other: &mut Object, _ctx: &mut ObjectContext<'_>) {}
}

/// Text drawn with a registered font
#[derive(Debug, Clone, PartialEq)]
pub struct TextComponent {
    font: FontId,
    text: String,
    align_h: TextAlignH,
    align_v: TextAlignV,
    pub(crate) mesh: Option<MeshId>,
    pub(crate) dirty: bool,
}

impl TextComponent {
    /// Font the text is laid out with
    pub fn font(&self) -> FontId {
        self.font
    }

    /// Current string
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Horizontal alignment
    pub fn align_h(&self) -> TextAlignH {
        self.align_h
    }

    /// Vertical alignment
    pub fn align_v(&self) -> TextAlignV {
        self.align_v
    }
}

/// Drawable, collidable scene object
pub struct Object {
    tag: String,
    flags: ObjectFlags,
    transform: Transform2D,
    color: Vec4,
    mesh: Option<MeshId>,
    mesh_half_extents: Vec2,
    material: Option<MaterialId>,
    animator: Option<SpriteAnimator>,
    collider: Option<Collider>,
    collision_category: u32,
    collision_mask: u32,
    render_layer: String,
    reference_camera: Option<CameraId>,
    text: Option<TextComponent>,
    behavior: Option<Box<dyn Behavior>>,
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("tag", &self.tag)
            .field("flags", &self.flags)
            .field("position", &self.transform.position())
            .field("mesh", &self.mesh)
            .field("material", &self.material)
            .field("render_layer", &self.render_layer)
            .finish_non_exhaustive()
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Object {
    /// Alive, visible, white, untextured object at the origin
    pub fn new() -> Self {
        Self {
            tag: String::new(),
            flags: ObjectFlags::ALIVE | ObjectFlags::VISIBLE,
            transform: Transform2D::new(),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            mesh: None,
            mesh_half_extents: Vec2::new(0.5, 0.5),
            material: None,
            animator: None,
            collider: None,
            collision_category: 0,
            collision_mask: 0,
            render_layer: String::new(),
            reference_camera: None,
            text: None,
            behavior: None,
        }
    }

    /// Attach content hooks
    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Replace the content hooks
    pub fn set_behavior(&mut self, behavior: Box<dyn Behavior>) {
        self.behavior = Some(behavior);
    }

    /// Whether content hooks are attached
    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    /// Turn this object into text drawn with the font tagged `font_tag`.
    ///
    /// The text mesh is generated by the owning object manager before the
    /// next draw. Unknown fonts leave the object without text.
    pub fn with_text(mut self, render: &RenderManager, font_tag: &str, text: &str) -> Self {
        let Some(font) = render.font_by_tag(font_tag) else {
            return self;
        };
        self.material = render.font_material(font);
        self.text = Some(TextComponent {
            font,
            text: text.to_string(),
            align_h: TextAlignH::Left,
            align_v: TextAlignV::Top,
            mesh: None,
            dirty: true,
        });
        self
    }

    /// Tag given when the object was added
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: &str) {
        self.tag = tag.to_string();
    }

    /// State bits
    pub fn flags(&self) -> ObjectFlags {
        self.flags
    }

    /// Whether the object is still updated
    pub fn is_alive(&self) -> bool {
        self.flags.contains(ObjectFlags::ALIVE)
    }

    /// Mark for removal at the end of the frame's update
    pub fn kill(&mut self) {
        self.flags.remove(ObjectFlags::ALIVE);
    }

    /// Whether the object is submitted for drawing
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ObjectFlags::VISIBLE)
    }

    /// Show or hide
    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(ObjectFlags::VISIBLE, visible);
    }

    /// Transform
    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    /// Mutable transform
    pub fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    /// RGBA tint
    pub fn color(&self) -> Vec4 {
        self.color
    }

    /// Set the RGBA tint
    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    /// Use the mesh tagged `tag`, or the default mesh if it is unknown
    pub fn set_mesh(&mut self, render: &RenderManager, tag: &str) {
        self.set_mesh_id(render, render.mesh_by_tag(tag));
    }

    /// Use mesh `id`, caching its local bounds for culling
    pub fn set_mesh_id(&mut self, render: &RenderManager, id: MeshId) {
        self.mesh = Some(id);
        self.mesh_half_extents = render
            .mesh(id)
            .map_or(Vec2::new(0.5, 0.5), |mesh| mesh.local_half_extents());
    }

    /// Mesh handle
    pub fn mesh(&self) -> Option<MeshId> {
        self.mesh
    }

    /// Use the material tagged `tag`, or the error material if it is unknown
    pub fn set_material(&mut self, render: &RenderManager, tag: &str) {
        self.material = Some(render.material_by_tag(tag));
    }

    /// Use material `id`
    pub fn set_material_id(&mut self, id: MaterialId) {
        self.material = Some(id);
    }

    /// Material handle
    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    /// Animate with the sprite sheet tagged `sheet_tag`
    pub fn attach_animator(&mut self, render: &RenderManager, sheet_tag: &str, frame_time: f32, looping: bool) {
        let sheet_id = render.sprite_sheet_by_tag(sheet_tag);
        match render.sprite_sheet(sheet_id) {
            Some(sheet) => self.animator = Some(SpriteAnimator::new(sheet_id, sheet, frame_time, looping)),
            None => log::error!("Sprite sheet '{sheet_tag}' could not be resolved"),
        }
    }

    /// Replace or remove the sprite animator
    pub fn set_animator(&mut self, animator: Option<SpriteAnimator>) {
        self.animator = animator;
    }

    /// Sprite animator
    pub fn animator(&self) -> Option<&SpriteAnimator> {
        self.animator.as_ref()
    }

    /// Mutable sprite animator
    pub fn animator_mut(&mut self) -> Option<&mut SpriteAnimator> {
        self.animator.as_mut()
    }

    /// Replace or remove the collider
    pub fn set_collider(&mut self, collider: Option<Collider>) {
        self.collider = collider;
    }

    /// Collider
    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    /// Mutable collider
    pub fn collider_mut(&mut self) -> Option<&mut Collider> {
        self.collider.as_mut()
    }

    /// Join collision group `tag` and collide with the groups in `targets`
    pub fn set_collision<S: AsRef<str>>(&mut self, registry: &mut CollisionGroupRegistry, tag: &str, targets: &[S]) {
        self.collision_category = registry.group_bit(tag);
        self.collision_mask = registry.mask_of(targets);
    }

    /// Collision category bit
    pub fn collision_category(&self) -> u32 {
        self.collision_category
    }

    /// Collision mask
    pub fn collision_mask(&self) -> u32 {
        self.collision_mask
    }

    /// Render layer tag
    pub fn render_layer(&self) -> &str {
        &self.render_layer
    }

    /// Draw on the layer tagged `tag`
    pub fn set_render_layer(&mut self, tag: &str) {
        self.render_layer = tag.to_string();
    }

    /// Draw in screen space. `reference` is the camera used to map the
    /// object back into world space for queries.
    pub fn set_ignore_camera(&mut self, ignore: bool, reference: Option<CameraId>) {
        self.flags.set(ObjectFlags::IGNORE_CAMERA, ignore);
        if ignore {
            self.reference_camera = reference;
        }
    }

    /// Whether the object is drawn in screen space
    pub fn ignores_camera(&self) -> bool {
        self.flags.contains(ObjectFlags::IGNORE_CAMERA)
    }

    /// Camera used for screen-space corrections
    pub fn reference_camera(&self) -> Option<CameraId> {
        self.reference_camera
    }

    fn screen_space_camera<'c>(&self, cameras: &'c CameraManager) -> Option<&'c crate::render::Camera2D> {
        if self.ignores_camera() {
            cameras.camera(self.reference_camera?)
        } else {
            None
        }
    }

    /// Position in world space, correcting screen-space objects through
    /// their reference camera
    pub fn world_position(&self, cameras: &CameraManager) -> Vec2 {
        match self.screen_space_camera(cameras) {
            Some(camera) => (camera.position() + self.transform.position()) / camera.zoom(),
            None => self.transform.position(),
        }
    }

    /// Scale in world space, correcting screen-space objects through their
    /// reference camera
    pub fn world_scale(&self, cameras: &CameraManager) -> Vec2 {
        match self.screen_space_camera(cameras) {
            Some(camera) => self.transform.scale() / camera.zoom(),
            None => self.transform.scale(),
        }
    }

    /// Local half extents of the current mesh, 0.5 without one
    pub fn mesh_half_extents(&self) -> Vec2 {
        self.mesh_half_extents
    }

    /// Radius of the circle enclosing the scaled mesh bounds
    pub fn bounding_radius(&self) -> f32 {
        self.mesh_half_extents.component_mul(&self.transform.scale()).norm()
    }

    /// Mirror the texture on either axis
    pub fn set_flip_uv(&mut self, flip_u: bool, flip_v: bool) {
        self.flags.set(ObjectFlags::FLIP_U, flip_u);
        self.flags.set(ObjectFlags::FLIP_V, flip_v);
    }

    /// Per-axis UV sign, `-1` on flipped axes
    pub fn uv_flip(&self) -> Vec2 {
        Vec2::new(
            if self.flags.contains(ObjectFlags::FLIP_U) { -1.0 } else { 1.0 },
            if self.flags.contains(ObjectFlags::FLIP_V) { -1.0 } else { 1.0 },
        )
    }

    /// Whether the object can join an instanced batch
    pub fn can_be_instanced(&self, render: &RenderManager) -> bool {
        if self.mesh.is_none() {
            return false;
        }
        self.material
            .and_then(|id| render.material(id))
            .is_some_and(|material| material.is_instancing_supported())
    }

    /// Text component
    pub fn text(&self) -> Option<&TextComponent> {
        self.text.as_ref()
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut TextComponent> {
        self.text.as_mut()
    }

    /// Change the displayed string. The mesh is rebuilt before the next draw.
    pub fn set_text(&mut self, text: &str) {
        match &mut self.text {
            Some(component) if component.text != text => {
                component.text = text.to_string();
                component.dirty = true;
            }
            Some(_) => {}
            None => log::warn!("set_text on object '{}' without a font", self.tag),
        }
    }

    /// Change text alignment
    pub fn set_text_alignment(&mut self, align_h: TextAlignH, align_v: TextAlignV) {
        if let Some(component) = &mut self.text {
            if component.align_h != align_h || component.align_v != align_v {
                component.align_h = align_h;
                component.align_v = align_v;
                component.dirty = true;
            }
        }
    }

    pub(crate) fn take_behavior(&mut self) -> Option<Box<dyn Behavior>> {
        self.behavior.take()
    }

    /// Put a detached behavior back unless a hook installed a new one
    pub(crate) fn restore_behavior(&mut self, behavior: Box<dyn Behavior>) {
        if self.behavior.is_none() {
            self.behavior = Some(behavior);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::resources::{Mesh, PrimitiveType, Vertex};
    use crate::render::{Camera2D, RecordingBackend};
    use approx::assert_relative_eq;

    fn render() -> RenderManager {
        RenderManager::new(Box::new(RecordingBackend::new())).unwrap()
    }

    #[test]
    fn test_new_object_defaults() {
        let object = Object::new();
        assert!(object.is_alive());
        assert!(object.is_visible());
        assert!(!object.ignores_camera());
        assert_eq!(object.uv_flip(), Vec2::new(1.0, 1.0));
        assert_relative_eq!(object.bounding_radius(), 0.5_f32.hypot(0.5));
    }

    #[test]
    fn test_kill_clears_alive_only() {
        let mut object = Object::new();
        object.kill();
        assert!(!object.is_alive());
        assert!(object.is_visible());
    }

    #[test]
    fn test_bounding_radius_uses_mesh_bounds_and_scale() {
        let mut render = render();
        let mesh = Mesh::new(
            vec![Vertex::new([-2.0, -1.0, 0.0], [0.0, 0.0]), Vertex::new([2.0, 1.0, 0.0], [1.0, 1.0])],
            Vec::new(),
            PrimitiveType::Lines,
        );
        render.register_mesh("bar", mesh).unwrap();

        let mut object = Object::new();
        object.set_mesh(&render, "bar");
        object.transform_mut().set_scale(Vec2::new(3.0, 4.0));
        assert_relative_eq!(object.bounding_radius(), 6.0_f32.hypot(4.0));
    }

    #[test]
    fn test_screen_space_world_position() {
        let mut cameras = CameraManager::new();
        let mut camera = Camera2D::new(800, 600);
        camera.set_position(Vec2::new(100.0, 0.0));
        camera.set_zoom(2.0);
        let hud = cameras.register_camera("hud", camera);

        let mut object = Object::new();
        object.transform_mut().set_position(Vec2::new(20.0, 10.0));
        object.transform_mut().set_scale(Vec2::new(4.0, 4.0));
        assert_eq!(object.world_position(&cameras), Vec2::new(20.0, 10.0));

        object.set_ignore_camera(true, Some(hud));
        assert_relative_eq!(object.world_position(&cameras), Vec2::new(60.0, 5.0));
        assert_relative_eq!(object.world_scale(&cameras), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_uv_flip_vector() {
        let mut object = Object::new();
        object.set_flip_uv(true, false);
        assert_eq!(object.uv_flip(), Vec2::new(-1.0, 1.0));
        object.set_flip_uv(false, true);
        assert_eq!(object.uv_flip(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_set_collision_assigns_bits() {
        let mut registry = CollisionGroupRegistry::new();
        let mut object = Object::new();
        object.set_collision(&mut registry, "player", &["enemy", "wall"]);
        assert_eq!(object.collision_category(), 1);
        assert_eq!(object.collision_mask(), 0b110);
    }

    #[test]
    fn test_unknown_resources_fall_back() {
        let render = render();
        let mut object = Object::new();
        object.set_mesh(&render, "missing");
        object.set_material(&render, "missing");
        assert_eq!(object.mesh(), Some(render.mesh_by_tag(crate::render::engine_tags::DEFAULT_MESH)));
        assert_eq!(object.material(), Some(render.material_by_tag(crate::render::engine_tags::ERROR_MATERIAL)));
        assert!(!object.can_be_instanced(&render));
    }

    #[test]
    fn test_set_text_marks_dirty_only_on_change() {
        let mut render = render();
        render
            .register_font("mono", Box::new(crate::render::resources::font::tests::test_font(16)))
            .unwrap();
        let mut object = Object::new().with_text(&render, "mono", "A");
        assert!(object.text().is_some());
        object.text_mut().unwrap().dirty = false;

        object.set_text("A");
        assert!(!object.text().unwrap().dirty);
        object.set_text("AA");
        assert!(object.text().unwrap().dirty);
        assert_eq!(object.text().unwrap().text(), "AA");
    }
}
