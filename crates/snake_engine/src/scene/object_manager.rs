//! # Object manager
//!
//! Owns the objects of one game state and drives their lifecycle:
//!
//! ```text
//! add_object ──► pending ──► init* / late_init* ──► active
//!                                                     │ update (alive only)
//!                                       kill() ──► free* / late_free* ──► erased
//! ```
//!
//! Objects added during a frame are drawable at once but only receive
//! `update` from the frame after they were initialised. Collisions are
//! found with a spatial hash rebuilt every frame.

use std::collections::{HashMap, HashSet};

use crate::foundation::math::{Vec2, Vec4};
use crate::physics::collision_groups::wants_notification;
use crate::physics::CollisionGroupRegistry;
use crate::render::{Camera2D, RenderManager};
use crate::scene::{Behavior, CameraManager, EngineContext, Object, ObjectContext, ObjectId, ObjectStore};
use crate::spatial::{SpatialHashGrid, DEFAULT_CELL_SIZE};

/// Colour of collider outlines
pub const COLLIDER_DEBUG_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

/// Objects of one state plus their broad phase
pub struct ObjectManager {
    objects: ObjectStore,
    /// Every object in add order, pending ones included
    all: Vec<ObjectId>,
    active: Vec<ObjectId>,
    pending: Vec<ObjectId>,
    tags: HashMap<String, ObjectId>,
    collision_groups: CollisionGroupRegistry,
    grid: SpatialHashGrid<ObjectId>,
    spawned: Vec<(Object, String)>,
    reported_pairs: HashSet<(ObjectId, ObjectId)>,
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObjectManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectManager")
            .field("objects", &self.objects.len())
            .field("active", &self.active.len())
            .field("pending", &self.pending.len())
            .field("collision_groups", &self.collision_groups.len())
            .finish_non_exhaustive()
    }
}

/// Run `hook` with the object's behavior detached from it
fn with_behavior(object: &mut Object, hook: impl FnOnce(&mut dyn Behavior, &mut Object)) {
    if let Some(mut behavior) = object.take_behavior() {
        hook(behavior.as_mut(), object);
        object.restore_behavior(behavior);
    }
}

fn object_context<'a>(
    engine: &'a mut EngineContext<'_>,
    cameras: &'a mut CameraManager,
    collision_groups: &'a mut CollisionGroupRegistry,
    spawned: &'a mut Vec<(Object, String)>,
) -> ObjectContext<'a> {
    ObjectContext {
        render: &mut *engine.render,
        cameras,
        collision_groups,
        requests: &mut *engine.requests,
        window_size: engine.window_size,
        spawned,
    }
}

impl ObjectManager {
    /// Empty manager with the default collision cell size
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE)
    }

    /// Empty manager whose collision grid uses `cell_size`
    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            objects: ObjectStore::with_key(),
            all: Vec::new(),
            active: Vec::new(),
            pending: Vec::new(),
            tags: HashMap::new(),
            collision_groups: CollisionGroupRegistry::new(),
            grid: SpatialHashGrid::with_cell_size(cell_size),
            spawned: Vec::new(),
            reported_pairs: HashSet::new(),
        }
    }

    /// Queue `object` under `tag`. It is initialised with the next batch of
    /// pending objects but can be looked up and drawn right away.
    ///
    /// A tag already in use is rebound to the new object with a warning.
    pub fn add_object(&mut self, mut object: Object, tag: &str) -> ObjectId {
        object.set_tag(tag);
        let id = self.objects.insert(object);
        if !tag.is_empty() && self.tags.insert(tag.to_string(), id).is_some() {
            log::warn!("Duplicate object tag '{tag}'");
        }
        self.all.push(id);
        self.pending.push(id);
        id
    }

    /// Run `init` then `late_init` on every active object
    pub fn init_all(&mut self, engine: &mut EngineContext<'_>, cameras: &mut CameraManager) {
        let ids = self.active.clone();
        self.run_init(&ids, engine, cameras);
        self.absorb_spawned();
    }

    /// Advance one frame: update alive objects, erase dead ones, then
    /// initialise everything that was added since the last frame
    pub fn update_all(&mut self, dt: f32, engine: &mut EngineContext<'_>, cameras: &mut CameraManager) {
        let mut ctx = object_context(engine, cameras, &mut self.collision_groups, &mut self.spawned);
        for &id in &self.active {
            let Some(object) = self.objects.get_mut(id) else { continue };
            if !object.is_alive() {
                continue;
            }
            if let Some(animator) = object.animator_mut() {
                animator.update(dt);
            }
            with_behavior(object, |behavior, object| behavior.update(object, dt, &mut ctx));
        }
        drop(ctx);
        self.absorb_spawned();

        self.erase_dead_objects(engine, cameras);
        self.add_all_pending_objects(engine, cameras);
        self.rebuild_text_meshes(engine.render);
    }

    /// Initialise every pending object and move it to the active list
    pub fn add_all_pending_objects(&mut self, engine: &mut EngineContext<'_>, cameras: &mut CameraManager) {
        let batch = std::mem::take(&mut self.pending);
        self.run_init(&batch, engine, cameras);
        self.active.extend(batch);
        self.absorb_spawned();
    }

    fn run_init(&mut self, ids: &[ObjectId], engine: &mut EngineContext<'_>, cameras: &mut CameraManager) {
        let mut ctx = object_context(engine, cameras, &mut self.collision_groups, &mut self.spawned);
        for &id in ids {
            if let Some(object) = self.objects.get_mut(id) {
                with_behavior(object, |behavior, object| behavior.init(object, &mut ctx));
            }
        }
        for &id in ids {
            if let Some(object) = self.objects.get_mut(id) {
                with_behavior(object, |behavior, object| behavior.late_init(object, &mut ctx));
            }
        }
    }

    fn run_free(&mut self, ids: &[ObjectId], engine: &mut EngineContext<'_>, cameras: &mut CameraManager) {
        let mut ctx = object_context(engine, cameras, &mut self.collision_groups, &mut self.spawned);
        for &id in ids {
            if let Some(object) = self.objects.get_mut(id) {
                with_behavior(object, |behavior, object| behavior.free(object, &mut ctx));
            }
        }
        for &id in ids {
            if let Some(object) = self.objects.get_mut(id) {
                with_behavior(object, |behavior, object| behavior.late_free(object, &mut ctx));
            }
        }
    }

    fn erase_dead_objects(&mut self, engine: &mut EngineContext<'_>, cameras: &mut CameraManager) {
        let dead: Vec<ObjectId> = self
            .active
            .iter()
            .copied()
            .filter(|id| self.objects.get(*id).is_some_and(|o| !o.is_alive()))
            .collect();
        if dead.is_empty() {
            return;
        }

        self.run_free(&dead, engine, cameras);
        for &id in &dead {
            self.remove_object(id, engine.render);
        }
        self.active.retain(|id| !dead.contains(id));
        self.all.retain(|id| !dead.contains(id));
        self.absorb_spawned();
        log::trace!("Erased {} dead objects", dead.len());
    }

    fn remove_object(&mut self, id: ObjectId, render: &mut RenderManager) {
        let Some(object) = self.objects.remove(id) else { return };
        if self.tags.get(object.tag()) == Some(&id) {
            self.tags.remove(object.tag());
        }
        if let Some(mesh) = object.text().and_then(|t| t.mesh) {
            render.release_mesh(mesh);
        }
    }

    /// Run `free` then `late_free` on every active object and drop all
    /// objects, pending ones included
    pub fn free_all(&mut self, engine: &mut EngineContext<'_>, cameras: &mut CameraManager) {
        let ids = self.active.clone();
        self.run_free(&ids, engine, cameras);

        let every: Vec<ObjectId> = self.objects.keys().collect();
        for id in every {
            self.remove_object(id, engine.render);
        }
        self.all.clear();
        self.active.clear();
        self.pending.clear();
        self.tags.clear();
        self.spawned.clear();
        self.grid.clear();
    }

    fn absorb_spawned(&mut self) {
        for (object, tag) in std::mem::take(&mut self.spawned) {
            self.add_object(object, &tag);
        }
    }

    fn rebuild_text_meshes(&mut self, render: &mut RenderManager) {
        for &id in &self.all {
            let Some(object) = self.objects.get_mut(id) else { continue };
            let Some(text) = object.text().filter(|t| t.dirty) else { continue };
            let (font, string, align_h, align_v, old) = (text.font(), text.text().to_string(), text.align_h(), text.align_v(), text.mesh);

            if let Some(old) = old {
                render.release_mesh(old);
            }
            match render.create_text_mesh(font, &string, align_h, align_v) {
                Ok(mesh) => {
                    object.set_mesh_id(render, mesh);
                    if let Some(text) = object.text_mut() {
                        text.mesh = Some(mesh);
                        text.dirty = false;
                    }
                }
                Err(err) => {
                    log::error!("Text mesh for object '{}' failed: {err}", object.tag());
                    if let Some(text) = object.text_mut() {
                        text.mesh = None;
                        text.dirty = false;
                    }
                }
            }
        }
    }

    /// Detect overlapping colliders among alive objects and dispatch
    /// `on_collision` to each side whose mask targets the other's category.
    ///
    /// Each pair is reported at most once per call.
    pub fn check_collision(&mut self, engine: &mut EngineContext<'_>, cameras: &mut CameraManager) {
        self.grid.clear();
        for &id in &self.active {
            let Some(object) = self.objects.get_mut(id) else { continue };
            if !object.is_alive() {
                continue;
            }
            let position = object.world_position(cameras);
            let scale = object.world_scale(cameras);
            let (category, mask) = (object.collision_category(), object.collision_mask());
            let Some(collider) = object.collider_mut() else { continue };
            collider.sync_with_transform_scale(scale);
            collider.set_world_position(position);
            self.grid.insert(id, category, mask, collider);
        }

        let mut pairs = Vec::new();
        self.reported_pairs.clear();
        let reported = &mut self.reported_pairs;
        self.grid.compute_collisions(|a, b| {
            let key = if a < b { (a, b) } else { (b, a) };
            if reported.insert(key) {
                pairs.push(key);
            }
        });

        let mut ctx = object_context(engine, cameras, &mut self.collision_groups, &mut self.spawned);
        for (a, b) in pairs {
            Self::dispatch_collision(&mut self.objects, a, b, &mut ctx);
            Self::dispatch_collision(&mut self.objects, b, a, &mut ctx);
        }
        drop(ctx);
        self.absorb_spawned();
    }

    fn dispatch_collision(objects: &mut ObjectStore, id: ObjectId, other_id: ObjectId, ctx: &mut ObjectContext<'_>) {
        let Some([object, other]) = objects.get_disjoint_mut([id, other_id]) else { return };
        if !object.is_alive() || !other.is_alive() {
            return;
        }
        if wants_notification(object.collision_mask(), other.collision_category()) {
            with_behavior(object, |behavior, object| behavior.on_collision(object, other, ctx));
        }
    }

    /// Queue collider outlines of alive, visible objects as debug lines
    pub fn draw_collider_debug(&self, render: &mut RenderManager, camera: Option<&Camera2D>) {
        for &id in &self.active {
            let Some(object) = self.objects.get(id) else { continue };
            if !object.is_alive() || !object.is_visible() {
                continue;
            }
            let Some(collider) = object.collider() else { continue };
            for (from, to) in collider.debug_outline() {
                render.draw_debug_line(from, to, camera, COLLIDER_DEBUG_COLOR, 1.0);
            }
        }
    }

    /// Submit every object, pending ones included
    pub fn draw_all(&self, render: &mut RenderManager, camera: Option<&Camera2D>) {
        render.submit(&self.objects, &self.all, camera);
    }

    /// Submit a chosen subset
    pub fn draw_objects(&self, render: &mut RenderManager, ids: &[ObjectId], camera: Option<&Camera2D>) {
        render.submit(&self.objects, ids, camera);
    }

    /// Submit every alive object tagged `tag`
    pub fn draw_objects_with_tag(&self, render: &mut RenderManager, tag: &str, camera: Option<&Camera2D>) {
        let ids = self.find_all_by_tag(tag);
        render.submit(&self.objects, &ids, camera);
    }

    /// Object last added under `tag`
    pub fn find_by_tag(&self, tag: &str) -> Option<ObjectId> {
        self.tags.get(tag).copied()
    }

    /// Every alive object tagged `tag`, in add order
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<ObjectId> {
        self.all
            .iter()
            .copied()
            .filter(|id| self.objects.get(*id).is_some_and(|o| o.is_alive() && o.tag() == tag))
            .collect()
    }

    /// Object by handle
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id)
    }

    /// Mutable object by handle
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    /// Object storage, e.g. for resource in-use checks
    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub(crate) fn objects_mut(&mut self) -> &mut ObjectStore {
        &mut self.objects
    }

    /// Handles in add order, pending objects included
    pub fn ids(&self) -> &[ObjectId] {
        &self.all
    }

    /// Number of objects awaiting initialisation
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of objects owned, pending included
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are owned
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Named collision groups of this manager
    pub fn collision_group_registry(&mut self) -> &mut CollisionGroupRegistry {
        &mut self.collision_groups
    }

    /// Centre of an object's collider after the last collision pass
    pub fn collider_position(&self, id: ObjectId) -> Option<Vec2> {
        self.objects.get(id)?.collider().map(|c| c.world_position())
    }
}
