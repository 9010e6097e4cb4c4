//! # Render manager
//!
//! Owns every render resource behind tag-keyed registries and turns
//! submitted objects into backend calls.
//!
//! ## Batching
//!
//! [`submit`](RenderManager::submit) culls objects against the camera and
//! files the survivors under `layer -> shader -> InstanceBatchKey`.
//! [`flush_draw_commands`](RenderManager::flush_draw_commands) walks that
//! map in order. A batch whose first object's material has instancing
//! enabled on an instancing-capable shader becomes one instanced draw;
//! every other batch draws object by object in submission order.
//!
//! ## Per-draw uniforms
//!
//! View, projection, model, colour and sprite UVs are staged in a
//! frame-local [`UniformSet`] layered over the material's own uniforms when
//! sent. Materials are never modified by drawing.
//!
//! ## Fallbacks
//!
//! Failed `*_by_tag` lookups log an error and return an engine resource
//! created in [`RenderManager::new`], so a missing asset shows up as the
//! yellow/black checkerboard instead of a crash.

use std::collections::BTreeMap;
use std::path::Path;

use crate::foundation::collections::{Key, TaggedMap};
use crate::foundation::math::{utils, Mat4, Vec2, Vec4};
use crate::render::backend::{InstanceData, Rect, RenderBackend};
use crate::render::culling::FrustumCuller;
use crate::render::debug_lines::DebugLineQueue;
use crate::render::engine_shaders as glsl;
use crate::render::layers::{RenderLayerManager, MAX_LAYERS};
use crate::render::resources::{
    Font, FontId, Material, MaterialId, Mesh, MeshId, Shader, ShaderId, ShaderStage, SpriteAnimator, SpriteSheet,
    SpriteSheetId, TextAlignH, TextAlignV, Texture, TextureId, TextureSettings, UniformSet, UniformValue,
    MAX_FONT_PIXEL_SIZE, MIN_FONT_PIXEL_SIZE,
};
use crate::render::{Camera2D, InstanceBatchKey, RenderError, RenderResult};
use crate::scene::{Object, ObjectId, ObjectStore};

/// Tags of the resources created at startup
pub mod engine_tags {
    /// Flat colour shader, fallback for unknown shader tags
    pub const DEFAULT_SHADER: &str = "[EngineShader]default";
    /// Textured shader behind the error material
    pub const DEFAULT_TEXTURE_SHADER: &str = "[EngineShader]default_texture";
    /// Shader for font materials
    pub const TEXT_SHADER: &str = "[EngineShader]internal_text";
    /// Shader for debug lines
    pub const DEBUG_LINE_SHADER: &str = "[EngineShader]internal_debug_line";
    /// Checkerboard, fallback for unknown texture tags
    pub const ERROR_TEXTURE: &str = "[EngineTexture]error";
    /// Checkerboard material, fallback for unknown material tags
    pub const ERROR_MATERIAL: &str = "[EngineMaterial]error";
    /// Unit quad, fallback for unknown mesh tags
    pub const DEFAULT_MESH: &str = "[EngineMesh]default";
    /// Single-frame sheet over the error texture
    pub const DEFAULT_SPRITE_SHEET: &str = "[EngineSpriteSheet]default";
}

/// One object queued in a batch, with the camera it was submitted with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchEntry {
    /// Queued object
    pub object: ObjectId,
    /// Camera at submission time, `None` for window-space drawing
    pub camera: Option<Camera2D>,
}

/// Batches of one shader keyed by mesh, material and sprite sheet
pub type BatchMap = BTreeMap<InstanceBatchKey, Vec<BatchEntry>>;
/// Shader groups of one layer
pub type ShaderMap = BTreeMap<ShaderId, BatchMap>;

/// Counters for the last flushed frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Non-instanced draw calls
    pub draw_calls: u32,
    /// Instanced draw calls
    pub instanced_draw_calls: u32,
    /// Instances across all instanced draws
    pub instances: u32,
    /// Material switches
    pub material_binds: u32,
    /// Debug line draw calls
    pub debug_line_draws: u32,
}

struct FontEntry {
    font: Box<dyn Font>,
    atlas: TextureId,
    material: MaterialId,
}

#[derive(Debug, Default)]
struct EngineResources {
    shader: ShaderId,
    textured_shader: ShaderId,
    text_shader: ShaderId,
    debug_line_shader: ShaderId,
    error_texture: TextureId,
    error_material: MaterialId,
    mesh: MeshId,
    sprite_sheet: SpriteSheetId,
}

impl EngineResources {
    fn owns_shader(&self, id: ShaderId) -> bool {
        [self.shader, self.textured_shader, self.text_shader, self.debug_line_shader].contains(&id)
    }
}

/// Resource registries plus the batching draw pipeline
pub struct RenderManager {
    backend: Box<dyn RenderBackend>,
    shaders: TaggedMap<ShaderId, Shader>,
    textures: TaggedMap<TextureId, Texture>,
    meshes: TaggedMap<MeshId, Mesh>,
    materials: TaggedMap<MaterialId, Material>,
    fonts: TaggedMap<FontId, FontEntry>,
    sprite_sheets: TaggedMap<SpriteSheetId, SpriteSheet>,
    layers: RenderLayerManager,
    engine: EngineResources,
    render_map: [ShaderMap; MAX_LAYERS],
    debug_lines: DebugLineQueue,
    visible: Vec<ObjectId>,
    stats: RenderStats,
    bound_texture_units: u32,
}

impl std::fmt::Debug for RenderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderManager")
            .field("shaders", &self.shaders.len())
            .field("textures", &self.textures.len())
            .field("meshes", &self.meshes.len())
            .field("materials", &self.materials.len())
            .field("fonts", &self.fonts.len())
            .field("sprite_sheets", &self.sprite_sheets.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn duplicate(kind: &'static str, tag: &str) -> RenderError {
    log::warn!("{kind} with tag \"{tag}\" already registered");
    RenderError::DuplicateTag { kind, tag: tag.to_string() }
}

fn registered<K: Key, V>(map: &TaggedMap<K, V>, kind: &'static str, tag: &str) -> RenderResult<K> {
    map.key_of(tag).ok_or_else(|| {
        log::info!("Cannot delete the {kind} [{tag}] because it was not found");
        RenderError::NotFound { kind, tag: tag.to_string() }
    })
}

fn in_use(kind: &'static str, tag: &str) -> RenderError {
    log::warn!("Cannot delete the {kind} [{tag}] while it is still referenced");
    RenderError::ResourceInUse { kind, tag: tag.to_string() }
}

fn fallback<K: Key, V>(map: &TaggedMap<K, V>, kind: &str, tag: &str, default: K) -> K {
    map.key_of(tag).unwrap_or_else(|| {
        log::error!("There is no {kind} named '{tag}'");
        default
    })
}

fn model_matrix(object: &Object) -> Mat4 {
    object.transform().matrix() * utils::scale_2d(object.uv_flip())
}

fn view_projection(camera: Option<&Camera2D>, ignore_camera: bool, window_size: Vec2) -> (Mat4, Mat4) {
    let view = match camera {
        Some(camera) if !ignore_camera => camera.view_matrix(),
        _ => Mat4::identity(),
    };
    let projection = camera.map_or_else(
        || utils::centered_ortho(window_size.x, window_size.y),
        Camera2D::projection_matrix,
    );
    (view, projection)
}

impl RenderManager {
    /// Create the manager and register the engine resources on `backend`
    pub fn new(backend: Box<dyn RenderBackend>) -> RenderResult<Self> {
        let mut manager = Self {
            backend,
            shaders: TaggedMap::new(),
            textures: TaggedMap::new(),
            meshes: TaggedMap::new(),
            materials: TaggedMap::new(),
            fonts: TaggedMap::new(),
            sprite_sheets: TaggedMap::new(),
            layers: RenderLayerManager::new(),
            engine: EngineResources::default(),
            render_map: Default::default(),
            debug_lines: DebugLineQueue::new(),
            visible: Vec::new(),
            stats: RenderStats::default(),
            bound_texture_units: 0,
        };
        manager.init().map_err(|e| RenderError::InitializationFailed(e.to_string()))?;
        Ok(manager)
    }

    fn init(&mut self) -> RenderResult<()> {
        use engine_tags::*;

        let text_shader = self.register_shader(TEXT_SHADER, Shader::from_sources(glsl::TEXT_VERTEX, glsl::TEXT_FRAGMENT))?;
        let debug_line_shader = self.register_shader(
            DEBUG_LINE_SHADER,
            Shader::from_sources(glsl::DEBUG_LINE_VERTEX, glsl::DEBUG_LINE_FRAGMENT),
        )?;
        let shader = self.register_shader(DEFAULT_SHADER, Shader::from_sources(glsl::DEFAULT_VERTEX, glsl::DEFAULT_FRAGMENT))?;
        let error_texture = self.register_texture(ERROR_TEXTURE, Texture::checkerboard(8))?;
        let textured_shader = self.register_shader(
            DEFAULT_TEXTURE_SHADER,
            Shader::from_sources(glsl::TEXTURED_VERTEX, glsl::TEXTURED_FRAGMENT),
        )?;
        let error_material = self.register_material(ERROR_MATERIAL, DEFAULT_TEXTURE_SHADER, &[("u_ErrorTexture", ERROR_TEXTURE)])?;
        let mesh = self.register_mesh(DEFAULT_MESH, Mesh::unit_quad())?;
        let sprite_sheet = self.register_sprite_sheet(DEFAULT_SPRITE_SHEET, ERROR_TEXTURE, 1, 1)?;

        self.engine = EngineResources {
            shader,
            textured_shader,
            text_shader,
            debug_line_shader,
            error_texture,
            error_material,
            mesh,
            sprite_sheet,
        };
        log::info!("Render manager initialized with {} engine shaders", self.shaders.len());
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Register and compile a shader
    pub fn register_shader(&mut self, tag: &str, shader: Shader) -> RenderResult<ShaderId> {
        let Some(id) = self.shaders.insert_tagged(tag, shader) else {
            return Err(duplicate("shader", tag));
        };
        let compiled = match self.shaders.get(id) {
            Some(shader) => self.backend.compile_shader(id, shader),
            None => Ok(()),
        };
        if let Err(err) = compiled {
            self.shaders.remove(id);
            log::error!("Failed to register shader [{tag}]: {err}");
            return Err(err);
        }
        log::debug!("Registered shader [{tag}]");
        Ok(id)
    }

    /// Register a shader loaded from per-stage source files
    pub fn register_shader_from_files<P: AsRef<Path>>(
        &mut self,
        tag: &str,
        sources: &[(ShaderStage, P)],
    ) -> RenderResult<ShaderId> {
        if self.shaders.contains_tag(tag) {
            return Err(duplicate("shader", tag));
        }
        let shader = Shader::from_files(sources).inspect_err(|err| {
            log::error!("Failed to register shader [{tag}]: {err}");
        })?;
        self.register_shader(tag, shader)
    }

    /// Register and upload a texture
    pub fn register_texture(&mut self, tag: &str, texture: Texture) -> RenderResult<TextureId> {
        let Some(id) = self.textures.insert_tagged(tag, texture) else {
            return Err(duplicate("texture", tag));
        };
        self.upload_texture(id).inspect_err(|err| log::error!("Failed to register texture [{tag}]: {err}"))?;
        Ok(id)
    }

    /// Register a texture loaded from an image file
    pub fn register_texture_from_file(
        &mut self,
        tag: &str,
        path: impl AsRef<Path>,
        settings: TextureSettings,
    ) -> RenderResult<TextureId> {
        if self.textures.contains_tag(tag) {
            return Err(duplicate("texture", tag));
        }
        let texture = Texture::from_file(path, settings).inspect_err(|err| {
            log::error!("Failed to register texture [{tag}]: {err}");
        })?;
        self.register_texture(tag, texture)
    }

    fn upload_texture(&mut self, id: TextureId) -> RenderResult<()> {
        let uploaded = match self.textures.get(id) {
            Some(texture) => self.backend.upload_texture(id, texture),
            None => Ok(()),
        };
        if uploaded.is_err() {
            self.textures.remove(id);
        }
        uploaded
    }

    /// Register and upload a mesh
    pub fn register_mesh(&mut self, tag: &str, mesh: Mesh) -> RenderResult<MeshId> {
        let Some(id) = self.meshes.insert_tagged(tag, mesh) else {
            return Err(duplicate("mesh", tag));
        };
        self.upload_mesh(id).inspect_err(|err| log::error!("Failed to register mesh [{tag}]: {err}"))?;
        Ok(id)
    }

    fn upload_mesh(&mut self, id: MeshId) -> RenderResult<()> {
        let uploaded = match self.meshes.get(id) {
            Some(mesh) => self.backend.upload_mesh(id, mesh),
            None => Ok(()),
        };
        if uploaded.is_err() {
            self.meshes.remove(id);
        }
        uploaded
    }

    /// Register a material drawing with the shader tagged `shader_tag`.
    ///
    /// `textures` maps sampler uniforms to texture tags; unknown textures
    /// are skipped with a warning.
    pub fn register_material(
        &mut self,
        tag: &str,
        shader_tag: &str,
        textures: &[(&str, &str)],
    ) -> RenderResult<MaterialId> {
        if self.materials.contains_tag(tag) {
            return Err(duplicate("material", tag));
        }
        let Some((shader_id, shader)) = self.shaders.key_of(shader_tag).and_then(|id| Some((id, self.shaders.get(id)?)))
        else {
            log::warn!("Shader not found: {shader_tag}");
            return Err(RenderError::NotFound { kind: "shader", tag: shader_tag.to_string() });
        };

        let mut material = Material::new(shader_id, shader);
        for (sampler, texture_tag) in textures {
            match self.textures.key_of(texture_tag) {
                Some(texture) => material.set_texture(sampler, texture),
                None => log::warn!("Texture not found: {texture_tag}"),
            }
        }
        self.register_built_material(tag, material)
    }

    /// Register an already configured material
    pub fn register_built_material(&mut self, tag: &str, material: Material) -> RenderResult<MaterialId> {
        self.materials.insert_tagged(tag, material).ok_or_else(|| duplicate("material", tag))
    }

    /// Register a font. Its atlas is uploaded and a text material is
    /// created for it.
    pub fn register_font(&mut self, tag: &str, font: Box<dyn Font>) -> RenderResult<FontId> {
        if self.fonts.contains_tag(tag) {
            return Err(duplicate("font", tag));
        }
        let pixel_size = font.pixel_size();
        if !(MIN_FONT_PIXEL_SIZE..=MAX_FONT_PIXEL_SIZE).contains(&pixel_size) {
            log::error!(
                "Font pixel size out of bounds: {pixel_size} (allowed: {MIN_FONT_PIXEL_SIZE} - {MAX_FONT_PIXEL_SIZE})"
            );
            return Err(RenderError::InvalidConfiguration(format!(
                "font '{tag}' pixel size {pixel_size} outside {MIN_FONT_PIXEL_SIZE}..={MAX_FONT_PIXEL_SIZE}"
            )));
        }

        let atlas = self.textures.insert(font.atlas().clone());
        self.upload_texture(atlas)?;

        let text_shader = self.engine.text_shader;
        let Some(shader) = self.shaders.get(text_shader) else {
            return Err(RenderError::NotFound { kind: "shader", tag: engine_tags::TEXT_SHADER.to_string() });
        };
        let mut material = Material::new(text_shader, shader);
        material.set_texture("u_FontTexture", atlas);
        material.set_uniform("u_Color", Vec4::new(1.0, 1.0, 1.0, 1.0));
        let material = self.materials.insert(material);

        match self.fonts.insert_tagged(tag, FontEntry { font, atlas, material }) {
            Some(id) => {
                log::debug!("Registered font [{tag}] at {pixel_size}px");
                Ok(id)
            }
            None => Err(duplicate("font", tag)),
        }
    }

    /// Bind `tag` to render layer `id`
    pub fn register_render_layer(&mut self, tag: &str, id: u8) -> RenderResult<()> {
        self.layers.register_layer(tag, id)
    }

    /// Register a sprite sheet slicing the texture tagged `texture_tag`
    pub fn register_sprite_sheet(
        &mut self,
        tag: &str,
        texture_tag: &str,
        frame_width: u32,
        frame_height: u32,
    ) -> RenderResult<SpriteSheetId> {
        if self.sprite_sheets.contains_tag(tag) {
            return Err(duplicate("sprite sheet", tag));
        }
        let Some((texture_id, texture)) =
            self.textures.key_of(texture_tag).and_then(|id| Some((id, self.textures.get(id)?)))
        else {
            log::error!("Texture not found for sprite sheet: {texture_tag}");
            return Err(RenderError::NotFound { kind: "texture", tag: texture_tag.to_string() });
        };
        let sheet = SpriteSheet::new(texture_id, texture, frame_width, frame_height)
            .inspect_err(|err| log::error!("Failed to register sprite sheet [{tag}]: {err}"))?;
        self.sprite_sheets.insert_tagged(tag, sheet).ok_or_else(|| duplicate("sprite sheet", tag))
    }

    // ---------------------------------------------------------------------
    // Unregistration
    // ---------------------------------------------------------------------

    fn material_of<'a>(&'a self, object: &Object) -> Option<&'a Material> {
        object.material().and_then(|id| self.materials.get(id))
    }

    /// Remove a shader unless an object's material still draws with it
    pub fn unregister_shader(&mut self, tag: &str, objects: &ObjectStore) -> RenderResult<()> {
        let id = registered(&self.shaders, "shader", tag)?;
        if self.engine.owns_shader(id)
            || objects.values().any(|o| self.material_of(o).is_some_and(|m| m.has_shader(id)))
        {
            return Err(in_use("shader", tag));
        }
        self.shaders.remove(id);
        self.backend.release_shader(id);
        Ok(())
    }

    /// Remove a texture unless a live material or animator still samples it
    pub fn unregister_texture(&mut self, tag: &str, objects: &ObjectStore) -> RenderResult<()> {
        let id = registered(&self.textures, "texture", tag)?;
        let sampled_by = |object: &Object| {
            self.material_of(object).is_some_and(|m| m.uses_texture(id))
                || object
                    .animator()
                    .and_then(|a| self.sprite_sheets.get(a.sheet()))
                    .is_some_and(|sheet| sheet.texture() == id)
        };
        if id == self.engine.error_texture || objects.values().any(sampled_by) {
            return Err(in_use("texture", tag));
        }
        self.textures.remove(id);
        self.backend.release_texture(id);
        Ok(())
    }

    /// Remove a mesh unless an object still draws it
    pub fn unregister_mesh(&mut self, tag: &str, objects: &ObjectStore) -> RenderResult<()> {
        let id = registered(&self.meshes, "mesh", tag)?;
        if id == self.engine.mesh || objects.values().any(|o| o.mesh() == Some(id)) {
            return Err(in_use("mesh", tag));
        }
        self.meshes.remove(id);
        self.backend.release_mesh(id);
        Ok(())
    }

    /// Remove a material unless an object still uses it
    pub fn unregister_material(&mut self, tag: &str, objects: &ObjectStore) -> RenderResult<()> {
        let id = registered(&self.materials, "material", tag)?;
        if id == self.engine.error_material || objects.values().any(|o| o.material() == Some(id)) {
            return Err(in_use("material", tag));
        }
        self.materials.remove(id);
        Ok(())
    }

    /// Remove a font, its atlas and its material unless a text object uses it
    pub fn unregister_font(&mut self, tag: &str, objects: &ObjectStore) -> RenderResult<()> {
        let id = registered(&self.fonts, "font", tag)?;
        if objects.values().any(|o| o.text().is_some_and(|t| t.font() == id)) {
            return Err(in_use("font", tag));
        }
        if let Some(entry) = self.fonts.remove(id) {
            self.materials.remove(entry.material);
            self.textures.remove(entry.atlas);
            self.backend.release_texture(entry.atlas);
        }
        Ok(())
    }

    /// Remove a render layer binding
    pub fn unregister_render_layer(&mut self, tag: &str) {
        self.layers.unregister_layer(tag);
    }

    /// Remove a sprite sheet unless an animator still plays it
    pub fn unregister_sprite_sheet(&mut self, tag: &str, objects: &ObjectStore) -> RenderResult<()> {
        let id = registered(&self.sprite_sheets, "sprite sheet", tag)?;
        if id == self.engine.sprite_sheet || objects.values().any(|o| o.animator().is_some_and(|a| a.sheet() == id)) {
            return Err(in_use("sprite sheet", tag));
        }
        self.sprite_sheets.remove(id);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------------

    /// Shader tagged `tag`, or the default shader
    pub fn shader_by_tag(&self, tag: &str) -> ShaderId {
        fallback(&self.shaders, "shader", tag, self.engine.shader)
    }

    /// Texture tagged `tag`, or the error texture
    pub fn texture_by_tag(&self, tag: &str) -> TextureId {
        fallback(&self.textures, "texture", tag, self.engine.error_texture)
    }

    /// Mesh tagged `tag`, or the default quad
    pub fn mesh_by_tag(&self, tag: &str) -> MeshId {
        fallback(&self.meshes, "mesh", tag, self.engine.mesh)
    }

    /// Material tagged `tag`, or the error material
    pub fn material_by_tag(&self, tag: &str) -> MaterialId {
        fallback(&self.materials, "material", tag, self.engine.error_material)
    }

    /// Sprite sheet tagged `tag`, or the default sheet
    pub fn sprite_sheet_by_tag(&self, tag: &str) -> SpriteSheetId {
        fallback(&self.sprite_sheets, "sprite sheet", tag, self.engine.sprite_sheet)
    }

    /// Font tagged `tag`. There is no fallback font.
    pub fn font_by_tag(&self, tag: &str) -> Option<FontId> {
        let id = self.fonts.key_of(tag);
        if id.is_none() {
            log::error!("There is no font named '{tag}'");
        }
        id
    }

    /// Shader by handle
    pub fn shader(&self, id: ShaderId) -> Option<&Shader> {
        self.shaders.get(id)
    }

    /// Texture by handle
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    /// Mesh by handle
    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id)
    }

    /// Material by handle
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Mutable material by handle, e.g. to toggle instancing
    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Font by handle
    pub fn font(&self, id: FontId) -> Option<&dyn Font> {
        self.fonts.get(id).map(|entry| entry.font.as_ref())
    }

    /// Text material created for a font
    pub fn font_material(&self, id: FontId) -> Option<MaterialId> {
        self.fonts.get(id).map(|entry| entry.material)
    }

    /// Sprite sheet by handle
    pub fn sprite_sheet(&self, id: SpriteSheetId) -> Option<&SpriteSheet> {
        self.sprite_sheets.get(id)
    }

    /// Mutable sprite sheet by handle, e.g. to add clips
    pub fn sprite_sheet_mut(&mut self, id: SpriteSheetId) -> Option<&mut SpriteSheet> {
        self.sprite_sheets.get_mut(id)
    }

    /// Render layer table
    pub fn layers(&self) -> &RenderLayerManager {
        &self.layers
    }

    /// Backend, for downcasting through `as_any`
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Counters from the last flush
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Batches queued on `layer` since the last flush
    pub fn render_map(&self, layer: usize) -> Option<&ShaderMap> {
        self.render_map.get(layer)
    }

    // ---------------------------------------------------------------------
    // Submission
    // ---------------------------------------------------------------------

    /// Cull `candidates` against `camera` and queue the visible ones.
    ///
    /// Without a camera nothing is culled: every alive, visible candidate
    /// is queued for window-space drawing.
    pub fn submit(&mut self, objects: &ObjectStore, candidates: &[ObjectId], camera: Option<&Camera2D>) {
        let mut visible = std::mem::take(&mut self.visible);
        match camera {
            Some(camera) => {
                FrustumCuller::cull_visible(camera, objects, candidates, &mut visible, camera.screen_size());
            }
            None => {
                visible.clear();
                visible.extend(
                    candidates
                        .iter()
                        .copied()
                        .filter(|id| objects.get(*id).is_some_and(|o| o.is_alive() && o.is_visible())),
                );
            }
        }
        self.build_render_map(objects, &visible, camera.copied());
        self.visible = visible;
    }

    /// File `visible` objects under `layer -> shader -> batch key`.
    ///
    /// Objects missing a mesh, material or shader are skipped.
    pub fn build_render_map(&mut self, objects: &ObjectStore, visible: &[ObjectId], camera: Option<Camera2D>) {
        for &id in visible {
            let Some(object) = objects.get(id) else { continue };
            if !object.is_visible() {
                continue;
            }
            let (Some(mesh), Some(material_id)) = (object.mesh(), object.material()) else {
                continue;
            };
            let Some(shader) = self.materials.get(material_id).map(Material::shader) else {
                continue;
            };
            if self.shaders.get(shader).is_none() {
                continue;
            }
            let Some(layer) = self.resolve_layer(object.render_layer()) else {
                continue;
            };

            let key = InstanceBatchKey::new(mesh, material_id, object.animator().map(SpriteAnimator::sheet));
            self.render_map[layer]
                .entry(shader)
                .or_default()
                .entry(key)
                .or_default()
                .push(BatchEntry { object: id, camera });
        }
    }

    fn resolve_layer(&self, tag: &str) -> Option<usize> {
        let id = match self.layers.layer_id(tag) {
            Some(id) => id,
            None if tag.is_empty() => 0,
            None => {
                log::warn!("Render layer '{tag}' is not registered, drawing on layer 0");
                0
            }
        };
        let index = usize::from(id);
        if index >= MAX_LAYERS {
            log::warn!("Render skipped - invalid layer {id}");
            return None;
        }
        Some(index)
    }

    // ---------------------------------------------------------------------
    // Flush
    // ---------------------------------------------------------------------

    /// Issue every queued batch, then clear the render map.
    ///
    /// `objects` must be the store the batches were submitted from; draw
    /// hooks run on it. `window_size` sizes the projection of batches
    /// submitted without a camera.
    pub fn flush_draw_commands(&mut self, objects: &mut ObjectStore, window_size: Vec2) {
        self.stats = RenderStats::default();
        let mut render_map = std::mem::take(&mut self.render_map);
        let mut last_material = None;

        for shader_map in &render_map {
            for batches in shader_map.values() {
                for (key, batch) in batches {
                    let Some(first) = batch.first() else { continue };
                    let instanced = objects.get(first.object).is_some_and(|o| o.can_be_instanced(self));
                    if instanced {
                        self.draw_instanced(objects, key, batch, &mut last_material, window_size);
                    } else {
                        self.draw_each(objects, key, batch, &mut last_material, window_size);
                    }
                }
            }
        }

        if last_material.is_some() {
            self.unbind_material();
        }
        for shader_map in &mut render_map {
            shader_map.clear();
        }
        self.render_map = render_map;
    }

    fn resolve_material(&self, id: MaterialId) -> MaterialId {
        if self.materials.get(id).is_some() {
            id
        } else {
            self.engine.error_material
        }
    }

    fn bind_material(&mut self, material: MaterialId, last: &mut Option<MaterialId>) {
        if *last == Some(material) {
            return;
        }
        if last.is_some() {
            self.unbind_material();
        }
        if let Some(shader) = self.materials.get(material).map(Material::shader) {
            self.backend.use_shader(shader);
        }
        self.stats.material_binds += 1;
        *last = Some(material);
    }

    fn unbind_material(&mut self) {
        for unit in 0..self.bound_texture_units {
            self.backend.unbind_texture(unit);
        }
        self.bound_texture_units = 0;
        self.backend.unuse_shader();
    }

    /// Camera matrices plus the error texture for untextured materials
    fn frame_uniforms(&self, material: MaterialId, camera: Option<&Camera2D>, ignore_camera: bool, window_size: Vec2) -> UniformSet {
        let (view, projection) = view_projection(camera, ignore_camera, window_size);
        let mut uniforms = UniformSet::new();
        uniforms.set("u_View", view);
        uniforms.set("u_Projection", projection);
        if !self.materials.get(material).is_some_and(Material::has_texture) {
            uniforms.set_texture("u_Texture", self.engine.error_texture);
        }
        uniforms
    }

    /// UV offset, UV scale and sheet texture of an animator's current frame
    fn frame_uv(&self, animator: Option<&SpriteAnimator>) -> (Vec2, Vec2, Option<TextureId>) {
        animator
            .and_then(|a| {
                let sheet = self.sprite_sheets.get(a.sheet())?;
                Some((sheet.uv_offset(a.current_frame()), sheet.uv_scale(), Some(sheet.texture())))
            })
            .unwrap_or((Vec2::zeros(), Vec2::new(1.0, 1.0), None))
    }

    fn run_draw_hook(objects: &mut ObjectStore, id: ObjectId, uniforms: &mut UniformSet) {
        let Some(object) = objects.get_mut(id) else { return };
        if let Some(mut behavior) = object.take_behavior() {
            behavior.draw(object, uniforms);
            object.restore_behavior(behavior);
        }
    }

    fn send_uniforms(&mut self, material: MaterialId, overrides: &UniformSet) {
        let Some(material) = self.materials.get(material) else { return };
        let shader = material.shader();
        let merged = material.uniforms().merged_with(overrides);

        let mut unit = 0_u32;
        for (sampler, texture) in merged.textures() {
            self.backend.bind_texture(unit, texture);
            self.backend
                .set_uniform(shader, sampler, UniformValue::Int(i32::try_from(unit).unwrap_or(i32::MAX)));
            unit += 1;
        }
        self.bound_texture_units = self.bound_texture_units.max(unit);

        for (name, value) in merged.values() {
            self.backend.set_uniform(shader, name, *value);
        }
    }

    fn draw_instanced(
        &mut self,
        objects: &mut ObjectStore,
        key: &InstanceBatchKey,
        batch: &[BatchEntry],
        last_material: &mut Option<MaterialId>,
        window_size: Vec2,
    ) {
        let instances: Vec<InstanceData> = batch
            .iter()
            .filter_map(|entry| objects.get(entry.object))
            .map(|object| {
                let (uv_offset, uv_scale, _) = self.frame_uv(object.animator());
                InstanceData::new(&model_matrix(object), object.color(), uv_offset, uv_scale)
            })
            .collect();

        let first = batch[0];
        let Some(representative) = objects.get(first.object) else { return };
        let material = self.resolve_material(key.material);
        let mut uniforms =
            self.frame_uniforms(material, first.camera.as_ref(), representative.ignores_camera(), window_size);
        if let (_, _, Some(texture)) = self.frame_uv(representative.animator()) {
            uniforms.set_texture("u_Texture", texture);
        }

        self.bind_material(material, last_material);
        Self::run_draw_hook(objects, first.object, &mut uniforms);
        self.send_uniforms(material, &uniforms);

        let count = instances.len() as u32;
        let drawn = self
            .backend
            .upload_instances(key.mesh, &instances)
            .and_then(|()| self.backend.draw_mesh_instanced(key.mesh, count));
        match drawn {
            Ok(()) => {
                self.stats.instanced_draw_calls += 1;
                self.stats.instances += count;
            }
            Err(err) => log::error!("Instanced draw of {count} objects failed: {err}"),
        }
    }

    fn draw_each(
        &mut self,
        objects: &mut ObjectStore,
        key: &InstanceBatchKey,
        batch: &[BatchEntry],
        last_material: &mut Option<MaterialId>,
        window_size: Vec2,
    ) {
        for entry in batch {
            let Some(object) = objects.get(entry.object) else { continue };
            let material = self.resolve_material(key.material);
            let mut uniforms =
                self.frame_uniforms(material, entry.camera.as_ref(), object.ignores_camera(), window_size);
            uniforms.set("u_Model", model_matrix(object));
            uniforms.set("u_Color", object.color());
            let (uv_offset, uv_scale, texture) = self.frame_uv(object.animator());
            uniforms.set("u_UVOffset", uv_offset);
            uniforms.set("u_UVScale", uv_scale);
            if let Some(texture) = texture {
                uniforms.set_texture("u_Texture", texture);
            }

            self.bind_material(material, last_material);
            Self::run_draw_hook(objects, entry.object, &mut uniforms);
            self.send_uniforms(material, &uniforms);

            match self.backend.draw_mesh(key.mesh) {
                Ok(()) => self.stats.draw_calls += 1,
                Err(err) => log::error!("Draw of object {:?} failed: {err}", entry.object),
            }
        }
    }

    // ---------------------------------------------------------------------
    // Debug lines
    // ---------------------------------------------------------------------

    /// Queue a debug line for this frame
    pub fn draw_debug_line(&mut self, from: Vec2, to: Vec2, camera: Option<&Camera2D>, color: Vec4, line_width: f32) {
        self.debug_lines.push(from, to, camera, color, line_width);
    }

    /// Draw queued debug lines, one call per camera and width, then clear
    /// the queue
    pub fn flush_debug_line_draw_commands(&mut self, window_size: Vec2) {
        if self.debug_lines.is_empty() {
            return;
        }
        let shader = self.engine.debug_line_shader;
        let projection = utils::centered_ortho(window_size.x, window_size.y);
        self.backend.use_shader(shader);

        for group in self.debug_lines.drain() {
            self.backend.set_line_width(group.width);
            let view = group.camera.as_ref().map_or_else(Mat4::identity, Camera2D::view_matrix);
            self.backend.set_uniform(shader, "u_View", UniformValue::Mat4(view));
            self.backend.set_uniform(shader, "u_Projection", UniformValue::Mat4(projection));
            match self.backend.draw_lines(&group.vertices) {
                Ok(()) => self.stats.debug_line_draws += 1,
                Err(err) => log::error!("Debug line draw failed: {err}"),
            }
        }

        self.backend.set_line_width(1.0);
        self.backend.unuse_shader();
    }

    // ---------------------------------------------------------------------
    // Text and screen helpers
    // ---------------------------------------------------------------------

    /// Lay out `text` with `font` and upload the result as an untagged mesh
    pub fn create_text_mesh(
        &mut self,
        font: FontId,
        text: &str,
        align_h: TextAlignH,
        align_v: TextAlignV,
    ) -> RenderResult<MeshId> {
        let entry = self
            .fonts
            .get(font)
            .ok_or_else(|| RenderError::NotFound { kind: "font", tag: format!("{font:?}") })?;
        let mesh = entry.font.generate_text_mesh(text, align_h, align_v);
        let id = self.meshes.insert(mesh);
        self.upload_mesh(id)?;
        Ok(id)
    }

    /// Release an untagged mesh created by [`create_text_mesh`](Self::create_text_mesh).
    /// Registered meshes are left alone.
    pub fn release_mesh(&mut self, id: MeshId) {
        if let Some(tag) = self.meshes.tag_of(id) {
            log::warn!("Refusing to release registered mesh [{tag}]; unregister it instead");
            return;
        }
        if self.meshes.remove(id).is_some() {
            self.backend.release_mesh(id);
        }
    }

    /// Set the backend viewport
    pub fn set_viewport(&mut self, rect: Rect) {
        self.backend.set_viewport(rect);
    }

    /// Clear only `rect` to `color`
    pub fn clear_background(&mut self, rect: Rect, color: Vec4) {
        self.backend.clear_rect(rect, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::{DrawCommand, RecordingBackend};
    use crate::render::resources::font::tests::test_font;
    use crate::scene::Behavior;

    const INSTANCED_VERTEX: &str = "#version 460 core\nlayout (location = 2) in mat4 i_Model;\nvoid main() {}";

    fn manager() -> RenderManager {
        RenderManager::new(Box::new(RecordingBackend::new())).unwrap()
    }

    fn recorder(render: &RenderManager) -> &RecordingBackend {
        render.backend().as_any().downcast_ref::<RecordingBackend>().unwrap()
    }

    fn quad(render: &RenderManager, objects: &mut ObjectStore, material: &str, layer: &str, x: f32) -> ObjectId {
        let mut object = Object::new();
        object.set_mesh(render, engine_tags::DEFAULT_MESH);
        object.set_material(render, material);
        object.set_render_layer(layer);
        object.transform_mut().set_position(Vec2::new(x, 0.0));
        objects.insert(object)
    }

    fn add_flat_material(render: &mut RenderManager, tag: &str, instanced: bool) -> MaterialId {
        let shader = if instanced {
            if !render.shaders.contains_tag("instanced") {
                render
                    .register_shader("instanced", Shader::from_sources(INSTANCED_VERTEX, glsl::DEFAULT_FRAGMENT))
                    .unwrap();
            }
            "instanced"
        } else {
            engine_tags::DEFAULT_SHADER
        };
        let id = render.register_material(tag, shader, &[]).unwrap();
        if instanced {
            assert!(render.material_mut(id).unwrap().enable_instancing(true));
        }
        id
    }

    #[test]
    fn test_engine_resources_exist_after_init() {
        let render = manager();
        for tag in [
            engine_tags::DEFAULT_SHADER,
            engine_tags::DEFAULT_TEXTURE_SHADER,
            engine_tags::TEXT_SHADER,
            engine_tags::DEBUG_LINE_SHADER,
        ] {
            assert!(render.shaders.contains_tag(tag), "missing {tag}");
        }
        let error = render.texture(render.texture_by_tag(engine_tags::ERROR_TEXTURE)).unwrap();
        assert_eq!((error.width(), error.height()), (8, 8));
        assert!(render.materials.contains_tag(engine_tags::ERROR_MATERIAL));
        assert!(render.meshes.contains_tag(engine_tags::DEFAULT_MESH));
        assert!(render.sprite_sheets.contains_tag(engine_tags::DEFAULT_SPRITE_SHEET));
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut render = manager();
        let first = render.register_mesh("quad", Mesh::unit_quad()).unwrap();
        let small = Mesh::new(Vec::new(), Vec::new(), crate::render::resources::PrimitiveType::Points);

        let err = render.register_mesh("quad", small).unwrap_err();
        assert!(matches!(err, RenderError::DuplicateTag { kind: "mesh", .. }));
        assert_eq!(render.mesh_by_tag("quad"), first);
        assert_eq!(render.mesh(first).unwrap().element_count(), 6);

        let material = render.register_material("flat", engine_tags::DEFAULT_SHADER, &[]).unwrap();
        assert!(render.register_material("flat", engine_tags::TEXT_SHADER, &[]).is_err());
        assert_eq!(render.material(material).unwrap().shader(), render.shader_by_tag(engine_tags::DEFAULT_SHADER));
    }

    #[test]
    fn test_unknown_tags_fall_back() {
        let render = manager();
        assert_eq!(render.shader_by_tag("nope"), render.engine.shader);
        assert_eq!(render.texture_by_tag("nope"), render.engine.error_texture);
        assert_eq!(render.mesh_by_tag("nope"), render.engine.mesh);
        assert_eq!(render.material_by_tag("nope"), render.engine.error_material);
        assert_eq!(render.sprite_sheet_by_tag("nope"), render.engine.sprite_sheet);
        assert_eq!(render.font_by_tag("nope"), None);
    }

    #[test]
    fn test_material_with_missing_shader_is_rejected() {
        let mut render = manager();
        let err = render.register_material("m", "no-such-shader", &[]).unwrap_err();
        assert!(matches!(err, RenderError::NotFound { kind: "shader", .. }));
        assert!(!render.materials.contains_tag("m"));
    }

    #[test]
    fn test_font_pixel_size_is_validated() {
        let mut render = manager();
        assert!(matches!(
            render.register_font("tiny", Box::new(test_font(2))),
            Err(RenderError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            render.register_font("huge", Box::new(test_font(65))),
            Err(RenderError::InvalidConfiguration(_))
        ));
        let font = render.register_font("ok", Box::new(test_font(16))).unwrap();
        assert!(render.font_material(font).is_some());
        assert!(render.register_font("ok", Box::new(test_font(16))).is_err());
    }

    #[test]
    fn test_unregister_refuses_resources_in_use() {
        let mut render = manager();
        render.register_mesh("quad", Mesh::unit_quad()).unwrap();
        add_flat_material(&mut render, "flat", false);

        let mut objects = ObjectStore::with_key();
        let mut object = Object::new();
        object.set_mesh(&render, "quad");
        object.set_material(&render, "flat");
        let id = objects.insert(object);

        assert!(matches!(render.unregister_mesh("quad", &objects), Err(RenderError::ResourceInUse { .. })));
        assert!(matches!(render.unregister_material("flat", &objects), Err(RenderError::ResourceInUse { .. })));
        assert!(matches!(
            render.unregister_shader(engine_tags::DEFAULT_SHADER, &objects),
            Err(RenderError::ResourceInUse { .. })
        ));
        assert!(matches!(render.unregister_mesh("missing", &objects), Err(RenderError::NotFound { .. })));

        objects.remove(id);
        render.unregister_mesh("quad", &objects).unwrap();
        render.unregister_material("flat", &objects).unwrap();
        assert_eq!(render.mesh_by_tag("quad"), render.engine.mesh);
    }

    #[test]
    fn test_identical_identity_shares_one_batch_in_submission_order() {
        let mut render = manager();
        add_flat_material(&mut render, "a", false);
        add_flat_material(&mut render, "b", false);

        let mut objects = ObjectStore::with_key();
        let first = quad(&render, &mut objects, "a", "", 0.0);
        let other = quad(&render, &mut objects, "b", "", 10.0);
        let second = quad(&render, &mut objects, "a", "", 20.0);

        let ids = [first, other, second];
        render.submit(&objects, &ids, Some(&Camera2D::new(800, 600)));

        let layer = render.render_map(0).unwrap();
        assert_eq!(layer.len(), 1);
        let batches = layer.values().next().unwrap();
        assert_eq!(batches.len(), 2);
        let key_a = InstanceBatchKey::new(render.engine.mesh, render.material_by_tag("a"), None);
        let order: Vec<ObjectId> = batches[&key_a].iter().map(|e| e.object).collect();
        assert_eq!(order, vec![first, second]);
    }

    #[test]
    fn test_layers_draw_in_ascending_order() {
        let mut render = manager();
        render.register_render_layer("Background", 0).unwrap();
        render.register_render_layer("Foreground", 1).unwrap();
        render.register_mesh("front", Mesh::unit_quad()).unwrap();
        add_flat_material(&mut render, "flat", false);

        let mut objects = ObjectStore::with_key();
        let front = quad(&render, &mut objects, "flat", "Foreground", 0.0);
        objects[front].set_mesh(&render, "front");
        let back = quad(&render, &mut objects, "flat", "Background", 0.0);

        render.submit(&objects, &[front, back], Some(&Camera2D::new(800, 600)));
        render.flush_draw_commands(&mut objects, Vec2::new(800.0, 600.0));

        let drawn = recorder(&render).drawn_meshes();
        assert_eq!(drawn, vec![render.engine.mesh, render.mesh_by_tag("front")]);
        assert!(render.render_map(0).unwrap().is_empty());
        assert!(render.render_map(1).unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_layer_draws_on_layer_zero() {
        let mut render = manager();
        render.register_render_layer("Background", 0).unwrap();
        render.register_render_layer("Foreground", 1).unwrap();
        add_flat_material(&mut render, "flat", false);

        let mut objects = ObjectStore::with_key();
        let stray = quad(&render, &mut objects, "flat", "Nowhere", 0.0);

        render.submit(&objects, &[stray], Some(&Camera2D::new(800, 600)));
        let entries: Vec<ObjectId> = render
            .render_map(0)
            .unwrap()
            .values()
            .flat_map(|batches| batches.values().flatten().map(|entry| entry.object))
            .collect();
        assert_eq!(entries, vec![stray]);
        assert!(render.render_map(1).unwrap().is_empty());
    }

    #[test]
    fn test_instanced_batch_issues_single_draw() {
        let mut render = manager();
        add_flat_material(&mut render, "inst", true);

        let mut objects = ObjectStore::with_key();
        let ids: Vec<ObjectId> = (0..5).map(|i| quad(&render, &mut objects, "inst", "", i as f32 * 10.0)).collect();
        objects[ids[1]].set_flip_uv(true, false);

        render.submit(&objects, &ids, Some(&Camera2D::new(800, 600)));
        render.flush_draw_commands(&mut objects, Vec2::new(800.0, 600.0));

        let backend = recorder(&render);
        assert_eq!(backend.instanced_draw_count(), 1);
        assert_eq!(backend.draw_count(), 0);
        let uploaded = backend
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::UploadInstances { instances, .. } => Some(instances.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(uploaded.len(), 5);
        assert_eq!(uploaded[1].model[0][0], -1.0);
        assert_eq!(uploaded[1].model[3][0], 10.0);
        assert_eq!(uploaded[0].uv_scale, [1.0, 1.0]);
        assert_eq!(render.stats().instances, 5);
    }

    #[test]
    fn test_instancing_disabled_never_draws_instanced() {
        let mut render = manager();
        let material = add_flat_material(&mut render, "inst", true);
        render.material_mut(material).unwrap().enable_instancing(false);

        let mut objects = ObjectStore::with_key();
        let ids: Vec<ObjectId> = (0..64).map(|i| quad(&render, &mut objects, "inst", "", (i % 8) as f32)).collect();

        render.submit(&objects, &ids, Some(&Camera2D::new(800, 600)));
        render.flush_draw_commands(&mut objects, Vec2::new(800.0, 600.0));

        let backend = recorder(&render);
        assert_eq!(backend.instanced_draw_count(), 0);
        assert_eq!(backend.draw_count(), 64);
        assert_eq!(render.stats().material_binds, 1);
    }

    #[test]
    fn test_per_object_uniforms_and_error_texture() {
        let mut render = manager();
        add_flat_material(&mut render, "flat", false);

        let mut objects = ObjectStore::with_key();
        let id = quad(&render, &mut objects, "flat", "", 0.0);
        objects[id].set_color(Vec4::new(1.0, 0.0, 0.0, 1.0));
        objects[id].set_ignore_camera(true, None);

        let mut camera = Camera2D::new(800, 600);
        camera.set_position(Vec2::new(50.0, 0.0));
        render.submit(&objects, &[id], Some(&camera));
        render.flush_draw_commands(&mut objects, Vec2::new(800.0, 600.0));

        let backend = recorder(&render);
        assert_eq!(backend.last_uniform("u_Color"), Some(UniformValue::Vec4(Vec4::new(1.0, 0.0, 0.0, 1.0))));
        assert_eq!(backend.last_uniform("u_View"), Some(UniformValue::Mat4(Mat4::identity())));
        assert_eq!(backend.last_uniform("u_UVScale"), Some(UniformValue::Vec2(Vec2::new(1.0, 1.0))));
        assert!(backend
            .commands()
            .contains(&DrawCommand::BindTexture { unit: 0, texture: render.engine.error_texture }));
        assert!(!render.material(render.material_by_tag("flat")).unwrap().has_texture());
    }

    #[test]
    fn test_draw_hook_stages_uniforms() {
        struct Pulse;
        impl Behavior for Pulse {
            fn draw(&mut self, _object: &Object, uniforms: &mut UniformSet) {
                uniforms.set("u_Time", 2.5_f32);
            }
        }

        let mut render = manager();
        add_flat_material(&mut render, "flat", false);
        let mut objects = ObjectStore::with_key();
        let id = quad(&render, &mut objects, "flat", "", 0.0);
        objects[id].set_behavior(Box::new(Pulse));

        render.submit(&objects, &[id], None);
        render.flush_draw_commands(&mut objects, Vec2::new(640.0, 480.0));

        let backend = recorder(&render);
        assert_eq!(backend.last_uniform("u_Time"), Some(UniformValue::Float(2.5)));
        assert_eq!(
            backend.last_uniform("u_Projection"),
            Some(UniformValue::Mat4(utils::centered_ortho(640.0, 480.0)))
        );
        assert!(objects[id].has_behavior());
        assert!(render.material(render.material_by_tag("flat")).unwrap().uniforms().get("u_Time").is_none());
    }

    #[test]
    fn test_debug_lines_one_draw_per_group() {
        let mut render = manager();
        let camera = Camera2D::new(800, 600);
        let white = Vec4::new(1.0, 1.0, 1.0, 1.0);
        render.draw_debug_line(Vec2::zeros(), Vec2::new(1.0, 0.0), Some(&camera), white, 1.0);
        render.draw_debug_line(Vec2::zeros(), Vec2::new(0.0, 1.0), Some(&camera), white, 1.0);
        render.draw_debug_line(Vec2::zeros(), Vec2::new(0.0, 1.0), None, white, 3.0);
        render.flush_debug_line_draw_commands(Vec2::new(800.0, 600.0));

        let backend = recorder(&render);
        let line_draws: Vec<usize> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawLines(vertices) => Some(vertices.len()),
                _ => None,
            })
            .collect();
        assert_eq!(line_draws, vec![4, 2]);
        assert_eq!(backend.commands().iter().rev().nth(1), Some(&DrawCommand::LineWidth(1.0)));
        assert_eq!(render.stats().debug_line_draws, 2);

        let recorded = backend.commands().len();
        render.flush_debug_line_draw_commands(Vec2::new(800.0, 600.0));
        assert_eq!(recorder(&render).commands().len(), recorded);
    }

    #[test]
    fn test_text_mesh_lifecycle() {
        let mut render = manager();
        let font = render.register_font("mono", Box::new(test_font(16))).unwrap();
        let mesh = render.create_text_mesh(font, "AA", TextAlignH::Left, TextAlignV::Top).unwrap();
        assert_eq!(render.mesh(mesh).unwrap().element_count(), 12);
        assert!(recorder(&render).has_mesh(mesh));

        render.release_mesh(mesh);
        assert!(render.mesh(mesh).is_none());

        let quad = render.mesh_by_tag(engine_tags::DEFAULT_MESH);
        render.release_mesh(quad);
        assert!(render.mesh(quad).is_some());
    }
}
