//! Named render layers
//!
//! Up to [`MAX_LAYERS`] layers, drawn in ascending id order. Objects name
//! their layer by tag; unknown tags draw on layer 0.

use std::collections::HashMap;

use crate::render::{RenderError, RenderResult};

/// Number of render layer slots
pub const MAX_LAYERS: usize = 16;

/// Bidirectional layer tag <-> id table
#[derive(Debug, Default)]
pub struct RenderLayerManager {
    name_to_id: HashMap<String, u8>,
    id_to_name: [Option<String>; MAX_LAYERS],
}

impl RenderLayerManager {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `tag` to layer `id`.
    ///
    /// Fails without changes if the tag is taken, the id is out of range or
    /// the id is already bound.
    pub fn register_layer(&mut self, tag: &str, id: u8) -> RenderResult<()> {
        if self.name_to_id.contains_key(tag) {
            log::warn!("Layer already exists: {tag}");
            return Err(RenderError::DuplicateTag { kind: "render layer", tag: tag.to_string() });
        }

        let slot = usize::from(id);
        if slot >= MAX_LAYERS || self.id_to_name[slot].is_some() {
            log::error!("Layer id {id} is already in use or out of range");
            return Err(RenderError::InvalidConfiguration(format!(
                "layer id {id} for '{tag}' is in use or not below {MAX_LAYERS}"
            )));
        }

        self.name_to_id.insert(tag.to_string(), id);
        self.id_to_name[slot] = Some(tag.to_string());
        log::debug!("Registered render layer '{tag}' as {id}");
        Ok(())
    }

    /// Remove `tag`; logs and does nothing if it is unknown
    pub fn unregister_layer(&mut self, tag: &str) {
        match self.name_to_id.remove(tag) {
            Some(id) => self.id_to_name[usize::from(id)] = None,
            None => log::info!("Cannot unregister: layer '{tag}' not found"),
        }
    }

    /// Layer id bound to `tag`
    pub fn layer_id(&self, tag: &str) -> Option<u8> {
        self.name_to_id.get(tag).copied()
    }

    /// Tag bound to layer `id`
    pub fn layer_name(&self, id: u8) -> Option<&str> {
        self.id_to_name.get(usize::from(id))?.as_deref()
    }
}
