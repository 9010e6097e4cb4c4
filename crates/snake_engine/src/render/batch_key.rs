//! Batch identity for grouping draws

use crate::render::resources::{MaterialId, MeshId, SpriteSheetId};

/// Mesh, material and sprite sheet identity shared by one batch.
///
/// Compared and ordered by handle only, never by resource contents, so
/// two materials with identical settings still form separate batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceBatchKey {
    /// Mesh drawn by every member
    pub mesh: MeshId,
    /// Material drawn with
    pub material: MaterialId,
    /// Sprite sheet of the member's animator, if any
    pub sprite_sheet: Option<SpriteSheetId>,
}

impl InstanceBatchKey {
    /// Create a key
    pub const fn new(mesh: MeshId, material: MaterialId, sprite_sheet: Option<SpriteSheetId>) -> Self {
        Self { mesh, material, sprite_sheet }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::collections::BTreeMap;

    #[test]
    fn test_keys_group_by_identity() {
        let mut meshes: SlotMap<MeshId, ()> = SlotMap::with_key();
        let mut materials: SlotMap<MaterialId, ()> = SlotMap::with_key();
        let mesh = meshes.insert(());
        let (mat_a, mat_b) = (materials.insert(()), materials.insert(()));

        let mut groups: BTreeMap<InstanceBatchKey, usize> = BTreeMap::new();
        for key in [
            InstanceBatchKey::new(mesh, mat_a, None),
            InstanceBatchKey::new(mesh, mat_b, None),
            InstanceBatchKey::new(mesh, mat_a, None),
        ] {
            *groups.entry(key).or_default() += 1;
        }
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&InstanceBatchKey::new(mesh, mat_a, None)], 2);
    }
}
