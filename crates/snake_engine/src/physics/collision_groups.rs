//! Named collision groups
//!
//! Content refers to collision groups by string tag; the registry hands out
//! one bit per tag on first use. Objects carry a category (the bit of their
//! own group) and a mask (the OR of the groups they want to hit).

use std::collections::HashMap;

/// Hard ceiling on distinct groups, one per bit of a `u32`
pub const MAX_COLLISION_GROUPS: u32 = 32;

/// Bidirectional tag <-> bit allocator
#[derive(Debug, Default)]
pub struct CollisionGroupRegistry {
    tag_to_bit: HashMap<String, u32>,
    bit_to_tag: HashMap<u32, String>,
    next_bit: u32,
}

impl CollisionGroupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bit for `tag`, allocating the next free one on first use.
    ///
    /// Once all 32 bits are taken, unknown tags get `0` and an error is
    /// logged; existing assignments never change.
    pub fn group_bit(&mut self, tag: &str) -> u32 {
        if let Some(&bit) = self.tag_to_bit.get(tag) {
            return bit;
        }

        if self.next_bit >= MAX_COLLISION_GROUPS {
            log::error!("Exceeded maximum number of collision groups, '{tag}' gets no bit");
            return 0;
        }

        let bit = 1u32 << self.next_bit;
        self.tag_to_bit.insert(tag.to_string(), bit);
        self.bit_to_tag.insert(bit, tag.to_string());
        self.next_bit += 1;
        log::debug!("Collision group '{tag}' assigned bit {bit:#x}");
        bit
    }

    /// Tag that owns `bit`
    pub fn group_tag(&self, bit: u32) -> Option<&str> {
        self.bit_to_tag.get(&bit).map(String::as_str)
    }

    /// OR of the bits of every tag in `tags`
    pub fn mask_of<S: AsRef<str>>(&mut self, tags: &[S]) -> u32 {
        tags.iter().fold(0, |mask, tag| mask | self.group_bit(tag.as_ref()))
    }

    /// Number of allocated groups
    pub fn len(&self) -> usize {
        self.tag_to_bit.len()
    }

    /// Whether no group has been allocated yet
    pub fn is_empty(&self) -> bool {
        self.tag_to_bit.is_empty()
    }
}

/// Broad candidate filter: either side's mask targets the other's category
pub fn is_candidate_pair(category_a: u32, mask_a: u32, category_b: u32, mask_b: u32) -> bool {
    (category_a & mask_b) != 0 || (category_b & mask_a) != 0
}

/// Whether an object with `mask` wants to be told about `other_category`
pub fn wants_notification(mask: u32, other_category: u32) -> bool {
    (mask & other_category) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_tag_same_bit() {
        let mut registry = CollisionGroupRegistry::new();
        let first = registry.group_bit("enemy");
        let second = registry.group_bit("enemy");
        assert_eq!(first, second);
        assert_eq!(first, 1);
        assert_eq!(registry.group_bit("player"), 2);
        assert_eq!(registry.group_tag(1), Some("enemy"));
        assert_eq!(registry.group_tag(8), None);
    }

    #[test]
    fn test_exhaustion_returns_zero() {
        let mut registry = CollisionGroupRegistry::new();
        for i in 0..MAX_COLLISION_GROUPS {
            assert_eq!(registry.group_bit(&format!("group{i}")), 1 << i);
        }
        assert_eq!(registry.group_bit("one_too_many"), 0);
        assert_eq!(registry.group_bit("group31"), 1 << 31);
        assert_eq!(registry.len(), 32);
    }

    #[test]
    fn test_mask_of_tags() {
        let mut registry = CollisionGroupRegistry::new();
        let mask = registry.mask_of(&["a", "b", "a"]);
        assert_eq!(mask, 0b11);
    }

    #[test]
    fn test_candidate_filter() {
        // Bullet (cat 1) targets enemy (cat 2); enemy targets nothing.
        assert!(is_candidate_pair(1, 2, 2, 0));
        assert!(wants_notification(2, 2));
        assert!(!wants_notification(0, 1));
        // Neither side targets the other.
        assert!(!is_candidate_pair(1, 1, 2, 2));
    }
}
