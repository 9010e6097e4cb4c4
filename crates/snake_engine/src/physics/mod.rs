//! Physics module for collision detection
//!
//! Narrow-phase collider shapes and the named collision group registry.
//! There is no collision response; objects are notified and react in their
//! own hooks.

pub mod collider;
pub mod collision_groups;

pub use collider::{Collider, ColliderShape, ColliderType};
pub use collision_groups::CollisionGroupRegistry;
