//! Spatial partitioning data structures
//!
//! Broad-phase indexing for 2D collision detection.

mod spatial_hash;

pub use spatial_hash::{CellCoord, SpatialHashGrid, DEFAULT_CELL_SIZE};
