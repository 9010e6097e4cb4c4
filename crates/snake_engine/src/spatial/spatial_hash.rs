//! Uniform-grid spatial hash for broad-phase collision
//!
//! The grid is rebuilt from scratch every collision pass: [`clear`], then
//! [`insert`] every live collider, then [`compute_collisions`]. A body is
//! bucketed into every cell its bounding circle's box overlaps, and pairs
//! are only tested inside a shared cell. Two bodies that overlap
//! geometrically but share no cell are never reported.
//!
//! [`clear`]: SpatialHashGrid::clear
//! [`insert`]: SpatialHashGrid::insert
//! [`compute_collisions`]: SpatialHashGrid::compute_collisions

use std::collections::HashMap;

use crate::foundation::math::Vec2;
use crate::physics::{collision_groups, Collider};

/// Default cell edge length in world units
pub const DEFAULT_CELL_SIZE: f32 = 50.0;

/// Integer cell coordinate
pub type CellCoord = (i32, i32);

/// Snapshot of one body taken at insertion time
#[derive(Debug, Clone)]
struct GridBody<K> {
    key: K,
    category: u32,
    mask: u32,
    collider: Collider,
}

/// Spatial hash over collider bounding circles
pub struct SpatialHashGrid<K> {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<usize>>,
    bodies: Vec<GridBody<K>>,
}

impl<K: Copy> Default for SpatialHashGrid<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> SpatialHashGrid<K> {
    /// Grid with the default cell size
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE)
    }

    /// Grid with a custom cell size. Non-positive sizes fall back to the default.
    pub fn with_cell_size(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("Invalid spatial hash cell size {cell_size}, using {DEFAULT_CELL_SIZE}");
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            bodies: Vec::new(),
        }
    }

    /// Cell edge length
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Empty every bucket
    pub fn clear(&mut self) {
        self.cells.clear();
        self.bodies.clear();
    }

    /// Cell containing `position`
    pub fn cell_of(&self, position: Vec2) -> CellCoord {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Bucket a collider into every cell overlapped by its bounding circle's box
    pub fn insert(&mut self, key: K, category: u32, mask: u32, collider: &Collider) {
        let position = collider.world_position();
        let radius = Vec2::repeat(collider.bounding_radius());
        let (min_x, min_y) = self.cell_of(position - radius);
        let (max_x, max_y) = self.cell_of(position + radius);

        let index = self.bodies.len();
        self.bodies.push(GridBody {
            key,
            category,
            mask,
            collider: collider.clone(),
        });

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.cells.entry((x, y)).or_default().push(index);
            }
        }
    }

    /// Test every pair sharing a cell and report overlapping ones.
    ///
    /// Pairs are filtered by category/mask before the narrow phase. A pair
    /// spanning several shared cells is reported once per shared cell; the
    /// caller deduplicates.
    pub fn compute_collisions(&self, mut on_collision: impl FnMut(K, K)) {
        for list in self.cells.values() {
            for (i, &a) in list.iter().enumerate() {
                for &b in &list[i + 1..] {
                    let (body_a, body_b) = (&self.bodies[a], &self.bodies[b]);
                    if !collision_groups::is_candidate_pair(
                        body_a.category,
                        body_a.mask,
                        body_b.category,
                        body_b.mask,
                    ) {
                        continue;
                    }
                    if body_a.collider.check_collision(&body_b.collider) {
                        on_collision(body_a.key, body_b.key);
                    }
                }
            }
        }
    }

    /// Number of non-empty cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of inserted bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether nothing has been inserted since the last clear
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Keys bucketed in `cell`, in insertion order
    pub fn keys_in_cell(&self, cell: CellCoord) -> Vec<K> {
        self.cells
            .get(&cell)
            .map(|list| list.iter().map(|&i| self.bodies[i].key).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_at(radius: f32, x: f32, y: f32) -> Collider {
        let mut collider = Collider::circle(radius);
        collider.set_world_position(Vec2::new(x, y));
        collider
    }

    fn pairs(grid: &SpatialHashGrid<u32>) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        grid.compute_collisions(|a, b| out.push((a, b)));
        out
    }

    #[test]
    fn test_cell_of_floors_negative_coordinates() {
        let grid: SpatialHashGrid<u32> = SpatialHashGrid::new();
        assert_eq!(grid.cell_of(Vec2::new(0.0, 0.0)), (0, 0));
        assert_eq!(grid.cell_of(Vec2::new(49.9, 50.0)), (0, 1));
        assert_eq!(grid.cell_of(Vec2::new(-0.1, -50.0)), (-1, -1));
    }

    #[test]
    fn test_point_collider_lands_in_one_cell() {
        let mut grid = SpatialHashGrid::new();
        grid.insert(1u32, 1, 1, &circle_at(0.0, 10.0, 10.0));
        assert_eq!(grid.occupied_cells(), 1);
        assert_eq!(grid.keys_in_cell((0, 0)), vec![1]);
    }

    #[test]
    fn test_collider_spans_overlapped_cells() {
        let mut grid = SpatialHashGrid::new();
        grid.insert(1u32, 1, 1, &circle_at(10.0, 50.0, 50.0));
        assert_eq!(grid.occupied_cells(), 4);
    }

    #[test]
    fn test_overlapping_pair_reported_in_insertion_order() {
        let mut grid = SpatialHashGrid::new();
        grid.insert(7u32, 1, 1, &circle_at(10.0, 20.0, 20.0));
        grid.insert(3u32, 1, 1, &circle_at(10.0, 30.0, 20.0));
        assert_eq!(pairs(&grid), vec![(7, 3)]);
    }

    #[test]
    fn test_pairs_without_shared_cell_never_reported() {
        let mut grid = SpatialHashGrid::with_cell_size(10.0);
        grid.insert(1u32, 1, 1, &circle_at(0.0, 1.0, 1.0));
        grid.insert(2u32, 1, 1, &circle_at(0.0, 25.0, 1.0));
        grid.insert(3u32, 1, 1, &circle_at(2.0, 45.0, 5.0));
        assert!(pairs(&grid).is_empty());
    }

    #[test]
    fn test_mask_filter_rejects_unrelated_groups() {
        let mut grid = SpatialHashGrid::new();
        grid.insert(1u32, 0b01, 0b01, &circle_at(10.0, 20.0, 20.0));
        grid.insert(2u32, 0b10, 0b10, &circle_at(10.0, 25.0, 20.0));
        assert!(pairs(&grid).is_empty());

        grid.clear();
        grid.insert(1u32, 0b01, 0b10, &circle_at(10.0, 20.0, 20.0));
        grid.insert(2u32, 0b10, 0b00, &circle_at(10.0, 25.0, 20.0));
        assert_eq!(pairs(&grid), vec![(1, 2)]);
    }

    #[test]
    fn test_clear_empties_grid() {
        let mut grid = SpatialHashGrid::new();
        grid.insert(1u32, 1, 1, &circle_at(5.0, 0.0, 0.0));
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.occupied_cells(), 0);
    }
}
