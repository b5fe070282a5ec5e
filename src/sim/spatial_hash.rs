//! Uniform-grid broad-phase over integer rectangles
//!
//! Purely a candidate-shortlisting structure: retrieval returns a superset
//! of true overlaps from the touched buckets and the caller re-tests exact
//! intersection. Both simulation hashes are transient scratch, fully
//! rebuilt every tick.

use std::collections::HashSet;

use crate::sim::components::IntRect;
use crate::world::Entity;

/// Bounded uniform grid mapping rectangles onto buckets.
///
/// Rectangles outside the extent are still insertable; their cell
/// coordinates clamp to the edge buckets. There are no failure modes: an
/// empty bucket yields an empty shortlist.
pub struct SpatialHash {
    origin_x: i32,
    origin_y: i32,
    cols: i32,
    rows: i32,
    cell_size: i32,
    buckets: Vec<Vec<(Entity, IntRect)>>,
}

impl SpatialHash {
    /// Grid covering `width` x `height` world units from the given origin.
    pub fn new(origin_x: i32, origin_y: i32, width: i32, height: i32, cell_size: i32) -> Self {
        let cols = (width / cell_size).max(1);
        let rows = (height / cell_size).max(1);
        Self {
            origin_x,
            origin_y,
            cols,
            rows,
            cell_size,
            buckets: vec![Vec::new(); (cols * rows) as usize],
        }
    }

    /// Empties all buckets. Called once per tick per hash.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Cell coordinates of a world point, clamped into the grid.
    fn cell_of(&self, x: i32, y: i32) -> (i32, i32) {
        let cx = (x - self.origin_x).div_euclid(self.cell_size).clamp(0, self.cols - 1);
        let cy = (y - self.origin_y).div_euclid(self.cell_size).clamp(0, self.rows - 1);
        (cx, cy)
    }

    /// Inclusive cell range a rect touches.
    fn cell_range(&self, rect: &IntRect) -> (i32, i32, i32, i32) {
        let (min_x, min_y) = self.cell_of(rect.x, rect.y);
        let (max_x, max_y) = self.cell_of(rect.x + rect.w, rect.y + rect.h);
        (min_x, min_y, max_x, max_y)
    }

    /// Adds the entity to every bucket its rect touches. An entity may be
    /// inserted more than once per tick (pre- and post-movement); queries
    /// re-validate exact intersection, so the duplicate entry is harmless.
    pub fn insert(&mut self, entity: Entity, rect: IntRect) {
        let (min_x, min_y, max_x, max_y) = self.cell_range(&rect);
        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                self.buckets[(cy * self.cols + cx) as usize].push((entity, rect));
            }
        }
    }

    /// Superset of true overlaps from the touched buckets, deduplicated by
    /// entity in first-encounter order.
    pub fn retrieve(&self, rect: IntRect) -> Vec<(Entity, IntRect)> {
        self.collect(rect, None)
    }

    /// Same as [`retrieve`](Self::retrieve), skipping one entity so a
    /// mover never shortlists its own entry during a sweep.
    pub fn retrieve_excluding(&self, exclude: Entity, rect: IntRect) -> Vec<(Entity, IntRect)> {
        self.collect(rect, Some(exclude))
    }

    fn collect(&self, rect: IntRect, exclude: Option<Entity>) -> Vec<(Entity, IntRect)> {
        let (min_x, min_y, max_x, max_y) = self.cell_range(&rect);
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                for &(entity, entity_rect) in &self.buckets[(cy * self.cols + cx) as usize] {
                    if Some(entity) == exclude {
                        continue;
                    }
                    if seen.insert(entity) {
                        results.push((entity, entity_rect));
                    }
                }
            }
        }
        results
    }
}
