use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use std::collections::BTreeSet;
use crate::game::frustum::Frustum;
use crate::game::lod::{DetailLevel, LodThresholds};
use crate::game::solid_object::ObjectId;

pub mod collision;
mod grid;
mod visibility;
#[cfg(test)]
mod tests;

pub use collision::{CellCollisionReport, CollisionPair, PairResponse};
pub use visibility::UpdateOptions;

/// One bucket of the partition.
///
/// Holds handles only. The [`SolidObjectManager`](crate::game::solid_object::SolidObjectManager)
/// owns the objects, and the bucket contents are rebuilt every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialCell {
    pub bottom_left: Vec3,
    pub top_right: Vec3,
    /// Terrain height at (bottom_left.x, top_right.z).
    pub top_left_height: f32,
    /// Terrain height at (top_right.x, bottom_left.z).
    pub bottom_right_height: f32,
    objects: BTreeSet<ObjectId>,
    detail_level: DetailLevel,
}

impl SpatialCell {
    pub fn objects(&self) -> &BTreeSet<ObjectId> {
        &self.objects
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(&id)
    }

    pub fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    /// Corners tested against the frustum: bottom-left, top-right,
    /// bottom-right, top-left.
    pub fn corners(&self) -> [Vec3; 4] {
        let (bl, tr) = (self.bottom_left, self.top_right);
        [
            bl,
            tr,
            Vec3::new(tr.x, self.bottom_right_height, bl.z),
            Vec3::new(bl.x, self.top_left_height, tr.z),
        ]
    }
}

/// Uniform X/Z grid over the 3D world used for culling and broad-phase
/// collision.
///
/// The partition is centred on the origin: it spans `[-size/2, size/2)` on
/// both axes. Cell `(row, col)` covers the `row`-th slice along X and the
/// `col`-th slice along Z. Y is ignored for bucketing.
///
/// Every frame the scene calls [`reset`](Self::reset) to rebucket all
/// active objects, then [`update`](Self::update) to cull cells, assign LOD
/// and resolve same-cell collisions.
///
/// # Example
///
/// ```rust
/// use bevy::math::{Vec2, Vec3};
/// use gdt_framework::game::lod::LodThresholds;
/// use gdt_framework::game::solid_object::{ObjectKind, SolidObject, SolidObjectManager};
/// use gdt_framework::game::spatial_partition::SpatialPartition;
/// use gdt_framework::game::terrain::FlatTerrain;
///
/// let mut partition = SpatialPartition::new(Vec2::splat(100.0), 10, 10, &FlatTerrain(0.0), LodThresholds::default());
/// let mut objects = SolidObjectManager::new();
/// // Straddles the cell boundary at x = 0
/// let id = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(0.0, 0.0, 5.0), 1.0));
///
/// partition.reset(&objects);
/// assert_eq!(partition.cells_containing(id), vec![(4, 5), (5, 5)]);
/// ```
///
/// # Performance
///
/// - **Rebucket:** O(objects), at most 4 cell inserts each
/// - **Update:** O(cells + sum of per-cell pairs)
#[derive(Resource, Clone, Debug)]
pub struct SpatialPartition {
    size: Vec2,
    num_x: usize,
    num_z: usize,
    cell_size: Vec2,
    bottom_left: Vec3,
    cells: Vec<SpatialCell>,
    visible: FixedBitSet,
    frustum: Frustum,
    lod: LodThresholds,
}

impl SpatialPartition {
    pub fn size(&self) -> Vec2 { self.size }
    pub fn num_x(&self) -> usize { self.num_x }
    pub fn num_z(&self) -> usize { self.num_z }
    pub fn cell_size(&self) -> Vec2 { self.cell_size }
    pub fn frustum(&self) -> &Frustum { &self.frustum }
    pub fn lod_thresholds(&self) -> LodThresholds { self.lod }

    pub fn set_lod_thresholds(&mut self, lod: LodThresholds) {
        self.lod = lod;
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn flat_idx(&self, row: usize, col: usize) -> usize {
        row * self.num_z + col
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&SpatialCell> {
        if row >= self.num_x || col >= self.num_z {
            return None;
        }
        self.cells.get(self.flat_idx(row, col))
    }

    pub fn is_cell_visible(&self, row: usize, col: usize) -> bool {
        row < self.num_x && col < self.num_z && self.visible.contains(self.flat_idx(row, col))
    }

    /// Visible cells in row-major order.
    pub fn visible_cells(&self) -> Vec<(usize, usize)> {
        self.visible.ones().map(|idx| (idx / self.num_z, idx % self.num_z)).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.count_ones(..)
    }

    /// Every cell holding `id`, in row-major order.
    pub fn cells_containing(&self, id: ObjectId) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.contains(id))
            .map(|(idx, _)| (idx / self.num_z, idx % self.num_z))
            .collect()
    }
}
