use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;
use std::collections::BTreeSet;
use crate::game::frustum::Frustum;
use crate::game::lod::{DetailLevel, LodThresholds};
use crate::game::solid_object::{ObjectId, ObjectKind, SolidObject, SolidObjectManager};
use crate::game::terrain::HeightProvider;

use super::{SpatialCell, SpatialPartition};

impl SpatialPartition {
    /// Allocate `num_x * num_z` cells over a `size` rectangle centred on the
    /// origin. Cell corners are lifted to the terrain height.
    ///
    /// Zero divisions are raised to one.
    pub fn new(
        size: Vec2,
        num_x: usize,
        num_z: usize,
        terrain: &dyn HeightProvider,
        lod: LodThresholds,
    ) -> Self {
        let num_x = num_x.max(1);
        let num_z = num_z.max(1);
        let cell_size = Vec2::new(size.x / num_x as f32, size.y / num_z as f32);
        let bottom_left = Vec3::new(-size.x * 0.5, 0.0, -size.y * 0.5);

        let mut cells = Vec::with_capacity(num_x * num_z);
        for row in 0..num_x {
            for col in 0..num_z {
                let x0 = bottom_left.x + cell_size.x * row as f32;
                let z0 = bottom_left.z + cell_size.y * col as f32;
                let (x1, z1) = (x0 + cell_size.x, z0 + cell_size.y);
                cells.push(SpatialCell {
                    bottom_left: Vec3::new(x0, terrain.height_at(x0, z0), z0),
                    top_right: Vec3::new(x1, terrain.height_at(x1, z1), z1),
                    top_left_height: terrain.height_at(x0, z1),
                    bottom_right_height: terrain.height_at(x1, z0),
                    objects: BTreeSet::new(),
                    detail_level: DetailLevel::High,
                });
            }
        }

        info!(
            "[SPATIAL] Partition {}x{} over {:?} (cell size {:?})",
            num_x, num_z, size, cell_size
        );

        Self {
            size,
            num_x,
            num_z,
            cell_size,
            bottom_left,
            cells,
            visible: FixedBitSet::with_capacity(num_x * num_z),
            frustum: Frustum::default(),
            lod,
        }
    }

    /// Cell `(row, col)` containing a world position, or `None` outside the
    /// partition.
    pub fn cell_index(&self, position: Vec3) -> Option<(usize, usize)> {
        let row = ((position.x - self.bottom_left.x) / self.cell_size.x).floor();
        let col = ((position.z - self.bottom_left.z) / self.cell_size.y).floor();
        if !(row >= 0.0 && col >= 0.0) {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        (row < self.num_x && col < self.num_z).then_some((row, col))
    }

    /// Insert an object into the cell under each corner of its X/Z
    /// footprint. Corners outside the partition are skipped.
    pub fn add(&mut self, id: ObjectId, object: &SolidObject) {
        let mut touched: SmallVec<[usize; 4]> = SmallVec::new();
        for corner in object.footprint() {
            if let Some((row, col)) = self.cell_index(corner) {
                let idx = self.flat_idx(row, col);
                if !touched.contains(&idx) {
                    touched.push(idx);
                }
            }
        }
        for idx in touched {
            self.cells[idx].objects.insert(id);
        }
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.objects.clear();
        }
    }

    /// Rebuild all buckets from the active objects. Projectiles are handled
    /// by the object manager and are not bucketed.
    pub fn reset(&mut self, objects: &SolidObjectManager) -> usize {
        self.clear();
        let mut bucketed = 0;
        for (id, object) in objects.iter_active() {
            if object.kind == ObjectKind::Projectile {
                continue;
            }
            self.add(id, object);
            bucketed += 1;
        }
        bucketed
    }
}
