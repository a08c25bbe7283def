use bevy::prelude::*;
use rustc_hash::FxHashSet;
use crate::game::solid_object::SolidObjectManager;

use super::collision::{resolve_cell, CellCollisionReport};
use super::SpatialPartition;

/// Per-frame switches for [`SpatialPartition::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Push cell detail levels to objects that opted into LOD.
    pub lod_enabled: bool,
    /// Log every resolved pair.
    pub log_collision_pairs: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self { lod_enabled: true, log_collision_pairs: false }
    }
}

impl SpatialPartition {
    /// Cull cells against the camera, then assign LOD and resolve collisions
    /// in every visible cell.
    ///
    /// A cell is visible when any of its four corners projects on screen.
    /// Cells under the player's footprint are always visible so the
    /// player's own collisions are never culled. Cells are processed in
    /// row-major order. Buckets must be current (see [`reset`](Self::reset)).
    pub fn update(
        &mut self,
        view: Mat4,
        projection: Mat4,
        eye: Vec3,
        objects: &mut SolidObjectManager,
        options: UpdateOptions,
    ) -> CellCollisionReport {
        self.frustum.update(view, projection);

        for (_, object) in objects.iter_mut() {
            object.visible = false;
        }

        self.visible.clear();
        for (idx, cell) in self.cells.iter().enumerate() {
            if cell.corners().iter().any(|&corner| self.frustum.is_point_within(corner)) {
                self.visible.insert(idx);
            }
        }

        if let Some(player) = objects.player().and_then(|id| objects.get(id)) {
            for corner in player.footprint() {
                if let Some((row, col)) = self.cell_index(corner) {
                    let idx = self.flat_idx(row, col);
                    self.visible.insert(idx);
                }
            }
        }

        let mut report = CellCollisionReport::default();
        let mut resolved = FxHashSet::default();
        let visible: Vec<usize> = self.visible.ones().collect();

        for idx in visible {
            let cell = &mut self.cells[idx];
            cell.detail_level = self.lod.level_for(eye.distance(cell.bottom_left));

            resolve_cell(cell, objects, &mut resolved, &mut report, options.log_collision_pairs);

            for &id in cell.objects.iter() {
                if let Some(object) = objects.get_mut(id) {
                    object.visible = true;
                    if options.lod_enabled && object.lod_enabled {
                        object.detail_level = cell.detail_level;
                    }
                }
            }
        }

        report
    }
}
