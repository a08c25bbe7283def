use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::game::bounds::WorldBox;
use crate::game::lod::DetailLevel;
use crate::game::physics2d::VerticalStatus;
use crate::game::terrain::HeightProvider;

mod projectiles;

pub use projectiles::ProjectileReport;

/// Stable handle to an object in a [`SolidObjectManager`]. Handles are never
/// reused, so a stale handle simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type tag driving the collision policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Player,
    Npc,
    Other,
    Structure,
    Projectile,
}

impl ObjectKind {
    /// Player, NPC or other: objects that move and get pushed back.
    pub fn is_movable(self) -> bool {
        matches!(self, ObjectKind::Player | ObjectKind::Npc | ObjectKind::Other)
    }

    /// NPC or other: movable objects that are not the player.
    pub fn is_creature(self) -> bool {
        matches!(self, ObjectKind::Npc | ObjectKind::Other)
    }
}

/// A 3D object taking part in culling and broad-phase collision.
///
/// `box_min`/`box_max` are offsets from `position`.
#[derive(Clone, Debug, PartialEq)]
pub struct SolidObject {
    pub kind: ObjectKind,
    pub position: Vec3,
    pub previous_position: Vec3,
    pub box_min: Vec3,
    pub box_max: Vec3,
    pub active: bool,
    pub visible: bool,
    pub lod_enabled: bool,
    pub detail_level: DetailLevel,
    /// Only meaningful for the player. Structure hits force a fall to Idle.
    pub vertical_status: VerticalStatus,
    /// Who fired a projectile. Projectiles never hit their own source.
    pub source: Option<ObjectId>,
    pub velocity: Vec3,
    pub to_delete: bool,
}

impl SolidObject {
    pub fn new(kind: ObjectKind, position: Vec3, box_min: Vec3, box_max: Vec3) -> Self {
        Self {
            kind,
            position,
            previous_position: position,
            box_min,
            box_max,
            active: true,
            visible: false,
            lod_enabled: false,
            detail_level: DetailLevel::High,
            vertical_status: VerticalStatus::Idle,
            source: None,
            velocity: Vec3::ZERO,
            to_delete: false,
        }
    }

    /// Cube of the given half extent centred on `position`.
    pub fn cube(kind: ObjectKind, position: Vec3, half_extent: f32) -> Self {
        Self::new(kind, position, Vec3::splat(-half_extent), Vec3::splat(half_extent))
    }

    /// Projectile moving at `velocity`, fired by `source`.
    pub fn projectile(position: Vec3, velocity: Vec3, half_extent: f32, source: Option<ObjectId>) -> Self {
        Self {
            velocity,
            source,
            ..Self::cube(ObjectKind::Projectile, position, half_extent)
        }
    }

    pub fn with_lod(mut self) -> Self {
        self.lod_enabled = true;
        self
    }

    pub fn bounds(&self) -> WorldBox {
        WorldBox::from_offsets(self.position, self.box_min, self.box_max)
    }

    /// The four X/Z corners of the box, min/min first.
    pub fn footprint(&self) -> [Vec3; 4] {
        let (lo, hi) = (self.position + self.box_min, self.position + self.box_max);
        [
            Vec3::new(lo.x, self.position.y, lo.z),
            Vec3::new(hi.x, self.position.y, lo.z),
            Vec3::new(lo.x, self.position.y, hi.z),
            Vec3::new(hi.x, self.position.y, hi.z),
        ]
    }

    pub fn rollback(&mut self) {
        self.position = self.previous_position;
    }

    /// Stop a fall. Any other vertical state is left alone.
    pub fn set_to_idle(&mut self) {
        if self.vertical_status == VerticalStatus::Fall {
            self.vertical_status = VerticalStatus::Idle;
        }
    }
}

/// Authoritative store of every 3D object.
///
/// Objects are iterated in handle order, which is also insertion order, so
/// every pass over them is reproducible.
#[derive(Resource, Debug, Default)]
pub struct SolidObjectManager {
    objects: BTreeMap<ObjectId, SolidObject>,
    next_id: u32,
}

impl SolidObjectManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SolidObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, object);
        id
    }

    pub fn erase(&mut self, id: ObjectId) -> bool {
        self.objects.remove(&id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SolidObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SolidObject> {
        self.objects.get_mut(&id)
    }

    pub fn len(&self) -> usize { self.objects.len() }
    pub fn is_empty(&self) -> bool { self.objects.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SolidObject)> {
        self.objects.iter().map(|(&id, object)| (id, object))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut SolidObject)> {
        self.objects.iter_mut().map(|(&id, object)| (id, object))
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (ObjectId, &SolidObject)> {
        self.iter().filter(|(_, object)| object.active)
    }

    /// First active player, if any.
    pub fn player(&self) -> Option<ObjectId> {
        self.iter_active()
            .find(|(_, object)| object.kind == ObjectKind::Player)
            .map(|(id, _)| id)
    }

    /// Record the current positions as the rollback point for this frame.
    pub fn snapshot_positions(&mut self) {
        for object in self.objects.values_mut() {
            object.previous_position = object.position;
        }
    }

    pub fn rollback(&mut self, id: ObjectId) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.rollback();
        }
    }

    /// Rest every active non-projectile object on the terrain.
    pub fn snap_to_ground(&mut self, terrain: &dyn HeightProvider) {
        for object in self.objects.values_mut() {
            if !object.active || object.kind == ObjectKind::Projectile {
                continue;
            }
            object.position.y = terrain.height_at(object.position.x, object.position.z) - object.box_min.y;
        }
    }

    /// Drop objects marked for deletion and spent projectiles.
    pub fn cleanup(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|_, object| {
            !object.to_delete && !(object.kind == ObjectKind::Projectile && !object.active)
        });
        let removed = before - self.objects.len();
        if removed > 0 {
            debug!("[OBJECTS] Cleaned up {} objects, {} remain", removed, self.objects.len());
        }
        removed
    }
}
