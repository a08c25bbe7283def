use bevy::prelude::*;
use super::{ObjectId, ObjectKind, SolidObjectManager};

/// Outcome of one projectile pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectileReport {
    /// A projectile fired by someone else hit the player.
    pub player_hit: bool,
    pub projectiles_spent: u32,
    pub npcs_destroyed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HitEffect {
    /// Own projectile, or a kind projectiles pass through.
    Ignore,
    HitPlayer,
    DestroyBoth,
    Absorb,
}

fn hit_effect(kind: ObjectKind, target: ObjectId, source: Option<ObjectId>) -> HitEffect {
    match kind {
        ObjectKind::Player | ObjectKind::Npc if source == Some(target) => HitEffect::Ignore,
        ObjectKind::Player => HitEffect::HitPlayer,
        ObjectKind::Npc => HitEffect::DestroyBoth,
        ObjectKind::Structure => HitEffect::Absorb,
        ObjectKind::Other | ObjectKind::Projectile => HitEffect::Ignore,
    }
}

impl SolidObjectManager {
    /// Move active projectiles along their velocity.
    pub fn advance_projectiles(&mut self, dt: f32) {
        for object in self.objects.values_mut() {
            if object.active && object.kind == ObjectKind::Projectile {
                object.position += object.velocity * dt;
            }
        }
    }

    /// Test every active object against every active projectile.
    ///
    /// A projectile hits when the segment it travelled this frame crosses
    /// the object's box, or when the two boxes overlap. Each object takes
    /// at most one effective hit per pass; projectiles spent earlier in the
    /// pass cannot hit later objects.
    pub fn check_projectiles(&mut self) -> ProjectileReport {
        let mut report = ProjectileReport::default();

        let targets: Vec<ObjectId> = self
            .iter_active()
            .filter(|(_, object)| object.kind != ObjectKind::Projectile)
            .map(|(id, _)| id)
            .collect();
        let projectiles: Vec<ObjectId> = self
            .iter_active()
            .filter(|(_, object)| object.kind == ObjectKind::Projectile)
            .map(|(id, _)| id)
            .collect();

        if projectiles.is_empty() {
            return report;
        }

        for &target_id in &targets {
            for &projectile_id in &projectiles {
                let (Some(target), Some(projectile)) =
                    (self.objects.get(&target_id), self.objects.get(&projectile_id))
                else {
                    continue;
                };
                if !projectile.active {
                    continue;
                }

                let target_box = target.bounds();
                let hit = target_box.segment_hit(projectile.previous_position, projectile.position)
                    || target_box.intersects(&projectile.bounds());
                if !hit {
                    continue;
                }

                let effect = hit_effect(target.kind, target_id, projectile.source);
                if effect == HitEffect::Ignore {
                    continue;
                }

                debug!("[OBJECTS] Projectile {} hit {:?} {}", projectile_id, target.kind, target_id);
                self.deactivate(projectile_id);
                report.projectiles_spent += 1;
                match effect {
                    HitEffect::HitPlayer => report.player_hit = true,
                    HitEffect::DestroyBoth => {
                        self.deactivate(target_id);
                        report.npcs_destroyed += 1;
                    }
                    HitEffect::Absorb | HitEffect::Ignore => {}
                }
                break;
            }
        }

        report
    }

    fn deactivate(&mut self, id: ObjectId) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.active = false;
        }
    }

    /// Nearest hit along a ray against every active object except the
    /// player and projectiles. Returns the ray parameter `t`.
    pub fn check_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        self.iter_active()
            .filter(|(_, object)| !matches!(object.kind, ObjectKind::Player | ObjectKind::Projectile))
            .filter_map(|(_, object)| object.bounds().ray_hit(origin, direction))
            .min_by(|a, b| a.total_cmp(b))
    }
}
