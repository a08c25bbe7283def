use bevy::prelude::*;
use rustc_hash::FxHashSet;
use crate::game::solid_object::{ObjectId, ObjectKind, SolidObjectManager};

use super::SpatialCell;

/// How an overlapping pair is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PairResponse {
    /// Player against an NPC or other: both roll back, player is hit.
    PlayerBump,
    /// Two NPCs/others: both roll back.
    CreatureBump,
    /// Movable object against a structure: the mover rolls back. A player
    /// also stops falling and is hit.
    StructureBlock,
}

/// A resolved pair. `mover` is the object that was rolled back first;
/// for a structure hit `other` is the structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    pub mover: ObjectId,
    pub other: ObjectId,
    pub response: PairResponse,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellCollisionReport {
    pub pairs: Vec<CollisionPair>,
    pub player_hit: bool,
}

/// Policy for a pair of kinds, normalized so the movable object comes
/// first. `None` means the pair is ignored.
pub fn pair_response(a: ObjectKind, b: ObjectKind) -> Option<(PairResponse, bool)> {
    use ObjectKind::*;
    match (a, b) {
        (Player, k) if k.is_creature() => Some((PairResponse::PlayerBump, false)),
        (k, Player) if k.is_creature() => Some((PairResponse::PlayerBump, true)),
        (x, y) if x.is_creature() && y.is_creature() => Some((PairResponse::CreatureBump, false)),
        (k, Structure) if k.is_movable() => Some((PairResponse::StructureBlock, false)),
        (Structure, k) if k.is_movable() => Some((PairResponse::StructureBlock, true)),
        _ => None,
    }
}

/// Resolve overlapping pairs inside one cell.
///
/// Pairs are visited as `(i, j)` with `j` after `i` in handle order. The
/// first matching pair for `i` wins, and an object that already won a pair
/// earlier in the frame (in any cell) is not visited as `i` again.
pub fn resolve_cell(
    cell: &SpatialCell,
    objects: &mut SolidObjectManager,
    resolved: &mut FxHashSet<ObjectId>,
    report: &mut CellCollisionReport,
    log_pairs: bool,
) {
    let ids: Vec<ObjectId> = cell.objects().iter().copied().collect();

    for (i, &first) in ids.iter().enumerate() {
        if resolved.contains(&first) {
            continue;
        }
        for &second in &ids[i + 1..] {
            let (Some(a), Some(b)) = (objects.get(first), objects.get(second)) else {
                continue;
            };
            if !a.active || !b.active || !a.bounds().intersects(&b.bounds()) {
                continue;
            }
            let Some((response, swapped)) = pair_response(a.kind, b.kind) else {
                continue;
            };

            let (mover, other) = if swapped { (second, first) } else { (first, second) };
            match response {
                PairResponse::PlayerBump => {
                    objects.rollback(mover);
                    objects.rollback(other);
                    report.player_hit = true;
                }
                PairResponse::CreatureBump => {
                    objects.rollback(mover);
                    objects.rollback(other);
                }
                PairResponse::StructureBlock => {
                    if let Some(object) = objects.get_mut(mover) {
                        object.rollback();
                        if object.kind == ObjectKind::Player {
                            object.set_to_idle();
                            report.player_hit = true;
                        }
                    }
                }
            }

            if log_pairs {
                info!("[SPATIAL] {:?}: {} vs {}", response, mover, other);
            }
            report.pairs.push(CollisionPair { mover, other, response });
            resolved.insert(first);
            break;
        }
    }
}
