use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::game::tile_map::{codes, TileMap, TilePos};

/// Platformer player state that is not movement.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Player2D {
    pub lives: i32,
    pub health: i32,
    pub max_health: i32,
    pub trees: u32,
    pub walk_speed: f32,
    pub jump_speed: f32,
}

impl Player2D {
    pub fn new(lives: i32, max_health: i32, walk_speed: f32, jump_speed: f32) -> Self {
        Self {
            lives,
            health: max_health,
            max_health,
            trees: 0,
            walk_speed,
            jump_speed,
        }
    }
}

impl Default for Player2D {
    fn default() -> Self {
        Self::new(3, 100, 100.0, 200.0)
    }
}

/// Effect of the tile under the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    CollectedTree,
    ExtraLife,
    Spikes,
    Healed,
    ReachedExit,
}

/// Result of [`update_health_lives`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VitalsChange {
    Unchanged,
    LostLife,
    OutOfLives,
}

/// Apply the tile under `position` to the player.
///
/// Collectibles are removed from the map when consumed. Hazards and
/// healing tiles stay and apply again every frame the player stands on
/// them.
pub fn interact_with_map(
    map: &mut TileMap,
    player: &mut Player2D,
    position: Vec2,
) -> Option<(InteractionKind, TilePos)> {
    let tile = map.tile_at_position(position)?;
    let code = map.get(tile.y, tile.x, true)?;

    let kind = match code {
        codes::TREE => {
            map.clear_cell(tile.y, tile.x, true);
            player.trees += 1;
            InteractionKind::CollectedTree
        }
        codes::EXTRA_LIFE => {
            map.clear_cell(tile.y, tile.x, true);
            player.lives += 1;
            InteractionKind::ExtraLife
        }
        codes::SPIKES => {
            player.health -= 1;
            InteractionKind::Spikes
        }
        codes::HEAL => {
            player.health = (player.health + 1).min(player.max_health);
            InteractionKind::Healed
        }
        codes::EXIT => InteractionKind::ReachedExit,
        _ => return None,
    };

    Some((kind, tile))
}

/// Trade an empty health bar for a life. The player is out once the life
/// count drops below zero.
pub fn update_health_lives(player: &mut Player2D) -> VitalsChange {
    if player.health > 0 {
        return VitalsChange::Unchanged;
    }

    player.health = player.max_health;
    player.lives -= 1;
    if player.lives < 0 {
        VitalsChange::OutOfLives
    } else {
        VitalsChange::LostLife
    }
}
