//! 2D platformer scene built on the tile map.
//!
//! - **body**: the shared per-frame movement step (physics + tile collision)
//! - **player**: tile pickups, hazards, health and lives
//! - **enemy**: the Idle/Patrol/Attack state machine
//! - **systems**: Bevy systems wiring the above to the ECS

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::game::config::ConfigLoadSet;
use crate::game::tile_map::TilePos;

pub mod body;
pub mod enemy;
pub mod player;
pub mod systems;
#[cfg(test)]
mod tests;

pub use body::{step_body, StepReport};
pub use enemy::{Enemy2D, EnemyIntent, EnemyState, FSM_MAX_COUNTER};
pub use player::{interact_with_map, update_health_lives, InteractionKind, Player2D, VitalsChange};

// ============================================================================
// Components
// ============================================================================

/// World position of a platformer body (bottom-left origin, world units).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position2D(pub Vec2);

// ============================================================================
// Resources
// ============================================================================

/// Movement request for the player for the next fixed step.
///
/// `walk` is clamped to [-1, 1] and scaled by the player's walk speed.
/// `jump` is consumed by the step that reads it.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerIntent {
    pub walk: f32,
    pub jump: bool,
}

/// Single authoritative result of the current level. `LevelCompleted` on
/// any level but the last is short-lived: the next level starts in the
/// same fixed step.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    #[default]
    InProgress,
    LevelCompleted,
    PlayerLost,
}

impl GameOutcome {
    pub fn is_over(self) -> bool {
        self != GameOutcome::InProgress
    }
}

/// Actor tuning copied from `InitialConfig` at startup.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct PlatformerSettings {
    pub gravity: Vec2,
    pub player_walk_speed: f32,
    pub player_jump_speed: f32,
    pub enemy_walk_speed: f32,
    pub enemy_jump_speed: f32,
    pub player_lives: i32,
    pub player_max_health: i32,
    /// Collision half-size of every actor.
    pub half_size: Vec2,
}

impl Default for PlatformerSettings {
    fn default() -> Self {
        Self {
            gravity: crate::game::physics2d::DEFAULT_GRAVITY,
            player_walk_speed: 100.0,
            player_jump_speed: 200.0,
            enemy_walk_speed: 50.0,
            enemy_jump_speed: 150.0,
            player_lives: 3,
            player_max_health: 100,
            half_size: Vec2::splat(12.5),
        }
    }
}

/// CSV files loaded into the tile map at startup, one per level.
#[derive(Resource, Clone, Debug, Default)]
pub struct LevelFiles(pub Vec<PathBuf>);

// ============================================================================
// Messages
// ============================================================================

/// The player consumed or stood on a special tile.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq)]
pub struct TileInteraction {
    pub kind: InteractionKind,
    pub tile: TilePos,
}

/// The map switched to `level` and the actors were re-placed.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelAdvanced {
    pub level: usize,
}

/// An enemy touched the player.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq)]
pub struct EnemyContact {
    pub enemy: Entity,
}

// ============================================================================
// Plugin
// ============================================================================

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum Scene2dSet {
    Movement,    // Player then enemies
    Interaction, // Tiles and enemy contact
    Outcome,     // Health, lives and game outcome
    Progression, // Next level once the exit is reached
}

/// Runs the platformer in `FixedUpdate` until the outcome is decided.
/// Completing a level that is not the last one moves on to the next.
#[derive(Default)]
pub struct Scene2dPlugin {
    pub level_files: Vec<PathBuf>,
}

impl Plugin for Scene2dPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(LevelFiles(self.level_files.clone()));
        app.init_resource::<PlayerIntent>();
        app.init_resource::<GameOutcome>();
        app.init_resource::<PlatformerSettings>();

        app.add_message::<TileInteraction>();
        app.add_message::<EnemyContact>();
        app.add_message::<LevelAdvanced>();

        app.configure_sets(FixedUpdate, (
            Scene2dSet::Movement,
            Scene2dSet::Interaction,
            Scene2dSet::Outcome,
        ).chain().run_if(systems::outcome_in_progress));
        app.configure_sets(FixedUpdate, Scene2dSet::Progression
            .after(Scene2dSet::Outcome)
            .run_if(resource_equals(GameOutcome::LevelCompleted)));

        app.add_systems(Startup, (
            systems::init_platformer_from_initial,
            systems::spawn_actors,
        ).chain().after(ConfigLoadSet));

        app.add_systems(FixedUpdate, (
            (systems::move_player, systems::move_enemies).chain().in_set(Scene2dSet::Movement),
            (systems::player_tile_interaction, systems::enemy_contact).chain().in_set(Scene2dSet::Interaction),
            systems::update_player_vitals.in_set(Scene2dSet::Outcome),
            systems::advance_level.in_set(Scene2dSet::Progression),
        ));
    }
}
