//! Platformer systems
//!
//! Startup builds the tile map and spawns actors from marker tiles. The
//! fixed-step systems then move actors, apply tile effects and settle the
//! game outcome, in that order.

use bevy::prelude::*;
use crate::game::config::InitialConfig;
use crate::game::pathfinding::PathFinder;
use crate::game::physics2d::{Physics2D, VerticalStatus};
use crate::game::tile_collision::TileCollider;
use crate::game::tile_map::{codes, TileMap, TilePos};

use super::*;

/// Run condition for the platformer sets.
pub fn outcome_in_progress(outcome: Res<GameOutcome>) -> bool {
    !outcome.is_over()
}

/// Build the tile map, path finder and actor settings from `InitialConfig`.
///
/// A `TileMap` inserted before startup is kept as is; otherwise one is
/// allocated from the configured dimensions and filled from `LevelFiles`.
pub fn init_platformer_from_initial(
    mut commands: Commands,
    initial_config: Option<Res<InitialConfig>>,
    existing_map: Option<Res<TileMap>>,
    level_files: Res<LevelFiles>,
) {
    let config = match &initial_config {
        Some(cfg) => cfg.as_ref(),
        None => {
            warn!("[PLATFORMER] InitialConfig not found, using defaults");
            &InitialConfig::default()
        }
    };

    let tile_size = Vec2::from(config.tile_size);
    commands.insert_resource(PlatformerSettings {
        gravity: Vec2::new(0.0, config.gravity),
        player_walk_speed: config.player_walk_speed,
        player_jump_speed: config.player_jump_speed,
        enemy_walk_speed: config.enemy_walk_speed,
        enemy_jump_speed: config.enemy_jump_speed,
        player_lives: config.player_lives,
        player_max_health: config.player_max_health,
        half_size: Vec2::from(config.player_half_size),
    });
    commands.insert_resource(PathFinder::new(config.pathfinding_diagonal));

    if existing_map.is_some() {
        info!("[PLATFORMER] Using pre-built tile map");
        return;
    }

    let mut map = TileMap::new(config.map_levels, config.map_rows, config.map_cols, tile_size);
    for (level, path) in level_files.0.iter().enumerate() {
        if let Err(e) = map.load_csv(path, level) {
            error!("[PLATFORMER] Failed to load level {} from {}: {}", level, path.display(), e);
        }
    }
    info!(
        "[PLATFORMER] Tile map ready: {} levels of {}x{} tiles",
        map.levels(), map.rows(), map.cols()
    );
    commands.insert_resource(map);
}

/// Actors enter a level falling and settle onto whatever is below them.
fn falling_body(gravity: Vec2) -> Physics2D {
    let mut physics = Physics2D::new(gravity);
    physics.set_vertical_status(VerticalStatus::Fall, true);
    physics
}

/// Take the player marker off the current level. Returns its tile.
fn take_player_spawn(map: &mut TileMap) -> Option<TilePos> {
    let tile = map.find_value(codes::PLAYER_SPAWN, true)?;
    map.clear_cell(tile.y, tile.x, true);
    Some(tile)
}

/// Spawn an enemy on every enemy marker of the current level, facing the
/// player's tile.
fn spawn_enemies(
    commands: &mut Commands,
    map: &mut TileMap,
    settings: &PlatformerSettings,
    player_tile: TilePos,
) -> usize {
    let collider = TileCollider::new(settings.half_size);
    let mut enemies = 0;
    while let Some(tile) = map.find_value(codes::ENEMY_SPAWN, true) {
        map.clear_cell(tile.y, tile.x, true);
        let direction = enemy::direction_between(tile, player_tile);
        commands.spawn((
            Enemy2D::new(direction, settings.enemy_walk_speed, settings.enemy_jump_speed),
            Position2D(map.tile_center(tile.y, tile.x)),
            collider,
            falling_body(settings.gravity),
        ));
        enemies += 1;
    }
    enemies
}

/// Spawn the player and enemies at their marker tiles and clear the markers.
pub fn spawn_actors(
    mut commands: Commands,
    mut map: ResMut<TileMap>,
    settings: Res<PlatformerSettings>,
) {
    let Some(player_tile) = take_player_spawn(&mut map) else {
        warn!("[PLATFORMER] No player spawn tile on level {}", map.current_level());
        return;
    };
    let player_position = map.tile_center(player_tile.y, player_tile.x);

    commands.spawn((
        Player2D::new(
            settings.player_lives,
            settings.player_max_health,
            settings.player_walk_speed,
            settings.player_jump_speed,
        ),
        Position2D(player_position),
        TileCollider::new(settings.half_size),
        falling_body(settings.gravity),
    ));

    let enemies = spawn_enemies(&mut commands, &mut map, &settings, player_tile);
    info!(
        "[PLATFORMER] Spawned player at {:?} and {} enemies",
        player_position, enemies
    );
}

pub fn move_player(
    map: Res<TileMap>,
    mut intent: ResMut<PlayerIntent>,
    time: Res<Time<Fixed>>,
    mut query: Query<(&Player2D, &mut Position2D, &TileCollider, &mut Physics2D)>,
) {
    let dt = time.timestep().as_secs_f32();
    let jump = std::mem::take(&mut intent.jump);
    let walk = intent.walk.clamp(-1.0, 1.0);

    for (player, mut position, collider, mut physics) in query.iter_mut() {
        if jump {
            physics.jump(Vec2::new(0.0, player.jump_speed));
        }
        let walk_velocity = Vec2::new(walk * player.walk_speed, 0.0);
        step_body(&map, &mut position.0, collider, &mut physics, walk_velocity, dt);
    }
}

pub fn move_enemies(
    map: Res<TileMap>,
    mut finder: ResMut<PathFinder>,
    time: Res<Time<Fixed>>,
    player: Query<&Position2D, With<Player2D>>,
    mut enemies: Query<(&mut Enemy2D, &mut Position2D, &TileCollider, &mut Physics2D), Without<Player2D>>,
) {
    let Ok(player_position) = player.single().map(|p| p.0) else {
        return;
    };
    let dt = time.timestep().as_secs_f32();

    for (mut enemy, mut position, collider, mut physics) in enemies.iter_mut() {
        let intent = enemy.think(&map, &mut finder, position.0, player_position, collider.half_size);
        if intent.jump && physics.vertical_status() == VerticalStatus::Idle {
            physics.jump(Vec2::new(0.0, enemy.jump_speed));
        }

        let report = step_body(&map, &mut position.0, collider, &mut physics, intent.walk, dt);
        if report.hit_wall {
            enemy.flip_horizontal();
        }
    }
}

pub fn player_tile_interaction(
    mut map: ResMut<TileMap>,
    mut outcome: ResMut<GameOutcome>,
    mut query: Query<(&Position2D, &mut Player2D)>,
    mut interactions: MessageWriter<TileInteraction>,
) {
    for (position, mut player) in query.iter_mut() {
        let Some((kind, tile)) = interact_with_map(&mut map, &mut player, position.0) else {
            continue;
        };
        match kind {
            InteractionKind::ReachedExit => {
                let level = map.current_level();
                if level + 1 < map.levels() {
                    info!("[PLATFORMER] Level {} completed", level);
                } else {
                    info!("[PLATFORMER] Final level {} completed", level);
                }
                *outcome = GameOutcome::LevelCompleted;
            }
            InteractionKind::CollectedTree | InteractionKind::ExtraLife => {
                debug!("[PLATFORMER] {:?} at {:?}", kind, tile);
            }
            InteractionKind::Spikes | InteractionKind::Healed => {}
        }
        interactions.write(TileInteraction { kind, tile });
    }
}

/// Enemies touching the player cost one health each and go back to Idle.
pub fn enemy_contact(
    mut enemies: Query<(Entity, &mut Enemy2D, &Position2D, &TileCollider)>,
    mut player: Query<(&Position2D, &mut Player2D)>,
    mut contacts: MessageWriter<EnemyContact>,
) {
    let Ok((player_position, mut player)) = player.single_mut() else {
        return;
    };

    for (entity, mut enemy, position, collider) in enemies.iter_mut() {
        if enemy.check_contact(position.0, player_position.0, collider.half_size) {
            player.health -= 1;
            contacts.write(EnemyContact { enemy: entity });
        }
    }
}

pub fn update_player_vitals(
    mut outcome: ResMut<GameOutcome>,
    mut query: Query<&mut Player2D>,
) {
    for mut player in query.iter_mut() {
        match update_health_lives(&mut player) {
            VitalsChange::Unchanged => {}
            VitalsChange::LostLife => {
                info!("[PLATFORMER] Player lost a life, {} left", player.lives);
            }
            VitalsChange::OutOfLives => {
                info!("[PLATFORMER] Player is out of lives");
                *outcome = GameOutcome::PlayerLost;
            }
        }
    }
}

/// Move on to the next level after the exit is reached.
///
/// The player keeps lives, health and trees but is put back on the new
/// level's spawn tile, falling. Enemies from the finished level are
/// replaced by the new level's. Nothing happens after the final level, so
/// its `LevelCompleted` ends the game.
pub fn advance_level(
    mut commands: Commands,
    mut map: ResMut<TileMap>,
    settings: Res<PlatformerSettings>,
    mut outcome: ResMut<GameOutcome>,
    mut player: Query<(&mut Position2D, &mut Physics2D), With<Player2D>>,
    enemies: Query<Entity, With<Enemy2D>>,
    mut advanced: MessageWriter<LevelAdvanced>,
) {
    let next = map.current_level() + 1;
    if next >= map.levels() {
        return;
    }

    map.set_current_level(next);
    let Some(player_tile) = take_player_spawn(&mut map) else {
        error!("[PLATFORMER] No player spawn tile on level {}, stopping", next);
        return;
    };
    let player_position = map.tile_center(player_tile.y, player_tile.x);
    for (mut position, mut physics) in player.iter_mut() {
        position.0 = player_position;
        *physics = falling_body(settings.gravity);
    }

    for entity in enemies.iter() {
        commands.entity(entity).despawn();
    }
    let spawned = spawn_enemies(&mut commands, &mut map, &settings, player_tile);

    *outcome = GameOutcome::InProgress;
    advanced.write(LevelAdvanced { level: next });
    info!(
        "[PLATFORMER] Entered level {}: player at {:?}, {} enemies",
        next, player_position, spawned
    );
}
