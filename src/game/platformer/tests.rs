use super::*;
use crate::game::pathfinding::PathFinder;
use crate::game::physics2d::{HorizontalStatus, Physics2D, VerticalStatus};
use crate::game::tile_collision::TileCollider;
use crate::game::tile_map::{codes, TileMap};

const TILE: f32 = 10.0;
const DT: f32 = 0.1;
const WALL: i32 = 100;

fn map_with_floor() -> TileMap {
    let mut map = TileMap::new(1, 10, 10, Vec2::splat(TILE));
    for col in 0..10 {
        map.set(0, col, WALL, true);
    }
    map
}

fn collider() -> TileCollider {
    TileCollider::new(Vec2::splat(TILE * 0.5))
}

fn falling(velocity_y: f32) -> Physics2D {
    let mut physics = Physics2D::default();
    physics.set_vertical_status(VerticalStatus::Fall, true);
    physics.final_velocity = Vec2::new(0.0, velocity_y);
    physics
}

// ============================================================================
// Body step
// ============================================================================

#[test]
fn test_walking_on_floor_stays_grounded() {
    let map = map_with_floor();
    let mut physics = Physics2D::default();
    let mut position = Vec2::new(45.0, 15.0);

    let report = step_body(&map, &mut position, &collider(), &mut physics, Vec2::new(20.0, 0.0), DT);

    assert_eq!(report, StepReport::default());
    assert!((position.x - 47.0).abs() < 1e-4);
    assert_eq!(position.y, 15.0);
    assert_eq!(physics.vertical_status(), VerticalStatus::Idle);
    assert_eq!(physics.horizontal_status(), HorizontalStatus::Walk);
}

#[test]
fn test_walking_off_ledge_starts_fall() {
    let mut map = map_with_floor();
    for col in 5..10 {
        map.clear_cell(0, col, true);
    }
    let mut physics = Physics2D::default();
    let mut position = Vec2::new(55.0, 15.0);

    let report = step_body(&map, &mut position, &collider(), &mut physics, Vec2::new(20.0, 0.0), DT);

    assert!(report.left_ground);
    assert_eq!(physics.vertical_status(), VerticalStatus::Fall);
}

#[test]
fn test_falling_body_lands_on_floor() {
    let map = map_with_floor();
    let mut physics = falling(0.0);
    let mut position = Vec2::new(45.0, 17.0);

    let report = step_body(&map, &mut position, &collider(), &mut physics, Vec2::ZERO, DT);

    assert!(report.landed);
    assert_eq!(position.y, 15.0, "resting on top of row 0");
    assert_eq!(physics.vertical_status(), VerticalStatus::Idle);
    assert_eq!(physics.final_velocity, Vec2::ZERO);
}

#[test]
fn test_jump_into_ceiling_turns_into_fall() {
    let mut map = map_with_floor();
    for col in 0..10 {
        map.set(5, col, WALL, true);
    }
    let mut physics = Physics2D::default();
    assert!(physics.jump(Vec2::new(0.0, 100.0)));
    let mut position = Vec2::new(45.0, 42.0);

    let report = step_body(&map, &mut position, &collider(), &mut physics, Vec2::ZERO, DT);

    assert!(report.hit_ceiling);
    assert_eq!(position.y, 45.0, "clamped under row 5");
    assert_eq!(physics.vertical_status(), VerticalStatus::Fall);
}

#[test]
fn test_walking_into_wall_stops_at_surface() {
    let mut map = map_with_floor();
    map.set(1, 6, WALL, true);
    let mut physics = Physics2D::default();
    let mut position = Vec2::new(52.0, 15.0);

    let report = step_body(&map, &mut position, &collider(), &mut physics, Vec2::new(60.0, 0.0), DT);

    assert!(report.hit_wall);
    assert_eq!(position, Vec2::new(55.0, 15.0));
    assert_eq!(physics.horizontal_status(), HorizontalStatus::Idle);
    assert_eq!(physics.vertical_status(), VerticalStatus::Idle);
}

#[test]
fn test_walking_while_falling_keeps_vertical_velocity() {
    let map = TileMap::new(1, 10, 10, Vec2::splat(TILE));
    let mut physics = falling(-30.0);
    let mut position = Vec2::new(50.0, 80.0);

    step_body(&map, &mut position, &collider(), &mut physics, Vec2::new(10.0, 0.0), DT);

    assert!((physics.final_velocity.y + 60.0).abs() < 1e-3, "got {}", physics.final_velocity.y);
    assert_eq!(physics.vertical_status(), VerticalStatus::Fall);
}

#[test]
fn test_boundary_clamp_ends_fall() {
    let map = TileMap::new(1, 10, 10, Vec2::splat(TILE));
    let mut physics = falling(-30.0);
    let mut position = Vec2::new(50.0, 7.0);

    let report = step_body(&map, &mut position, &collider(), &mut physics, Vec2::ZERO, DT);

    assert!(report.clamped);
    assert!(report.landed);
    assert_eq!(position.y, 5.0);
    assert_eq!(physics.vertical_status(), VerticalStatus::Idle);
}

// ============================================================================
// Player
// ============================================================================

fn player_on(code: i32) -> (TileMap, Player2D) {
    let mut map = map_with_floor();
    map.set(1, 1, code, true);
    (map, Player2D::new(3, 10, 100.0, 200.0))
}

#[test]
fn test_tree_is_collected_once() {
    let (mut map, mut player) = player_on(codes::TREE);
    let at = Vec2::new(15.0, 15.0);

    let hit = interact_with_map(&mut map, &mut player, at);
    assert_eq!(hit.map(|(kind, _)| kind), Some(InteractionKind::CollectedTree));
    assert_eq!(player.trees, 1);
    assert_eq!(map.get(1, 1, true), Some(codes::EMPTY));

    assert_eq!(interact_with_map(&mut map, &mut player, at), None);
    assert_eq!(player.trees, 1);
}

#[test]
fn test_extra_life_is_consumed() {
    let (mut map, mut player) = player_on(codes::EXTRA_LIFE);
    interact_with_map(&mut map, &mut player, Vec2::new(15.0, 15.0));
    assert_eq!(player.lives, 4);
    assert_eq!(map.get(1, 1, true), Some(codes::EMPTY));
}

#[test]
fn test_spikes_and_heal_apply_every_frame() {
    let (mut map, mut player) = player_on(codes::SPIKES);
    let at = Vec2::new(15.0, 15.0);
    interact_with_map(&mut map, &mut player, at);
    interact_with_map(&mut map, &mut player, at);
    assert_eq!(player.health, 8);
    assert_eq!(map.get(1, 1, true), Some(codes::SPIKES), "hazards stay");

    map.set(1, 1, codes::HEAL, true);
    interact_with_map(&mut map, &mut player, at);
    assert_eq!(player.health, 9);
    interact_with_map(&mut map, &mut player, at);
    interact_with_map(&mut map, &mut player, at);
    assert_eq!(player.health, 10, "capped at max");
}

#[test]
fn test_exit_tile_is_reported() {
    let (mut map, mut player) = player_on(codes::EXIT);
    let hit = interact_with_map(&mut map, &mut player, Vec2::new(15.0, 15.0));
    assert_eq!(hit, Some((InteractionKind::ReachedExit, crate::game::tile_map::TilePos::new(1, 1))));
}

#[test]
fn test_empty_health_costs_a_life() {
    let mut player = Player2D::new(1, 10, 100.0, 200.0);
    assert_eq!(update_health_lives(&mut player), VitalsChange::Unchanged);

    player.health = 0;
    assert_eq!(update_health_lives(&mut player), VitalsChange::LostLife);
    assert_eq!((player.lives, player.health), (0, 10));

    player.health = -3;
    assert_eq!(update_health_lives(&mut player), VitalsChange::OutOfLives);
    assert_eq!(player.lives, -1);
}

#[test]
fn test_outcome_flags() {
    assert!(!GameOutcome::InProgress.is_over());
    assert!(GameOutcome::LevelCompleted.is_over());
    assert!(GameOutcome::PlayerLost.is_over());
}

// ============================================================================
// Enemy state machine
// ============================================================================

const HALF: Vec2 = Vec2::splat(5.0);

fn enemy(state: EnemyState) -> Enemy2D {
    let mut enemy = Enemy2D::new(Vec2::new(-1.0, 0.0), 40.0, 150.0);
    enemy.state = state;
    enemy
}

#[test]
fn test_idle_switches_to_patrol_after_counter_expires() {
    let map = TileMap::new(1, 10, 10, Vec2::splat(TILE));
    let mut finder = PathFinder::new(false);
    let mut enemy = enemy(EnemyState::Idle);
    let far = Vec2::new(95.0, 95.0);

    for _ in 0..=FSM_MAX_COUNTER {
        enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), far, HALF);
        assert_eq!(enemy.state, EnemyState::Idle);
    }
    enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), far, HALF);
    assert_eq!(enemy.state, EnemyState::Patrol);
    assert_eq!(enemy.counter, 1);
}

#[test]
fn test_patrol_walks_in_facing_direction() {
    let map = TileMap::new(1, 10, 10, Vec2::splat(TILE));
    let mut finder = PathFinder::new(false);
    let mut enemy = enemy(EnemyState::Patrol);

    let intent = enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), Vec2::new(95.0, 95.0), HALF);
    assert_eq!(intent, EnemyIntent { walk: Vec2::new(-40.0, 0.0), jump: false });

    enemy.flip_horizontal();
    let intent = enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), Vec2::new(95.0, 95.0), HALF);
    assert_eq!(intent.walk, Vec2::new(40.0, 0.0));
}

#[test]
fn test_patrol_spots_player_in_range() {
    let map = TileMap::new(1, 10, 10, Vec2::splat(TILE));
    let mut finder = PathFinder::new(false);
    let mut enemy = enemy(EnemyState::Patrol);

    enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), Vec2::new(45.0, 15.0), HALF);
    assert_eq!(enemy.state, EnemyState::Attack);
}

#[test]
fn test_attack_follows_first_waypoint() {
    let map = TileMap::new(1, 10, 10, Vec2::splat(TILE));
    let mut finder = PathFinder::new(false);
    let mut enemy = enemy(EnemyState::Attack);

    let intent = enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), Vec2::new(45.0, 15.0), HALF);
    assert_eq!(enemy.direction, Vec2::new(1.0, 0.0));
    assert_eq!(intent, EnemyIntent { walk: Vec2::new(40.0, 0.0), jump: false });

    let intent = enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), Vec2::new(15.0, 45.0), HALF);
    assert_eq!(intent, EnemyIntent { walk: Vec2::ZERO, jump: true }, "player overhead");
}

#[test]
fn test_straight_run_stops_at_first_turn() {
    let start = TilePos::new(1, 1);
    let path = [TilePos::new(2, 1), TilePos::new(3, 1), TilePos::new(4, 1), TilePos::new(4, 2), TilePos::new(5, 2)];
    assert_eq!(enemy::straight_run_end(start, &path), Some(TilePos::new(4, 1)));

    let climb = [TilePos::new(1, 2), TilePos::new(2, 2)];
    assert_eq!(enemy::straight_run_end(start, &climb), Some(TilePos::new(1, 2)));
    assert_eq!(enemy::straight_run_end(start, &[]), None);
}

#[test]
fn test_attack_chases_to_end_of_straight_run() {
    let map = TileMap::new(1, 10, 10, Vec2::splat(TILE));
    let mut finder = PathFinder::new(false);
    let mut enemy = enemy(EnemyState::Attack);

    let intent = enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), Vec2::new(45.0, 15.0), HALF);
    assert_eq!(enemy.destination, Some(TilePos::new(4, 1)), "open floor runs up to the player");
    assert_eq!(enemy.direction, Vec2::new(1.0, 0.0));
    assert_eq!(intent.walk, Vec2::new(40.0, 0.0));
}

#[test]
fn test_attack_gives_up_after_counter_expires() {
    let map = TileMap::new(1, 10, 10, Vec2::splat(TILE));
    let mut finder = PathFinder::new(false);
    let mut enemy = enemy(EnemyState::Attack);
    let far = Vec2::new(95.0, 95.0);

    for _ in 0..=FSM_MAX_COUNTER {
        enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), far, HALF);
    }
    assert_eq!(enemy.state, EnemyState::Attack);
    enemy.think(&map, &mut finder, Vec2::new(15.0, 15.0), far, HALF);
    assert_eq!(enemy.state, EnemyState::Patrol);
}

#[test]
fn test_contact_resets_enemy_to_idle() {
    let mut enemy = enemy(EnemyState::Attack);
    enemy.counter = 12;

    assert!(!enemy.check_contact(Vec2::new(15.0, 15.0), Vec2::new(45.0, 15.0), HALF));
    assert_eq!(enemy.state, EnemyState::Attack);

    assert!(enemy.check_contact(Vec2::new(15.0, 15.0), Vec2::new(25.0, 15.0), HALF));
    assert_eq!((enemy.state, enemy.counter), (EnemyState::Idle, 0));
}
