use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::game::pathfinding::{Heuristic, PathFinder};
use crate::game::tile_map::{TileMap, TilePos};

/// Frames an enemy lingers in a state before its timed transition.
pub const FSM_MAX_COUNTER: u32 = 60;
/// Attack range as a multiple of the enemy's half-size length.
pub const ATTACK_RANGE_SCALE: f32 = 10.0;
/// Contact range as a multiple of the enemy's half-size length.
pub const CONTACT_RANGE_SCALE: f32 = 2.0;
/// Heuristic weight used when chasing the player.
pub const CHASE_HEURISTIC_WEIGHT: u32 = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    #[default]
    Idle,
    Patrol,
    Attack,
}

/// Movement request produced by [`Enemy2D::think`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyIntent {
    pub walk: Vec2,
    pub jump: bool,
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Enemy2D {
    pub state: EnemyState,
    pub counter: u32,
    /// Facing while patrolling, or heading toward the next waypoint while
    /// attacking. Only the signs are used for movement.
    pub direction: Vec2,
    /// Last waypoint of the straight run currently being chased.
    pub destination: Option<TilePos>,
    pub walk_speed: f32,
    pub jump_speed: f32,
}

impl Enemy2D {
    pub fn new(direction: Vec2, walk_speed: f32, jump_speed: f32) -> Self {
        Self {
            state: EnemyState::Idle,
            counter: 0,
            direction,
            destination: None,
            walk_speed,
            jump_speed,
        }
    }

    fn enter(&mut self, state: EnemyState) {
        debug!("[PLATFORMER] Enemy {:?} -> {:?}", self.state, state);
        self.state = state;
        self.counter = 0;
    }

    /// Run one frame of the state machine and return the movement request.
    pub fn think(
        &mut self,
        map: &TileMap,
        finder: &mut PathFinder,
        position: Vec2,
        player_position: Vec2,
        half_size: Vec2,
    ) -> EnemyIntent {
        let in_range = position.distance(player_position) <= half_size.length() * ATTACK_RANGE_SCALE;

        match self.state {
            EnemyState::Idle => {
                if self.counter > FSM_MAX_COUNTER {
                    self.enter(EnemyState::Patrol);
                }
                self.counter += 1;
                EnemyIntent::default()
            }
            EnemyState::Patrol => {
                let intent = if self.counter > FSM_MAX_COUNTER {
                    self.enter(EnemyState::Idle);
                    EnemyIntent::default()
                } else if in_range {
                    self.enter(EnemyState::Attack);
                    EnemyIntent::default()
                } else {
                    self.walk_intent()
                };
                self.counter += 1;
                intent
            }
            EnemyState::Attack => {
                if in_range {
                    if let (Some(start), Some(goal)) =
                        (map.tile_at_position(position), map.tile_at_position(player_position))
                    {
                        let path = finder.find_path(map, start, goal, Heuristic::Euclidean, CHASE_HEURISTIC_WEIGHT);
                        if let Some(destination) = straight_run_end(start, &path) {
                            self.direction = direction_between(start, destination);
                            self.destination = Some(destination);
                        }
                        return self.walk_intent();
                    }
                    EnemyIntent::default()
                } else {
                    if self.counter > FSM_MAX_COUNTER {
                        self.enter(EnemyState::Patrol);
                    }
                    self.counter += 1;
                    EnemyIntent::default()
                }
            }
        }
    }

    fn walk_intent(&self) -> EnemyIntent {
        let walk_x = if self.direction.x < 0.0 {
            -self.walk_speed
        } else if self.direction.x > 0.0 {
            self.walk_speed
        } else {
            0.0
        };
        EnemyIntent {
            walk: Vec2::new(walk_x, 0.0),
            jump: self.direction.y > 0.0,
        }
    }

    /// Reverse the patrol direction after walking into a wall.
    pub fn flip_horizontal(&mut self) {
        self.direction.x = -self.direction.x;
    }

    /// Close enough to touch the player. Contact sends the enemy back to Idle.
    pub fn check_contact(&mut self, position: Vec2, player_position: Vec2, half_size: Vec2) -> bool {
        if position.distance(player_position) <= half_size.length() * CONTACT_RANGE_SCALE {
            self.enter(EnemyState::Idle);
            return true;
        }
        false
    }
}

/// Unit direction between two tiles, zero if they coincide.
pub fn direction_between(from: TilePos, to: TilePos) -> Vec2 {
    let delta = Vec2::new(to.x as f32 - from.x as f32, to.y as f32 - from.y as f32);
    delta.normalize_or_zero()
}

/// Follow `path` from `start` while the waypoints stay on the ray through
/// the first one, and return the last waypoint on that ray.
pub fn straight_run_end(start: TilePos, path: &[TilePos]) -> Option<TilePos> {
    let (&first, rest) = path.split_first()?;
    let offset = |tile: TilePos| (tile.x as i64 - start.x as i64, tile.y as i64 - start.y as i64);
    let heading = offset(first);

    let mut end = first;
    for &tile in rest {
        let (dx, dy) = offset(tile);
        let collinear = dx * heading.1 == dy * heading.0;
        let ahead = dx * heading.0 + dy * heading.1 > 0;
        if !(collinear && ahead) {
            break;
        }
        end = tile;
    }
    Some(end)
}
