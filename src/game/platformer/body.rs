use bevy::prelude::*;
use crate::game::physics2d::{HorizontalStatus, Physics2D, VerticalStatus};
use crate::game::tile_collision::{constrain_to_map, CollisionResult, TileCollider};
use crate::game::tile_map::TileMap;

/// What happened to a body during one [`step_body`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Walked into a solid tile this frame.
    pub hit_wall: bool,
    /// Walked off a ledge and started falling.
    pub left_ground: bool,
    /// Hit a ceiling while rising.
    pub hit_ceiling: bool,
    /// Fell onto a solid tile or the bottom edge of the map.
    pub landed: bool,
    /// The position was clamped to the map boundary.
    pub clamped: bool,
}

/// Advance one platformer body by `dt` seconds.
///
/// Shared by the player and enemies. `walk_velocity` is the requested
/// velocity from input or AI; gravity-driven motion comes from `physics`.
/// The order of checks matters: the horizontal sweep may move `end.x`
/// before the vertical checks run against the same end position.
pub fn step_body(
    map: &TileMap,
    position: &mut Vec2,
    collider: &TileCollider,
    physics: &mut Physics2D,
    walk_velocity: Vec2,
    dt: f32,
) -> StepReport {
    let mut report = StepReport::default();

    let walking = walk_velocity != Vec2::ZERO;
    let horizontal = if walking { HorizontalStatus::Walk } else { HorizontalStatus::Idle };
    physics.set_horizontal_status(horizontal, false);

    let mut movement = walk_velocity;
    if physics.vertical_status().is_airborne() {
        physics.update(dt);
        movement += physics.final_velocity;

        if physics.vertical_status().is_rising() && physics.final_velocity.y < 0.0 {
            physics.set_vertical_status(VerticalStatus::Fall, false);
        }
    }

    let start = *position;
    let mut end = start + movement * dt;

    if physics.horizontal_status() == HorizontalStatus::Walk {
        match collider.check_horizontal(map, start, &mut end) {
            CollisionResult::Positive => {
                physics.set_horizontal_status(HorizontalStatus::Idle, false);
                report.hit_wall = true;
            }
            CollisionResult::Invalid => end.x = start.x,
            CollisionResult::Negative => {}
        }

        if physics.vertical_status() == VerticalStatus::Idle {
            let mut below = start - Vec2::new(0.0, collider.half_size.y);
            if collider.check_vertical(map, start, &mut below) == CollisionResult::Negative {
                physics.set_vertical_status(VerticalStatus::Fall, true);
                report.left_ground = true;
            }
        }
    }

    // Invalid vertical results fall through to the boundary clamp below
    if physics.vertical_status().is_rising()
        && collider.check_vertical(map, start, &mut end) == CollisionResult::Positive
    {
        physics.set_vertical_status(VerticalStatus::Fall, true);
        report.hit_ceiling = true;
    }

    if physics.vertical_status() == VerticalStatus::Fall
        && collider.check_vertical(map, start, &mut end) == CollisionResult::Positive
    {
        physics.set_vertical_status(VerticalStatus::Idle, true);
        report.landed = true;
    }

    *position = end;

    if constrain_to_map(map, position) {
        report.clamped = true;
        match physics.vertical_status() {
            VerticalStatus::Jump | VerticalStatus::DoubleJump => {
                physics.set_vertical_status(VerticalStatus::Fall, true);
            }
            VerticalStatus::Fall => {
                physics.set_vertical_status(VerticalStatus::Idle, true);
                report.landed = true;
            }
            VerticalStatus::Idle => {}
        }
    }

    report
}
