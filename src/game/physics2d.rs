use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -300.0);

/// Vertical movement state. Order matters: `Idle` sorts below the airborne
/// states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VerticalStatus {
    #[default]
    Idle,
    Jump,
    DoubleJump,
    Fall,
}

impl VerticalStatus {
    pub fn is_airborne(self) -> bool {
        self != VerticalStatus::Idle
    }

    pub fn is_rising(self) -> bool {
        matches!(self, VerticalStatus::Jump | VerticalStatus::DoubleJump)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HorizontalStatus {
    #[default]
    Idle,
    Walk,
}

/// Constant-acceleration integrator driving jumps and falls.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Physics2D {
    pub initial_velocity: Vec2,
    pub final_velocity: Vec2,
    pub gravity: Vec2,
    pub displacement: Vec2,
    pub total_time: f32,
    vertical: VerticalStatus,
    horizontal: HorizontalStatus,
    new_jump: bool,
}

impl Default for Physics2D {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl Physics2D {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            initial_velocity: Vec2::ZERO,
            final_velocity: Vec2::ZERO,
            gravity,
            displacement: Vec2::ZERO,
            total_time: 0.0,
            vertical: VerticalStatus::Idle,
            horizontal: HorizontalStatus::Idle,
            new_jump: false,
        }
    }

    /// Zero the motion state. Gravity is kept.
    pub fn reset(&mut self) {
        self.initial_velocity = Vec2::ZERO;
        self.final_velocity = Vec2::ZERO;
        self.displacement = Vec2::ZERO;
        self.total_time = 0.0;
    }

    pub fn vertical_status(&self) -> VerticalStatus { self.vertical }
    pub fn horizontal_status(&self) -> HorizontalStatus { self.horizontal }

    /// Change the vertical status. A real change with `reset` set also
    /// zeroes the velocities.
    pub fn set_vertical_status(&mut self, status: VerticalStatus, reset: bool) {
        if self.vertical != status {
            if reset {
                self.reset();
            }
            self.vertical = status;
        }
    }

    pub fn set_horizontal_status(&mut self, status: HorizontalStatus, reset: bool) {
        if self.horizontal != status {
            if reset {
                self.reset();
            }
            self.horizontal = status;
        }
    }

    /// Start a jump from the ground, or a double jump from the first jump.
    /// Returns false if neither is possible in the current state.
    pub fn jump(&mut self, jump_velocity: Vec2) -> bool {
        let next = match self.vertical {
            VerticalStatus::Idle => VerticalStatus::Jump,
            VerticalStatus::Jump => VerticalStatus::DoubleJump,
            _ => return false,
        };
        self.set_vertical_status(next, true);
        self.initial_velocity = jump_velocity;
        self.new_jump = true;
        true
    }

    /// Integrate one step. Does nothing while vertically idle.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.vertical == VerticalStatus::Idle {
            return false;
        }

        self.total_time += dt;
        if self.new_jump {
            self.new_jump = false;
        } else {
            self.initial_velocity = self.final_velocity;
        }

        self.final_velocity = self.initial_velocity + dt * self.gravity;
        self.displacement = dt * self.final_velocity;
        true
    }
}
