//! Seraph's Arena - a single-screen wave survival arcade game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (entities, combat, cards, waves)
//! - `audio`: Fire-and-forget sound sink for simulation sound requests
//! - `ranking`: Leaderboard sink/source boundary
//! - `settings`: Player preferences

pub mod audio;
pub mod ranking;
pub mod settings;
pub mod sim;

pub use ranking::{LocalRanking, RankingEntry, RankingError, RankingService, Submission};
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Screen dimensions (world units == canvas pixels)
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;
    /// Height of the ground band below the baseline
    pub const GROUND_HEIGHT: f32 = 150.0;
    /// Baseline ground line; hills only rise above it
    pub const GROUND_Y: f32 = SCREEN_HEIGHT - GROUND_HEIGHT;

    /// Nominal display refresh the per-frame constants were tuned for
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Longest delta a single frame may charge to the simulation
    pub const MAX_FRAME_DELTA_MS: f32 = 250.0;

    /// Player kinematics (per frame)
    pub const PLAYER_SPEED: f32 = 3.5;
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_FORCE: f32 = -12.0;

    /// Entity capacities
    pub const MAX_PROJECTILES: usize = 60;
    pub const MAX_ENEMIES: usize = 20;
    pub const MAX_ENEMIES_HARD_CAP: usize = 30;
    pub const MAX_TRAIL_LENGTH: usize = 5;
}

/// Wrap an angle difference into (-π, π]
#[inline]
pub fn wrap_angle_delta(mut delta: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while delta > PI {
        delta -= TAU;
    }
    while delta <= -PI {
        delta += TAU;
    }
    delta
}

/// Unit direction for an angle
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Turn `current` toward `target` by at most `max_turn` radians
#[inline]
pub fn steer_toward(current: f32, target: f32, max_turn: f32) -> f32 {
    let delta = wrap_angle_delta(target - current);
    current + delta.signum() * delta.abs().min(max_turn)
}
