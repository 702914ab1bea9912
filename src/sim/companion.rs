//! Will-o-wisp companion: orbits the player and snipes the nearest enemy

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cards::companion_fire_rate_ms;
use super::enemy::Enemy;
use super::projectile::{Projectile, WISP_DAMAGE_FACTOR};
use super::stats::PlayerStats;
use crate::{angle_between, direction};

pub const ORBIT_DISTANCE: f32 = 40.0;
pub const ORBIT_SPEED: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Companion {
    pub pos: Vec2,
    pub orbit_angle: f32,
    pub level: u32,
    pub fire_rate_ms: f32,
    pub last_shot_ms: f32,
}

impl Companion {
    pub fn new(owner: Vec2) -> Self {
        Self {
            pos: owner + Vec2::new(ORBIT_DISTANCE, 0.0),
            orbit_angle: 0.0,
            level: 1,
            fire_rate_ms: companion_fire_rate_ms(1),
            last_shot_ms: 0.0,
        }
    }

    pub(crate) fn set_level(&mut self, level: u32) {
        self.level = level;
        self.fire_rate_ms = companion_fire_rate_ms(level);
    }

    /// Advance the orbit and fire if the cooldown allows
    pub fn update(
        &mut self,
        owner: Vec2,
        enemies: &[Enemy],
        stats: &PlayerStats,
        now_ms: f32,
    ) -> Option<Projectile> {
        self.orbit_angle += ORBIT_SPEED;
        self.pos = owner + direction(self.orbit_angle) * ORBIT_DISTANCE;

        if now_ms - self.last_shot_ms < self.fire_rate_ms {
            return None;
        }
        let target = enemies
            .iter()
            .filter(|e| !e.killed)
            .min_by(|a, b| {
                a.pos
                    .distance_squared(self.pos)
                    .total_cmp(&b.pos.distance_squared(self.pos))
            })?;

        self.last_shot_ms = now_ms;
        let damage = stats.damage * WISP_DAMAGE_FACTOR * self.level as f32;
        Some(Projectile::wisp(self.pos, angle_between(self.pos, target.pos), damage))
    }
}
