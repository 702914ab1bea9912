//! Wave timing, spawn budgets and the live enemy cap

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::drop::LootKind;
use super::enemy::{EnemyTier, SPAWN_Y};
use super::rng::GameRng;
use crate::consts::{MAX_ENEMIES, MAX_ENEMIES_HARD_CAP, SCREEN_WIDTH};

pub const WAVE_DURATION_MS: f32 = 60_000.0;
pub const MIN_SPAWN_INTERVAL_MS: f32 = 150.0;
/// Horizontal inset of the spawn band
pub const SPAWN_MARGIN: f32 = 50.0;

/// Live enemies allowed on `wave`
pub fn enemy_cap(wave: u32) -> usize {
    (MAX_ENEMIES + wave as usize / 3).min(MAX_ENEMIES_HARD_CAP)
}

pub fn spawn_interval_ms(wave: u32) -> f32 {
    (800.0 - 50.0 * wave as f32).max(MIN_SPAWN_INTERVAL_MS)
}

pub fn spawn_budget(wave: u32) -> u32 {
    1 + wave
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePhase {
    Spawning,
    /// Budget exhausted, waiting for the field to clear
    Draining,
    Complete { early: bool },
}

/// Where and what to spawn next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    pub pos: Vec2,
    pub tier: EnemyTier,
    pub guaranteed_drop: Option<LootKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveState {
    pub number: u32,
    pub started_at_ms: f32,
    pub duration_ms: f32,
    pub spawn_budget: u32,
    pub spawned: u32,
    pub spawn_interval_ms: f32,
    pub last_spawn_ms: f32,
}

impl WaveState {
    pub fn new(number: u32, now_ms: f32) -> Self {
        Self {
            number,
            started_at_ms: now_ms,
            duration_ms: WAVE_DURATION_MS,
            spawn_budget: spawn_budget(number),
            spawned: 0,
            spawn_interval_ms: spawn_interval_ms(number),
            last_spawn_ms: now_ms,
        }
    }

    pub fn remaining_ms(&self, now_ms: f32) -> f32 {
        (self.duration_ms - (now_ms - self.started_at_ms)).max(0.0)
    }

    pub fn phase(&self, live_enemies: usize, now_ms: f32) -> WavePhase {
        let exhausted = self.spawned >= self.spawn_budget;
        if now_ms - self.started_at_ms >= self.duration_ms {
            WavePhase::Complete { early: false }
        } else if exhausted && live_enemies == 0 {
            WavePhase::Complete { early: true }
        } else if exhausted {
            WavePhase::Draining
        } else {
            WavePhase::Spawning
        }
    }

    /// Move on to the next wave, resetting every counter
    pub fn advance(&mut self, now_ms: f32) {
        *self = Self::new(self.number + 1, now_ms);
    }

    /// Decide whether an enemy spawns this frame.
    ///
    /// The interval timer restarts on every attempt, including attempts
    /// skipped because the field is at capacity.
    pub fn try_spawn(&mut self, live_enemies: usize, now_ms: f32, rng: &mut GameRng) -> Option<SpawnPlan> {
        if self.spawned >= self.spawn_budget || now_ms - self.last_spawn_ms < self.spawn_interval_ms {
            return None;
        }
        self.last_spawn_ms = now_ms;
        if live_enemies >= enemy_cap(self.number) {
            return None;
        }

        let x = rng.unit() * (SCREEN_WIDTH - 2.0 * SPAWN_MARGIN) + SPAWN_MARGIN;
        let guaranteed_drop = LootKind::roll_guaranteed(rng);
        let is_last = self.spawned + 1 == self.spawn_budget;
        self.spawned += 1;

        Some(SpawnPlan {
            pos: Vec2::new(x, SPAWN_Y),
            tier: EnemyTier::for_spawn(self.number, is_last),
            guaranteed_drop,
        })
    }
}
