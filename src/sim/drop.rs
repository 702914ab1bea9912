//! Collectible drops and loot rolls

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cards::CardId;
use super::collision::within_reach;
use super::rng::GameRng;
use super::terrain::Terrain;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const DROP_SIZE: f32 = 16.0;
pub const MAGNET_RANGE: f32 = 60.0;
pub const MAGNET_FORCE: f32 = 0.3;
pub const MAX_BOUNCES: u32 = 3;
pub const PICKUP_REACH: f32 = 20.0;

/// Share of spawns that carry a guaranteed drop
pub const GUARANTEED_DROP_CHANCE: f32 = 0.15;

/// What a dead enemy leaves behind, before any card is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootKind {
    Health,
    Chest,
    Bomb,
    Card,
}

impl LootKind {
    /// Tint of an enemy carrying this loot
    pub fn carrier_color(self) -> u32 {
        match self {
            LootKind::Health => 0x00ff00,
            LootKind::Chest => 0xffaa00,
            LootKind::Bomb => 0xff4444,
            LootKind::Card => 0xaa44ff,
        }
    }

    /// Random loot for an ordinary kill. Each roll only happens when the
    /// previous one failed.
    pub fn roll(rng: &mut GameRng) -> Option<LootKind> {
        if rng.chance(0.1) {
            Some(LootKind::Health)
        } else if rng.chance(0.05) {
            Some(LootKind::Chest)
        } else if rng.chance(0.02) {
            Some(LootKind::Bomb)
        } else if rng.chance(0.033) {
            Some(LootKind::Card)
        } else {
            None
        }
    }

    /// Guaranteed drop assignment for a fresh spawn
    pub fn roll_guaranteed(rng: &mut GameRng) -> Option<LootKind> {
        if !rng.chance(GUARANTEED_DROP_CHANCE) {
            return None;
        }
        let kind = rng.unit();
        Some(if kind < 0.4 {
            LootKind::Health
        } else if kind < 0.7 {
            LootKind::Chest
        } else if kind < 0.9 {
            LootKind::Bomb
        } else {
            LootKind::Card
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropKind {
    Health,
    Chest,
    Bomb,
    /// Card rolled when the drop is created
    Card(CardId),
}

impl DropKind {
    pub fn from_loot(loot: LootKind, rng: &mut GameRng) -> Self {
        match loot {
            LootKind::Health => DropKind::Health,
            LootKind::Chest => DropKind::Chest,
            LootKind::Bomb => DropKind::Bomb,
            LootKind::Card => DropKind::Card(CardId::ALL[rng.index(CardId::ALL.len())]),
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            DropKind::Health => LootKind::Health.carrier_color(),
            DropKind::Chest => LootKind::Chest.carrier_color(),
            DropKind::Bomb => LootKind::Bomb.carrier_color(),
            DropKind::Card(_) => LootKind::Card.carrier_color(),
        }
    }
}

/// Result of moving a drop for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropStep {
    Resting,
    /// The player touched it this frame
    Collected,
    /// Fell or drifted out of the play area
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drop {
    pub kind: DropKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub bounces: u32,
}

impl Drop {
    pub fn new(kind: DropKind, pos: Vec2, rng: &mut GameRng) -> Self {
        Self {
            kind,
            pos,
            vel: Vec2::new(rng.jitter(2.0), -1.0),
            bounces: 0,
        }
    }

    pub fn update(&mut self, player: Vec2, terrain: &Terrain) -> DropStep {
        let settled = self.bounces >= MAX_BOUNCES;
        if !settled {
            self.vel.y += if self.bounces > 0 { 0.3 } else { 0.1 };
        }

        let to_player = player - self.pos;
        let d = to_player.length();
        if d > 0.0 && d < MAGNET_RANGE {
            self.vel += to_player / d * MAGNET_FORCE;
        }

        self.pos += self.vel;

        let ground = terrain.height_at(self.pos.x);
        let half = DROP_SIZE / 2.0;
        if self.pos.y + half >= ground && self.vel.y > 0.0 {
            self.pos.y = ground - half;
            if settled {
                self.vel.y = 0.0;
            } else {
                self.vel.y *= -0.6;
                self.vel.x *= 0.8;
                self.bounces += 1;
                if self.bounces >= MAX_BOUNCES {
                    self.vel = Vec2::ZERO;
                }
            }
        }

        if within_reach(player, self.pos, PICKUP_REACH) {
            return DropStep::Collected;
        }

        let inside = self.pos.x > -50.0 && self.pos.x < SCREEN_WIDTH + 50.0 && self.pos.y < SCREEN_HEIGHT + 50.0;
        if inside { DropStep::Resting } else { DropStep::Lost }
    }
}
