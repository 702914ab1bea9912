//! Shared player stat record
//!
//! Read everywhere, written only by the card engine (`cards::apply`),
//! construction, and the nightmare setup. Every flag/level pair is declared
//! up front and defaults to inactive.

use serde::{Deserialize, Serialize};

use crate::consts::PLAYER_SPEED;

/// Weapon archetype chosen before the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weapon {
    /// Straight shots, full damage
    #[default]
    Wizard,
    /// Homing shots at 85% damage
    Emerald,
    /// Three-way spread at 75% damage
    Trident,
    /// Always-explosive shots at 130% damage
    Boom,
}

/// How one trigger pull turns into projectiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotPattern {
    pub count: u32,
    pub spread: f32,
    pub damage_mult: f32,
    pub color: u32,
    pub homing: bool,
    pub always_explosive: bool,
}

/// Color used by every non-Boom weapon while the explosive card is held
pub const EXPLOSIVE_COLOR: u32 = 0xff4444;

impl Weapon {
    pub const ALL: [Weapon; 4] = [Weapon::Wizard, Weapon::Emerald, Weapon::Trident, Weapon::Boom];

    pub fn pattern(self, stats: &PlayerStats) -> ShotPattern {
        let multishot = stats.multishot.max(1);
        let tint = |color: u32| if stats.explosive { EXPLOSIVE_COLOR } else { color };
        match self {
            Weapon::Wizard => ShotPattern {
                count: multishot,
                spread: 0.1,
                damage_mult: 1.0,
                color: tint(0x44aaff),
                homing: false,
                always_explosive: false,
            },
            Weapon::Emerald => ShotPattern {
                count: multishot,
                spread: 0.1,
                damage_mult: 0.85,
                color: tint(0x44ff44),
                homing: true,
                always_explosive: false,
            },
            Weapon::Trident => ShotPattern {
                count: 3 + (multishot - 1),
                spread: 0.15,
                damage_mult: 0.75,
                color: tint(0xffaa44),
                homing: false,
                always_explosive: false,
            },
            Weapon::Boom => ShotPattern {
                count: multishot,
                spread: 0.1,
                damage_mult: 1.3,
                color: EXPLOSIVE_COLOR,
                homing: false,
                always_explosive: true,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weapon::Wizard => "wizard",
            Weapon::Emerald => "emerald",
            Weapon::Trident => "trident",
            Weapon::Boom => "boom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wizard" => Some(Weapon::Wizard),
            "emerald" => Some(Weapon::Emerald),
            "trident" => Some(Weapon::Trident),
            "boom" => Some(Weapon::Boom),
            _ => None,
        }
    }
}

/// Hat trait chosen before the run; scales base stats once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Hat {
    #[default]
    Wizard,
    Helmet,
    Propeller,
    Challenger,
}

impl Hat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hat::Wizard => "wizard",
            Hat::Helmet => "helmet",
            Hat::Propeller => "propeller",
            Hat::Challenger => "challenger",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wizard" => Some(Hat::Wizard),
            "helmet" => Some(Hat::Helmet),
            "propeller" => Some(Hat::Propeller),
            "challenger" => Some(Hat::Challenger),
            _ => None,
        }
    }
}

/// An on/off modifier with a stacking level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Perk {
    pub active: bool,
    pub level: u32,
}

impl Perk {
    pub(crate) fn set(&mut self, level: u32) {
        self.active = true;
        self.level = level;
    }
}

/// Values every absolute card effect is recomputed from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub damage: f32,
    pub speed: f32,
    pub fire_rate_ms: f32,
    pub max_health: f32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            damage: 40.0,
            speed: PLAYER_SPEED,
            fire_rate_ms: 1000.0,
            max_health: 120.0,
        }
    }
}

impl BaseStats {
    pub fn for_hat(hat: Hat) -> Self {
        let mut base = Self::default();
        match hat {
            Hat::Wizard => {}
            Hat::Helmet => {
                base.max_health *= 1.5;
                base.speed *= 0.8;
            }
            Hat::Propeller => base.speed *= 1.3,
            Hat::Challenger => base.damage *= 1.2,
        }
        base
    }
}

/// Levels of the cards whose effects combine multiplicatively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StackLevels {
    pub growth: u32,
    pub swiftness: u32,
    pub vitality: u32,
    pub cadence: u32,
    pub burst: u32,
    pub shield: u32,
    pub giant: u32,
}

/// Upper bound for damage reduction
pub const MAX_DAMAGE_REDUCTION: f32 = 0.9;
/// Fastest allowed fire rate
pub const MIN_FIRE_RATE_MS: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub base: BaseStats,
    pub stacks: StackLevels,

    pub damage: f32,
    pub speed: f32,
    pub fire_rate_ms: f32,
    pub max_health: f32,
    pub multishot: u32,
    /// HP restored per kill
    pub lifesteal: f32,
    /// Fraction of incoming damage ignored, in [0, 0.9]
    pub damage_reduction: f32,

    pub explosive: bool,
    pub piercing: bool,
    pub ricochet: Perk,
    pub explosive_death: Perk,
    pub magnetism: Perk,
    pub berserker: Perk,
    pub time_freeze: Perk,
    pub time_freeze_chance: f32,
    pub vampiric: Perk,
    /// Declared hook; no consumer in the simulation
    pub nexus: Perk,
    /// Declared hook; no consumer in the simulation
    pub ascension: Perk,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self::new(BaseStats::default())
    }
}

impl PlayerStats {
    pub fn new(base: BaseStats) -> Self {
        Self {
            base,
            stacks: StackLevels::default(),
            damage: base.damage,
            speed: base.speed,
            fire_rate_ms: base.fire_rate_ms,
            max_health: base.max_health,
            multishot: 1,
            lifesteal: 0.0,
            damage_reduction: 0.0,
            explosive: false,
            piercing: false,
            ricochet: Perk::default(),
            explosive_death: Perk::default(),
            magnetism: Perk::default(),
            berserker: Perk::default(),
            time_freeze: Perk::default(),
            time_freeze_chance: 0.0,
            vampiric: Perk::default(),
            nexus: Perk::default(),
            ascension: Perk::default(),
        }
    }

    pub fn for_hat(hat: Hat) -> Self {
        Self::new(BaseStats::for_hat(hat))
    }

    /// Rebuild derived stats from base values and stack levels.
    /// Returns the change in max health so callers can adjust current health.
    pub(crate) fn recompute(&mut self) -> f32 {
        let s = self.stacks;
        let giant_damage = 2f32.powi(s.giant as i32);
        let giant_health = 1.5f32.powi(s.giant as i32);

        self.damage = self.base.damage * (1.0 + 0.2 * s.growth as f32) * giant_damage;
        self.speed = self.base.speed + s.swiftness as f32;
        self.fire_rate_ms = (self.base.fire_rate_ms
            * 0.8f32.powi(s.cadence as i32)
            * 0.5f32.powi(s.burst as i32))
        .max(MIN_FIRE_RATE_MS);
        self.set_damage_reduction(0.25 * s.shield as f32);

        let old_max = self.max_health;
        self.max_health = (self.base.max_health + 20.0 * s.vitality as f32) * giant_health;
        self.max_health - old_max
    }

    pub(crate) fn set_damage_reduction(&mut self, value: f32) {
        self.damage_reduction = value.clamp(0.0, MAX_DAMAGE_REDUCTION);
    }

    /// Scale base damage and max health (nightmare bonus), then recompute
    pub(crate) fn scale_base(&mut self, damage: f32, max_health: f32) -> f32 {
        self.base.damage *= damage;
        self.base.max_health *= max_health;
        self.recompute()
    }

    /// Shot damage multiplier from the berserker perk at the given health
    pub fn berserker_multiplier(&self, health: f32) -> f32 {
        if !self.berserker.active || self.max_health <= 0.0 {
            return 1.0;
        }
        let missing = (1.0 - health / self.max_health).clamp(0.0, 1.0);
        let quarters = (missing / 0.25).floor();
        1.0 + 0.5 * self.berserker.level as f32 * quarters
    }

    pub fn max_ricochets(&self) -> u32 {
        3 + self.ricochet.level
    }

    /// Mini-projectiles released when a projectile kills an enemy
    pub fn death_burst_count(&self) -> u32 {
        if self.explosive_death.active {
            5 + self.explosive_death.level
        } else {
            0
        }
    }

    /// (range, max turn per frame) for bending enemy projectiles
    pub fn magnet_pull(&self) -> Option<(f32, f32)> {
        if !self.magnetism.active {
            return None;
        }
        let level = self.magnetism.level;
        Some((20.0 + level as f32 * 10.0, 0.05 * level.max(1) as f32))
    }

    /// Fraction of dealt damage returned as health
    pub fn vampiric_fraction(&self) -> f32 {
        if self.vampiric.active {
            0.05 * self.vampiric.level as f32
        } else {
            0.0
        }
    }

    pub fn freeze_duration_ms(&self) -> f32 {
        (3 + self.time_freeze.level) as f32 * 1000.0
    }
}
