//! Environmental hazards unlocked by legendary cards
//!
//! Each kind has a trigger slot (active flag, level, last trigger time) and
//! its own list of live instances. Hazards only ever hurt enemies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::within_reach;
use super::combat::Combat;
use super::events::{GameEvent, sounds};
use super::terrain::Terrain;
use crate::consts::{GROUND_Y, SCREEN_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Lightning,
    Meteor,
    Thorn,
    Poison,
    Fire,
}

struct Schedule {
    base_ms: f32,
    floor_ms: f32,
    step_ms: f32,
    damage: f32,
    damage_per_level: f32,
}

impl HazardKind {
    pub const ALL: [HazardKind; 5] = [
        HazardKind::Lightning,
        HazardKind::Meteor,
        HazardKind::Thorn,
        HazardKind::Poison,
        HazardKind::Fire,
    ];

    fn schedule(self) -> Schedule {
        let (base_ms, floor_ms, step_ms, damage, damage_per_level) = match self {
            HazardKind::Lightning => (2000.0, 1000.0, 250.0, 30.0, 15.0),
            HazardKind::Meteor => (3000.0, 1500.0, 300.0, 40.0, 20.0),
            HazardKind::Thorn => (4000.0, 2000.0, 500.0, 25.0, 12.0),
            HazardKind::Poison => (5000.0, 3000.0, 600.0, 8.0, 4.0),
            HazardKind::Fire => (4500.0, 2500.0, 550.0, 20.0, 10.0),
        };
        Schedule {
            base_ms,
            floor_ms,
            step_ms,
            damage,
            damage_per_level,
        }
    }

    pub fn interval_ms(self, level: u32) -> f32 {
        let s = self.schedule();
        (s.base_ms - level as f32 * s.step_ms).max(s.floor_ms)
    }

    pub fn damage(self, level: u32) -> f32 {
        let s = self.schedule();
        s.damage + level as f32 * s.damage_per_level
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardSlot {
    pub active: bool,
    pub level: u32,
    pub last_trigger_ms: f32,
}

pub const LIGHTNING_FRAMES: u32 = 30;
pub const LIGHTNING_WIDTH: f32 = 8.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lightning {
    pub x: f32,
    pub damage: f32,
    pub frames_left: u32,
}

impl Lightning {
    fn update(&mut self, combat: &mut Combat) -> bool {
        self.frames_left = self.frames_left.saturating_sub(1);
        let half = LIGHTNING_WIDTH / 2.0;
        for i in 0..combat.enemies.len() {
            let e = &combat.enemies[i];
            if e.pos.x + e.size > self.x - half && e.pos.x < self.x + half {
                combat.damage_enemy(i, self.damage);
            }
        }
        self.frames_left > 0
    }
}

pub const METEOR_SPEED: f32 = 8.0;
pub const METEOR_CONTACT: f32 = 30.0;
pub const METEOR_BLAST_RADIUS: f32 = 60.0;
pub const METEOR_BLAST_FACTOR: f32 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meteor {
    pub pos: Vec2,
    pub target_y: f32,
    pub damage: f32,
    pub trail: Vec<Vec2>,
}

impl Meteor {
    fn update(&mut self, combat: &mut Combat) -> bool {
        self.pos.y += METEOR_SPEED;
        self.trail.push(self.pos);
        if self.trail.len() > 8 {
            self.trail.remove(0);
        }

        if self.pos.y >= self.target_y - 20.0 {
            self.explode(combat);
            return false;
        }

        // Every enemy touched on the impact frame takes the direct hit
        let mut struck = false;
        for i in 0..combat.enemies.len() {
            let enemy = &combat.enemies[i];
            if !enemy.killed && within_reach(enemy.pos, self.pos, METEOR_CONTACT) {
                combat.damage_enemy(i, self.damage);
                struck = true;
            }
        }
        if struck {
            self.explode(combat);
            return false;
        }
        true
    }

    fn explode(&self, combat: &mut Combat) {
        combat.damage_area(self.pos, METEOR_BLAST_RADIUS, self.damage * METEOR_BLAST_FACTOR);
    }
}

/// Upward growth followed by a fixed linger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pillar {
    pub x: f32,
    /// Ground line the pillar rises from
    pub base_y: f32,
    pub damage: f32,
    pub height: f32,
    pub growing: bool,
    pub linger_frames: u32,
    pub damage_timer: u32,
}

impl Pillar {
    fn new(x: f32, base_y: f32, damage: f32, linger_frames: u32) -> Self {
        Self {
            x,
            base_y,
            damage,
            height: 0.0,
            growing: true,
            linger_frames,
            damage_timer: 0,
        }
    }

    fn grow(&mut self, rate: f32, max_height: f32) {
        if self.growing && self.height < max_height {
            self.height += rate;
        } else {
            self.growing = false;
            self.linger_frames = self.linger_frames.saturating_sub(1);
        }
    }

    fn strike(&self, combat: &mut Combat, reach: f32) {
        let tip = self.base_y - self.height;
        for i in 0..combat.enemies.len() {
            let e = &combat.enemies[i];
            if (e.pos.x - self.x).abs() < reach && e.pos.y + e.size > tip {
                combat.damage_enemy(i, self.damage);
            }
        }
    }
}

pub const THORN_GROWTH: f32 = 4.0;
pub const THORN_MAX_HEIGHT: f32 = 80.0;
pub const THORN_LINGER: u32 = 180;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thorn(pub Pillar);

impl Thorn {
    fn update(&mut self, combat: &mut Combat) -> bool {
        self.0.grow(THORN_GROWTH, THORN_MAX_HEIGHT);
        if self.0.height > 20.0 {
            self.0.strike(combat, 25.0);
        }
        self.0.linger_frames > 0
    }
}

pub const FIRE_GROWTH: f32 = 5.0;
pub const FIRE_MAX_HEIGHT: f32 = 100.0;
pub const FIRE_LINGER: u32 = 240;
pub const FIRE_TICK_FRAMES: u32 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirePillar(pub Pillar);

impl FirePillar {
    fn update(&mut self, combat: &mut Combat) -> bool {
        self.0.grow(FIRE_GROWTH, FIRE_MAX_HEIGHT);
        self.0.damage_timer += 1;
        if self.0.damage_timer >= FIRE_TICK_FRAMES && self.0.height > 30.0 {
            self.0.damage_timer = 0;
            self.0.strike(combat, 30.0);
        }
        self.0.linger_frames > 0
    }
}

pub const POISON_START_RADIUS: f32 = 10.0;
pub const POISON_MAX_RADIUS: f32 = 50.0;
pub const POISON_LIFETIME: u32 = 300;
pub const POISON_TICK_FRAMES: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoisonCloud {
    pub pos: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub frames_left: u32,
    pub damage_timer: u32,
}

impl PoisonCloud {
    fn update(&mut self, combat: &mut Combat) -> bool {
        if self.radius < POISON_MAX_RADIUS {
            self.radius += 1.0;
        }
        self.frames_left = self.frames_left.saturating_sub(1);
        self.damage_timer += 1;
        if self.damage_timer >= POISON_TICK_FRAMES {
            self.damage_timer = 0;
            combat.damage_area(self.pos, self.radius, self.damage);
        }
        self.frames_left > 0
    }
}

/// Trigger slots plus live instances for every hazard kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hazards {
    slots: [HazardSlot; 5],
    pub lightning: Vec<Lightning>,
    pub meteors: Vec<Meteor>,
    pub thorns: Vec<Thorn>,
    pub poison: Vec<PoisonCloud>,
    pub fire: Vec<FirePillar>,
}

fn slot_index(kind: HazardKind) -> usize {
    match kind {
        HazardKind::Lightning => 0,
        HazardKind::Meteor => 1,
        HazardKind::Thorn => 2,
        HazardKind::Poison => 3,
        HazardKind::Fire => 4,
    }
}

impl Hazards {
    pub fn slot(&self, kind: HazardKind) -> &HazardSlot {
        &self.slots[slot_index(kind)]
    }

    pub(crate) fn activate(&mut self, kind: HazardKind, level: u32) {
        let slot = &mut self.slots[slot_index(kind)];
        slot.active = true;
        slot.level = level;
    }

    pub fn live_count(&self) -> usize {
        self.lightning.len() + self.meteors.len() + self.thorns.len() + self.poison.len() + self.fire.len()
    }

    /// Fire due triggers, then advance every live instance
    pub fn update(&mut self, combat: &mut Combat, terrain: &Terrain) {
        for kind in HazardKind::ALL {
            let slot = self.slots[slot_index(kind)];
            if !slot.active || combat.now_ms - slot.last_trigger_ms <= kind.interval_ms(slot.level) {
                continue;
            }
            self.slots[slot_index(kind)].last_trigger_ms = combat.now_ms;
            self.trigger(kind, slot.level, combat, terrain);
        }

        self.lightning.retain_mut(|h| h.update(combat));
        self.meteors.retain_mut(|h| h.update(combat));
        self.thorns.retain_mut(|h| h.update(combat));
        self.poison.retain_mut(|h| h.update(combat));
        self.fire.retain_mut(|h| h.update(combat));
    }

    fn trigger(&mut self, kind: HazardKind, level: u32, combat: &mut Combat, terrain: &Terrain) {
        let damage = kind.damage(level);
        let x = combat.rng.unit() * SCREEN_WIDTH;
        log::debug!("Hazard {kind:?} (level {level}) at x={x:.0}");
        match kind {
            HazardKind::Lightning => {
                self.lightning.push(Lightning {
                    x,
                    damage,
                    frames_left: LIGHTNING_FRAMES,
                });
                let pitch = 800.0 + combat.rng.unit() * 400.0;
                combat.events.push(GameEvent::Sound(sounds::lightning(pitch)));
            }
            HazardKind::Meteor => self.meteors.push(Meteor {
                pos: Vec2::new(x, -50.0),
                target_y: GROUND_Y,
                damage,
                trail: Vec::new(),
            }),
            HazardKind::Thorn => {
                self.thorns.push(Thorn(Pillar::new(x, terrain.height_at(x), damage, THORN_LINGER)));
            }
            HazardKind::Poison => {
                let y = combat.rng.unit() * (GROUND_Y - 100.0) + 50.0;
                self.poison.push(PoisonCloud {
                    pos: Vec2::new(x, y),
                    damage,
                    radius: POISON_START_RADIUS,
                    frames_left: POISON_LIFETIME,
                    damage_timer: 0,
                });
            }
            HazardKind::Fire => {
                self.fire.push(FirePillar(Pillar::new(x, terrain.height_at(x), damage, FIRE_LINGER)));
            }
        }
    }
}
