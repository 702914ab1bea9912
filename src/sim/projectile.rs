//! Player-side projectiles
//!
//! One struct for every variant. `advance` runs the shared kinematics and
//! lifetime rules plus the per-kind steering and bounce hooks. Enemy hits
//! are resolved by the combat pass.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Hitbox, projectile_hits, reflect_off_floor, reflect_off_wall};
use super::enemy::Enemy;
use super::terrain::Terrain;
use crate::consts::{MAX_TRAIL_LENGTH, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::{angle_between, direction, steer_toward};

pub const PROJECTILE_SPEED: f32 = 2.0;
pub const PROJECTILE_SIZE: f32 = 8.0;
/// Frames
pub const PROJECTILE_LIFETIME: i32 = 600;
/// Distance past the screen edge before a projectile is dropped
pub const OFFSCREEN_MARGIN: f32 = 50.0;

pub const HOMING_RANGE: f32 = 200.0;
pub const HOMING_TURN_RATE: f32 = 0.1;
/// Frames between homing target searches
pub const HOMING_RETARGET_FRAMES: i32 = 5;

pub const EXPLOSION_RADIUS: f32 = 50.0;
pub const EXPLOSION_DAMAGE_FACTOR: f32 = 0.7;
pub const RICOCHET_DAMAGE_FACTOR: f32 = 0.7;
pub const DEATH_BURST_DAMAGE_FACTOR: f32 = 0.4;
pub const WISP_DAMAGE_FACTOR: f32 = 0.25;

pub const WISP_COLOR: u32 = 0x88ffff;
pub const DEATH_BURST_COLOR: u32 = 0xffaa44;

/// Per-variant behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Plain,
    /// Target is an enemy id
    Homing { target: Option<u32>, explosive: bool },
    Explosive,
    Ricochet { bounces: u32, max_bounces: u32 },
    /// Fired by the companion
    Wisp,
    /// Released radially when a projectile kills an enemy
    DeathBurst,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub damage: f32,
    pub lifetime: i32,
    pub size: f32,
    pub color: u32,
    pub piercing: bool,
    pub kind: ProjectileKind,
    /// Recent positions for rendering (oldest first)
    pub trail: Vec<Vec2>,
}

impl Projectile {
    pub fn new(pos: Vec2, angle: f32, damage: f32, color: u32, kind: ProjectileKind) -> Self {
        Self {
            pos,
            angle,
            speed: PROJECTILE_SPEED,
            damage,
            lifetime: PROJECTILE_LIFETIME,
            size: PROJECTILE_SIZE,
            color,
            piercing: false,
            kind,
            trail: Vec::with_capacity(MAX_TRAIL_LENGTH),
        }
    }

    pub fn wisp(pos: Vec2, angle: f32, damage: f32) -> Self {
        Self::new(pos, angle, damage, WISP_COLOR, ProjectileKind::Wisp)
    }

    /// Fragment of a killing projectile; takes 40% of its damage
    pub fn death_burst(pos: Vec2, angle: f32, source_damage: f32) -> Self {
        Self::new(
            pos,
            angle,
            source_damage * DEATH_BURST_DAMAGE_FACTOR,
            DEATH_BURST_COLOR,
            ProjectileKind::DeathBurst,
        )
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::square(self.pos, self.size)
    }

    pub fn hits(&self, enemy: &Enemy) -> bool {
        projectile_hits(&self.hitbox(), &enemy.hitbox())
    }

    /// Whether termination triggers an area burst
    pub fn explodes(&self) -> bool {
        matches!(
            self.kind,
            ProjectileKind::Explosive | ProjectileKind::Homing { explosive: true, .. }
        )
    }

    /// Any enemy contact ends a ricochet shot, piercing or not
    pub fn stops_on_hit(&self) -> bool {
        !self.piercing || matches!(self.kind, ProjectileKind::Ricochet { .. })
    }

    /// Move one frame. Returns `false` once the projectile expires, leaves
    /// the play area, or runs out of bounces.
    pub fn advance(&mut self, enemies: &[Enemy], terrain: &Terrain) -> bool {
        if let ProjectileKind::Homing { target, .. } = &mut self.kind {
            if self.lifetime % HOMING_RETARGET_FRAMES == 0 {
                *target = nearest_enemy_within(enemies, self.pos, HOMING_RANGE);
            }
            let aim = target.and_then(|id| enemies.iter().find(|e| e.id == id && !e.killed));
            if let Some(enemy) = aim {
                let wanted = angle_between(self.pos, enemy.pos);
                self.angle = steer_toward(self.angle, wanted, HOMING_TURN_RATE);
            }
        }

        if self.lifetime % 2 == 0 {
            self.trail.push(self.pos);
            if self.trail.len() > MAX_TRAIL_LENGTH {
                self.trail.remove(0);
            }
        }

        self.pos += direction(self.angle) * self.speed;
        self.lifetime -= 1;

        if let ProjectileKind::Ricochet {
            bounces,
            max_bounces,
        } = &mut self.kind
        {
            let mut bounced = false;
            if self.pos.x <= 0.0 || self.pos.x >= SCREEN_WIDTH {
                self.angle = reflect_off_wall(self.angle);
                self.pos.x = self.pos.x.clamp(0.0, SCREEN_WIDTH);
                bounced = true;
            }
            if self.pos.y <= 0.0 {
                self.angle = reflect_off_floor(self.angle);
                self.pos.y = 0.0;
                bounced = true;
            }
            let ground = terrain.height_at(self.pos.x);
            if self.pos.y >= ground {
                self.angle = reflect_off_floor(self.angle);
                self.pos.y = ground - 1.0;
                bounced = true;
            }
            if bounced {
                *bounces += 1;
                self.damage *= RICOCHET_DAMAGE_FACTOR;
                if *bounces >= *max_bounces || self.damage < 1.0 {
                    return false;
                }
            }
        }

        let in_play = self.pos.x >= -OFFSCREEN_MARGIN
            && self.pos.x <= SCREEN_WIDTH + OFFSCREEN_MARGIN
            && self.pos.y >= -OFFSCREEN_MARGIN
            && self.pos.y <= SCREEN_HEIGHT + OFFSCREEN_MARGIN;
        in_play && self.lifetime > 0
    }
}

/// Closest live enemy strictly within `range`
pub fn nearest_enemy_within(enemies: &[Enemy], from: Vec2, range: f32) -> Option<u32> {
    let limit = range * range;
    enemies
        .iter()
        .filter(|e| !e.killed)
        .map(|e| (e.id, e.pos.distance_squared(from)))
        .filter(|&(_, d)| d < limit)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Enemy;
    use proptest::prelude::*;

    fn flat() -> Terrain {
        Terrain::flat()
    }

    #[test]
    fn test_lifetime_strictly_decreases_until_expiry() {
        let mut p = Projectile::new(Vec2::new(640.0, 300.0), 0.0, 10.0, 0, ProjectileKind::Plain);
        p.speed = 0.0;
        let mut last = p.lifetime;
        let mut frames = 0;
        while p.advance(&[], &flat()) {
            assert!(p.lifetime < last);
            last = p.lifetime;
            frames += 1;
        }
        assert_eq!(p.lifetime, 0);
        assert_eq!(frames, PROJECTILE_LIFETIME - 1);
    }

    #[test]
    fn test_leaves_play_area() {
        let mut p = Projectile::new(Vec2::new(-49.0, 300.0), std::f32::consts::PI, 10.0, 0, ProjectileKind::Plain);
        assert!(!p.advance(&[], &flat()));
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut p = Projectile::new(Vec2::new(640.0, 300.0), 0.0, 10.0, 0, ProjectileKind::Plain);
        for _ in 0..40 {
            p.advance(&[], &flat());
        }
        assert_eq!(p.trail.len(), MAX_TRAIL_LENGTH);
    }

    #[test]
    fn test_homing_without_targets_flies_straight() {
        let start = Vec2::new(100.0, 300.0);
        let mut p = Projectile::new(
            start,
            0.0,
            10.0,
            0,
            ProjectileKind::Homing {
                target: None,
                explosive: false,
            },
        );
        // Enemy well outside the homing range
        let far = vec![Enemy::basic(1, Vec2::new(1000.0, 50.0), 0.0)];
        while p.advance(&far, &flat()) {
            assert_eq!(p.angle, 0.0);
            assert!((p.pos.y - start.y).abs() < 1e-3);
        }
    }

    #[test]
    fn test_homing_turns_toward_target() {
        let mut p = Projectile::new(
            Vec2::new(100.0, 300.0),
            0.0,
            10.0,
            0,
            ProjectileKind::Homing {
                target: None,
                explosive: false,
            },
        );
        // Straight below the projectile
        let enemies = vec![Enemy::basic(7, Vec2::new(100.0, 400.0), 0.0)];
        p.lifetime = 600;
        p.advance(&enemies, &flat());
        assert!(matches!(p.kind, ProjectileKind::Homing { target: Some(7), .. }));
        assert!((p.angle - HOMING_TURN_RATE).abs() < 1e-6);
    }

    #[test]
    fn test_ricochet_bounce_decays_damage() {
        let mut p = Projectile::new(
            Vec2::new(1.0, 300.0),
            std::f32::consts::PI,
            100.0,
            0,
            ProjectileKind::Ricochet {
                bounces: 0,
                max_bounces: 4,
            },
        );
        assert!(p.advance(&[], &flat()));
        assert!((p.damage - 70.0).abs() < 1e-4);
        assert!(matches!(p.kind, ProjectileKind::Ricochet { bounces: 1, .. }));
        // Heading now points right
        assert!(direction(p.angle).x > 0.0);
    }

    #[test]
    fn test_ricochet_terminates_at_max_bounces() {
        let mut p = Projectile::new(
            Vec2::new(1.0, 300.0),
            std::f32::consts::PI,
            100.0,
            0,
            ProjectileKind::Ricochet {
                bounces: 2,
                max_bounces: 3,
            },
        );
        assert!(!p.advance(&[], &flat()));
    }

    #[test]
    fn test_ricochet_terminates_when_damage_drops_below_one() {
        let mut p = Projectile::new(
            Vec2::new(1.0, 300.0),
            std::f32::consts::PI,
            1.2,
            0,
            ProjectileKind::Ricochet {
                bounces: 0,
                max_bounces: 10,
            },
        );
        assert!(!p.advance(&[], &flat()));
    }

    #[test]
    fn test_ricochet_bounces_off_terrain() {
        let terrain = flat();
        let ground = terrain.height_at(640.0);
        let mut p = Projectile::new(
            Vec2::new(640.0, ground - 1.0),
            std::f32::consts::FRAC_PI_2,
            50.0,
            0,
            ProjectileKind::Ricochet {
                bounces: 0,
                max_bounces: 5,
            },
        );
        assert!(p.advance(&[], &terrain));
        assert_eq!(p.pos.y, ground - 1.0);
        assert!(direction(p.angle).y < 0.0);
    }

    #[test]
    fn test_death_burst_damage_fraction() {
        let p = Projectile::death_burst(Vec2::ZERO, 0.0, 50.0);
        assert!((p.damage - 20.0).abs() < 1e-5);
        assert_eq!(p.color, DEATH_BURST_COLOR);
    }

    proptest! {
        #[test]
        fn prop_ricochet_damage_never_grows(angle in 0.0f32..std::f32::consts::TAU, x in 1.0f32..1279.0, y in 1.0f32..560.0) {
            let mut p = Projectile::new(
                Vec2::new(x, y),
                angle,
                80.0,
                0,
                ProjectileKind::Ricochet { bounces: 0, max_bounces: 6 },
            );
            let terrain = flat();
            let mut before = p.damage;
            for _ in 0..200 {
                if !p.advance(&[], &terrain) {
                    break;
                }
                prop_assert!(p.damage <= before);
                prop_assert!(p.damage == before || (p.damage - before * RICOCHET_DAMAGE_FACTOR).abs() < 1e-3);
                before = p.damage;
            }
        }
    }
}
