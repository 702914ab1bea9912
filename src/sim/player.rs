//! The player character

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Hitbox;
use super::events::{GameEvent, sounds};
use super::projectile::{Projectile, ProjectileKind};
use super::stats::{PlayerStats, Weapon};
use super::terrain::Terrain;
use crate::angle_between;
use crate::consts::{GRAVITY, GROUND_Y, JUMP_FORCE, SCREEN_WIDTH};

pub const PLAYER_WIDTH: f32 = 18.0;
pub const PLAYER_HEIGHT: f32 = 22.0;
/// Horizontal velocity kept per frame without input
pub const FRICTION: f32 = 0.8;

/// Frames of invulnerability granted by the barrier card at `level`
pub fn barrier_frames(level: u32) -> u32 {
    300 + 150 * level.saturating_sub(1)
}

/// Movement intent for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: f32,
    pub facing_right: bool,
    pub grounded: bool,
    pub last_shot_ms: Option<f32>,
    /// Remaining invulnerability frames
    pub barrier_frames: u32,
    jump_held: bool,
    dead: bool,
}

impl Player {
    pub fn new(max_health: f32) -> Self {
        Self {
            pos: Vec2::new(SCREEN_WIDTH / 2.0, GROUND_Y - 50.0),
            vel: Vec2::ZERO,
            health: max_health,
            facing_right: true,
            grounded: false,
            last_shot_ms: None,
            barrier_frames: 0,
            jump_held: false,
            dead: false,
        }
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn has_barrier(&self) -> bool {
        self.barrier_frames > 0
    }

    /// Kinematics for one frame
    pub fn update(&mut self, controls: Controls, stats: &PlayerStats, terrain: &Terrain) {
        if controls.left {
            self.vel.x = -stats.speed;
            self.facing_right = false;
        } else if controls.right {
            self.vel.x = stats.speed;
            self.facing_right = true;
        } else {
            self.vel.x *= FRICTION;
        }

        // Jump only on the frame the button goes down
        let pressed = controls.jump && !self.jump_held;
        self.jump_held = controls.jump;
        if pressed && self.grounded {
            self.vel.y = JUMP_FORCE;
            self.grounded = false;
        }

        self.vel.y += GRAVITY;
        self.pos += self.vel;

        let half_w = PLAYER_WIDTH / 2.0;
        self.pos.x = self.pos.x.clamp(half_w, SCREEN_WIDTH - half_w);

        self.grounded = false;
        let ground = terrain.height_at(self.pos.x);
        if self.pos.y + PLAYER_HEIGHT / 2.0 >= ground {
            self.pos.y = ground - PLAYER_HEIGHT / 2.0;
            self.vel.y = 0.0;
            self.grounded = true;
        }
    }

    pub fn tick_barrier(&mut self) {
        self.barrier_frames = self.barrier_frames.saturating_sub(1);
    }

    pub fn can_fire(&self, now_ms: f32, stats: &PlayerStats) -> bool {
        self.last_shot_ms.is_none_or(|last| now_ms - last > stats.fire_rate_ms)
    }

    /// One trigger pull toward `aim`, spread evenly around the aim angle
    pub fn fire(
        &mut self,
        aim: Vec2,
        now_ms: f32,
        weapon: Weapon,
        stats: &PlayerStats,
        events: &mut Vec<GameEvent>,
    ) -> Vec<Projectile> {
        let pattern = weapon.pattern(stats);
        let base_angle = angle_between(self.pos, aim);
        let muzzle = Vec2::new(self.pos.x, self.pos.y - PLAYER_HEIGHT / 4.0);
        let damage = stats.damage * pattern.damage_mult * stats.berserker_multiplier(self.health);

        let kind = if pattern.always_explosive {
            ProjectileKind::Explosive
        } else if stats.ricochet.active {
            ProjectileKind::Ricochet {
                bounces: 0,
                max_bounces: stats.max_ricochets(),
            }
        } else if pattern.homing {
            ProjectileKind::Homing {
                target: None,
                explosive: stats.explosive,
            }
        } else if stats.explosive {
            ProjectileKind::Explosive
        } else {
            ProjectileKind::Plain
        };

        let center = (pattern.count as f32 - 1.0) / 2.0;
        let shots = (0..pattern.count)
            .map(|i| {
                let angle = base_angle + (i as f32 - center) * pattern.spread;
                let mut shot = Projectile::new(muzzle, angle, damage, pattern.color, kind);
                shot.piercing = stats.piercing;
                shot
            })
            .collect();

        self.last_shot_ms = Some(now_ms);
        events.push(GameEvent::Sound(sounds::PLAYER_SHOT));
        shots
    }

    /// Apply incoming damage. Returns `true` only on the hit that kills.
    pub fn take_damage(&mut self, amount: f32, stats: &PlayerStats, events: &mut Vec<GameEvent>) -> bool {
        if self.dead || self.has_barrier() {
            return false;
        }
        self.health -= amount * (1.0 - stats.damage_reduction);
        events.push(GameEvent::Sound(sounds::PLAYER_HURT));
        if self.health <= 0.0 {
            self.health = 0.0;
            self.dead = true;
        }
        events.push(GameEvent::HealthChanged {
            health: self.health,
            max_health: stats.max_health,
        });
        self.dead
    }

    pub fn heal(&mut self, amount: f32, max_health: f32, events: &mut Vec<GameEvent>) {
        if self.dead || amount <= 0.0 {
            return;
        }
        let healed = (self.health + amount).min(max_health);
        if healed != self.health {
            self.health = healed;
            events.push(GameEvent::HealthChanged {
                health: self.health,
                max_health,
            });
        }
    }

    /// Follow a max-health change; current health moves by the same amount
    pub(crate) fn adjust_max_health(&mut self, delta: f32, max_health: f32) {
        self.health = (self.health + delta).clamp(0.0, max_health);
    }

    pub(crate) fn restore_full(&mut self, max_health: f32) {
        self.health = max_health;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_player(terrain: &Terrain) -> Player {
        let mut player = Player::new(120.0);
        let stats = PlayerStats::default();
        for _ in 0..30 {
            player.update(Controls::default(), &stats, terrain);
        }
        assert!(player.grounded);
        player
    }

    #[test]
    fn test_spawn_position() {
        let player = Player::new(120.0);
        assert_eq!(player.pos, Vec2::new(640.0, 520.0));
        assert_eq!(player.health, 120.0);
    }

    #[test]
    fn test_lands_on_terrain() {
        let terrain = Terrain::flat();
        let player = grounded_player(&terrain);
        assert_eq!(player.pos.y, GROUND_Y - PLAYER_HEIGHT / 2.0);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let terrain = Terrain::flat();
        let stats = PlayerStats::default();
        let mut player = grounded_player(&terrain);
        let jump = Controls {
            jump: true,
            ..Default::default()
        };

        player.update(jump, &stats, &terrain);
        assert!(!player.grounded);
        assert!((player.vel.y - (JUMP_FORCE + GRAVITY)).abs() < 1e-5);

        // Holding jump through landing does not bounce again
        for _ in 0..120 {
            player.update(jump, &stats, &terrain);
        }
        assert!(player.grounded);
    }

    #[test]
    fn test_friction_and_edge_clamp() {
        let terrain = Terrain::flat();
        let stats = PlayerStats::default();
        let mut player = grounded_player(&terrain);
        let right = Controls {
            right: true,
            ..Default::default()
        };
        player.update(right, &stats, &terrain);
        assert_eq!(player.vel.x, stats.speed);
        player.update(Controls::default(), &stats, &terrain);
        assert!((player.vel.x - stats.speed * FRICTION).abs() < 1e-5);

        for _ in 0..1000 {
            player.update(right, &stats, &terrain);
        }
        assert_eq!(player.pos.x, SCREEN_WIDTH - PLAYER_WIDTH / 2.0);
    }

    #[test]
    fn test_fire_rate_gate() {
        let stats = PlayerStats::default();
        let mut player = Player::new(120.0);
        let mut events = Vec::new();
        assert!(player.can_fire(0.0, &stats));
        player.fire(Vec2::new(640.0, 0.0), 100.0, Weapon::Wizard, &stats, &mut events);
        assert!(!player.can_fire(1100.0, &stats));
        assert!(player.can_fire(1100.5, &stats));
        assert_eq!(events, vec![GameEvent::Sound(sounds::PLAYER_SHOT)]);
    }

    #[test]
    fn test_trident_fans_out() {
        let stats = PlayerStats::default();
        let mut player = Player::new(120.0);
        let mut events = Vec::new();
        let aim = player.pos + Vec2::new(100.0, 0.0);
        let shots = player.fire(aim, 0.0, Weapon::Trident, &stats, &mut events);
        assert_eq!(shots.len(), 3);
        assert!((shots[0].angle + 0.15).abs() < 1e-5);
        assert!((shots[2].angle - 0.15).abs() < 1e-5);
        assert!((shots[1].damage - 30.0).abs() < 1e-4);
        assert_eq!(shots[1].pos.y, player.pos.y - PLAYER_HEIGHT / 4.0);
    }

    #[test]
    fn test_projectile_variant_priority() {
        let mut stats = PlayerStats::default();
        stats.explosive = true;
        stats.piercing = true;
        let mut player = Player::new(120.0);
        let mut events = Vec::new();

        let shots = player.fire(Vec2::ZERO, 0.0, Weapon::Emerald, &stats, &mut events);
        assert!(matches!(shots[0].kind, ProjectileKind::Homing { explosive: true, .. }));
        assert!(shots[0].piercing);

        stats.ricochet.set(2);
        let shots = player.fire(Vec2::ZERO, 0.0, Weapon::Emerald, &stats, &mut events);
        assert!(matches!(shots[0].kind, ProjectileKind::Ricochet { max_bounces: 5, .. }));

        let shots = player.fire(Vec2::ZERO, 0.0, Weapon::Boom, &stats, &mut events);
        assert_eq!(shots[0].kind, ProjectileKind::Explosive);
    }

    #[test]
    fn test_take_damage_applies_reduction_and_barrier() {
        let mut stats = PlayerStats::default();
        stats.set_damage_reduction(0.5);
        let mut player = Player::new(120.0);
        let mut events = Vec::new();

        assert!(!player.take_damage(20.0, &stats, &mut events));
        assert_eq!(player.health, 110.0);

        player.barrier_frames = 2;
        player.take_damage(20.0, &stats, &mut events);
        assert_eq!(player.health, 110.0);
        player.tick_barrier();
        player.tick_barrier();
        player.take_damage(20.0, &stats, &mut events);
        assert_eq!(player.health, 100.0);
    }

    #[test]
    fn test_death_reported_once() {
        let stats = PlayerStats::default();
        let mut player = Player::new(120.0);
        let mut events = Vec::new();
        assert!(player.take_damage(500.0, &stats, &mut events));
        assert_eq!(player.health, 0.0);
        assert!(!player.take_damage(500.0, &stats, &mut events));
        assert!(player.is_dead());
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut player = Player::new(120.0);
        let mut events = Vec::new();
        player.health = 115.0;
        player.heal(10.0, 120.0, &mut events);
        assert_eq!(player.health, 120.0);
        assert_eq!(events.len(), 1);
        player.heal(10.0, 120.0, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_barrier_duration() {
        assert_eq!(barrier_frames(1), 300);
        assert_eq!(barrier_frames(3), 600);
    }
}
