//! Enemies and their projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Hitbox;
use super::drop::LootKind;
use super::events::{GameEvent, sounds};
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::{angle_between, direction, steer_toward};

pub const ENEMY_SIZE: f32 = 32.0;
pub const BASE_HEALTH: f32 = 120.0;
pub const BASE_DAMAGE: f32 = 15.0;
pub const BASE_POINTS: u64 = 25;
pub const BASE_SPEED: f32 = 1.2;
pub const MAX_SPEED: f32 = 3.0;
pub const BASE_SHOOT_RATE_MS: f32 = 1500.0;
pub const BASE_BULLET_SPEED: f32 = 4.0;
pub const MAX_BULLET_SPEED: f32 = 7.0;
pub const AGGRO_RANGE: f32 = 400.0;
/// Enemies stay inert this long after spawning
pub const ACTIVATION_DELAY_MS: f32 = 500.0;
pub const PERSONAL_SPACE: f32 = 60.0;
pub const SEPARATION_FORCE: f32 = 0.8;

/// Enemies above this line drop straight down
pub const DESCENT_LINE: f32 = SCREEN_HEIGHT / 2.0 - 20.0;
/// Enemies start shooting once below this line
pub const FIRING_LINE: f32 = SCREEN_HEIGHT / 2.0 - 50.0;
/// Spawn height, just above the screen
pub const SPAWN_Y: f32 = -40.0;

/// Difficulty tier of a spawned enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyTier {
    #[default]
    Normal,
    Elite,
    Boss,
}

struct TierScaling {
    health: f32,
    damage: f32,
    points: u64,
    size: f32,
    shoot_rate: f32,
    bullet_speed: f32,
}

impl EnemyTier {
    /// Tier for a spawn; only the wave's last budgeted enemy can be promoted
    pub fn for_spawn(wave: u32, is_last_of_wave: bool) -> Self {
        if !is_last_of_wave {
            return EnemyTier::Normal;
        }
        if wave % 15 == 0 {
            EnemyTier::Boss
        } else if wave % 10 == 0 || (wave >= 5 && (wave - 5) % 10 == 0) {
            EnemyTier::Elite
        } else {
            EnemyTier::Normal
        }
    }

    fn scaling(self) -> TierScaling {
        match self {
            EnemyTier::Normal => TierScaling {
                health: 1.0,
                damage: 1.0,
                points: 1,
                size: 1.0,
                shoot_rate: 1.0,
                bullet_speed: 1.0,
            },
            EnemyTier::Elite => TierScaling {
                health: 3.5,
                damage: 2.2,
                points: 4,
                size: 1.3,
                shoot_rate: 0.6,
                bullet_speed: 1.0,
            },
            EnemyTier::Boss => TierScaling {
                health: 7.0,
                damage: 4.0,
                points: 12,
                size: 1.8,
                shoot_rate: 0.3,
                bullet_speed: 1.5,
            },
        }
    }
}

/// Outcome of a single damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wound {
    /// Already dead; nothing happened
    Ignored,
    Hurt,
    /// This hit was the killing blow
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub points: u64,
    pub speed: f32,
    pub shoot_rate_ms: f32,
    pub bullet_speed: f32,
    pub aggro_range: f32,
    pub spawned_at_ms: f32,
    pub last_shot_ms: f32,
    pub tier: EnemyTier,
    pub guaranteed_drop: Option<LootKind>,
    /// Set once on the killing blow; killed enemies are skipped and compacted
    pub killed: bool,
    pub frozen_until_ms: Option<f32>,
}

impl Enemy {
    /// Enemy scaled for `wave` and promoted to `tier`
    pub fn spawn(id: u32, pos: Vec2, wave: u32, tier: EnemyTier, now_ms: f32) -> Self {
        let steps = wave.saturating_sub(1) as f32;
        let m = 1.0 + steps * 0.15;
        let t = tier.scaling();

        let health = (BASE_HEALTH * m).floor() * t.health;
        let shoot_rate = (BASE_SHOOT_RATE_MS * (1.0 - steps * 0.03).max(0.6)).floor();
        let bullet_speed = (BASE_BULLET_SPEED + steps * 0.2).min(MAX_BULLET_SPEED);

        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            size: ENEMY_SIZE * t.size,
            health,
            max_health: health,
            damage: (BASE_DAMAGE * m).floor() * t.damage,
            points: (BASE_POINTS as f32 * m).floor() as u64 * t.points,
            speed: (BASE_SPEED * (1.0 + steps * 0.05)).min(MAX_SPEED),
            shoot_rate_ms: shoot_rate * t.shoot_rate,
            bullet_speed: bullet_speed * t.bullet_speed,
            aggro_range: AGGRO_RANGE,
            spawned_at_ms: now_ms,
            last_shot_ms: 0.0,
            tier,
            guaranteed_drop: None,
            killed: false,
            frozen_until_ms: None,
        }
    }

    /// Unscaled wave-1 enemy
    pub fn basic(id: u32, pos: Vec2, now_ms: f32) -> Self {
        Self::spawn(id, pos, 1, EnemyTier::Normal, now_ms)
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::square(self.pos, self.size)
    }

    pub fn is_active(&self, now_ms: f32) -> bool {
        now_ms - self.spawned_at_ms >= ACTIVATION_DELAY_MS
    }

    pub fn is_frozen(&self, now_ms: f32) -> bool {
        self.frozen_until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn freeze(&mut self, until_ms: f32) {
        let until = self.frozen_until_ms.map_or(until_ms, |cur| cur.max(until_ms));
        self.frozen_until_ms = Some(until);
    }

    /// Body color for renderers: loot carriers first, then tier
    pub fn color(&self) -> u32 {
        match (self.guaranteed_drop, self.tier) {
            (Some(loot), _) => loot.carrier_color(),
            (None, EnemyTier::Boss) => 0xff4444,
            (None, EnemyTier::Elite) => 0xffaa44,
            (None, EnemyTier::Normal) => 0xffffff,
        }
    }

    /// Subtract health. Rewards are handled by the combat pass.
    pub fn wound(&mut self, amount: f32) -> Wound {
        if self.killed {
            return Wound::Ignored;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.killed = true;
            Wound::Killed
        } else {
            Wound::Hurt
        }
    }

    /// Movement and firing for one frame. `push` is the separation velocity
    /// from nearby enemies.
    fn update(
        &mut self,
        push: Vec2,
        target: Vec2,
        now_ms: f32,
        shots: &mut Vec<EnemyProjectile>,
        events: &mut Vec<GameEvent>,
    ) {
        let start_y = self.pos.y;

        if start_y < DESCENT_LINE {
            self.vel = Vec2::new(0.0, self.speed * 1.5);
        } else {
            self.vel.y = (now_ms * 0.003 + self.pos.x * 0.01).sin() * 0.5;
            let dx = target.x - self.pos.x;
            if dx.abs() > 50.0 {
                self.vel.x = dx.signum() * self.speed * 0.4;
            } else {
                self.vel.x *= 0.9;
            }
        }

        self.vel += push;
        self.vel = self.vel.clamp_length_max(self.speed * 2.0);
        self.pos += self.vel;

        let half = self.size / 2.0;
        self.pos.x = self.pos.x.clamp(half, SCREEN_WIDTH - half);
        self.pos.y = self.pos.y.clamp(0.0, SCREEN_HEIGHT - self.size);

        let in_range = self.pos.distance(target) <= self.aggro_range;
        if start_y >= FIRING_LINE && in_range && now_ms - self.last_shot_ms >= self.shoot_rate_ms {
            let angle = angle_between(self.pos, target);
            shots.push(EnemyProjectile::new(self.pos, angle, self.bullet_speed, self.damage));
            events.push(GameEvent::Sound(sounds::ENEMY_SHOT));
            self.last_shot_ms = now_ms;
        }
    }
}

/// Separation velocity for `enemies[index]` from live neighbors
fn separation(enemies: &[Enemy], index: usize) -> Vec2 {
    let me = &enemies[index];
    let mut push = Vec2::ZERO;
    for (i, other) in enemies.iter().enumerate() {
        if i == index || other.killed {
            continue;
        }
        let away = me.pos - other.pos;
        let d = away.length();
        if d > 0.0 && d < PERSONAL_SPACE {
            let force = (PERSONAL_SPACE - d) / PERSONAL_SPACE;
            push += away / d * force * me.speed * SEPARATION_FORCE;
        }
    }
    push
}

/// Advance every active, unfrozen enemy one frame
pub fn update_enemies(
    enemies: &mut [Enemy],
    target: Vec2,
    now_ms: f32,
    shots: &mut Vec<EnemyProjectile>,
    events: &mut Vec<GameEvent>,
) {
    for i in 0..enemies.len() {
        {
            let e = &enemies[i];
            if e.killed || !e.is_active(now_ms) || e.is_frozen(now_ms) {
                continue;
            }
        }
        let push = separation(enemies, i);
        enemies[i].update(push, target, now_ms, shots, events);
    }
}

pub const ENEMY_PROJECTILE_SIZE: f32 = 10.0;
/// Frames
pub const ENEMY_PROJECTILE_LIFETIME: i32 = 150;
pub const ENEMY_TRAIL_LENGTH: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyProjectile {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub damage: f32,
    pub lifetime: i32,
    pub size: f32,
    pub trail: Vec<Vec2>,
}

impl EnemyProjectile {
    pub fn new(pos: Vec2, angle: f32, speed: f32, damage: f32) -> Self {
        Self {
            pos,
            angle,
            speed,
            damage,
            lifetime: ENEMY_PROJECTILE_LIFETIME,
            size: ENEMY_PROJECTILE_SIZE,
            trail: Vec::with_capacity(ENEMY_TRAIL_LENGTH),
        }
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::square(self.pos, self.size)
    }

    /// Move one frame, bending toward `player` when a magnet pull
    /// `(range, max_turn)` is given. Returns `false` once expired or off-screen.
    pub fn advance(&mut self, player: Vec2, magnet: Option<(f32, f32)>) -> bool {
        self.trail.push(self.pos);
        if self.trail.len() > ENEMY_TRAIL_LENGTH {
            self.trail.remove(0);
        }

        if let Some((range, max_turn)) = magnet {
            let d = self.pos.distance(player);
            if d > 0.0 && d < range {
                let wanted = angle_between(self.pos, player);
                self.angle = steer_toward(self.angle, wanted, max_turn);
            }
        }

        self.pos += direction(self.angle) * self.speed;
        self.lifetime -= 1;

        let on_screen = self.pos.x >= 0.0
            && self.pos.x <= SCREEN_WIDTH
            && self.pos.y >= 0.0
            && self.pos.y <= SCREEN_HEIGHT;
        on_screen && self.lifetime > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_scaling() {
        let e = Enemy::spawn(1, Vec2::ZERO, 5, EnemyTier::Normal, 0.0);
        // m = 1.6
        assert_eq!(e.health, 192.0);
        assert_eq!(e.damage, 24.0);
        assert_eq!(e.points, 40);
        assert!((e.speed - 1.44).abs() < 1e-4);
        assert!((e.shoot_rate_ms - 1320.0).abs() <= 1.0);
        assert!((e.bullet_speed - 4.8).abs() < 1e-4);
    }

    #[test]
    fn test_scaling_caps() {
        let e = Enemy::spawn(1, Vec2::ZERO, 200, EnemyTier::Normal, 0.0);
        assert_eq!(e.speed, MAX_SPEED);
        assert_eq!(e.bullet_speed, MAX_BULLET_SPEED);
        assert!((e.shoot_rate_ms - 900.0).abs() <= 1.0);
    }

    #[test]
    fn test_tier_schedule() {
        assert_eq!(EnemyTier::for_spawn(15, true), EnemyTier::Boss);
        assert_eq!(EnemyTier::for_spawn(30, true), EnemyTier::Boss);
        assert_eq!(EnemyTier::for_spawn(5, true), EnemyTier::Elite);
        assert_eq!(EnemyTier::for_spawn(10, true), EnemyTier::Elite);
        assert_eq!(EnemyTier::for_spawn(25, true), EnemyTier::Elite);
        assert_eq!(EnemyTier::for_spawn(4, true), EnemyTier::Normal);
        assert_eq!(EnemyTier::for_spawn(10, false), EnemyTier::Normal);
    }

    #[test]
    fn test_boss_multipliers() {
        let e = Enemy::spawn(1, Vec2::ZERO, 1, EnemyTier::Boss, 0.0);
        assert_eq!(e.health, 840.0);
        assert_eq!(e.max_health, 840.0);
        assert_eq!(e.damage, 60.0);
        assert_eq!(e.points, 300);
        assert!((e.size - 57.6).abs() < 1e-4);
        assert!((e.shoot_rate_ms - 450.0).abs() < 1e-3);
        assert_eq!(e.bullet_speed, 6.0);
    }

    #[test]
    fn test_wound_after_death_is_ignored() {
        let mut e = Enemy::basic(1, Vec2::ZERO, 0.0);
        assert_eq!(e.wound(100.0), Wound::Hurt);
        assert_eq!(e.wound(100.0), Wound::Killed);
        assert_eq!(e.health, 0.0);
        assert_eq!(e.wound(100.0), Wound::Ignored);
    }

    #[test]
    fn test_inert_before_activation() {
        let mut enemies = vec![Enemy::basic(1, Vec2::new(100.0, -40.0), 1000.0)];
        let mut shots = Vec::new();
        let mut events = Vec::new();
        update_enemies(&mut enemies, Vec2::new(640.0, 520.0), 1400.0, &mut shots, &mut events);
        assert_eq!(enemies[0].pos, Vec2::new(100.0, -40.0));

        update_enemies(&mut enemies, Vec2::new(640.0, 520.0), 1500.0, &mut shots, &mut events);
        assert!((enemies[0].pos.y - 0.0).abs() < 1e-4);
    }

    #[test]
    fn test_descends_then_fires_in_range() {
        let mut enemies = vec![Enemy::basic(1, Vec2::new(640.0, 330.0), 0.0)];
        let mut shots = Vec::new();
        let mut events = Vec::new();
        update_enemies(&mut enemies, Vec2::new(640.0, 520.0), 2000.0, &mut shots, &mut events);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].speed, BASE_BULLET_SPEED);
        assert!(events.contains(&GameEvent::Sound(sounds::ENEMY_SHOT)));

        // Cooldown
        update_enemies(&mut enemies, Vec2::new(640.0, 520.0), 2100.0, &mut shots, &mut events);
        assert_eq!(shots.len(), 1);
    }

    #[test]
    fn test_frozen_enemy_holds_still() {
        let mut enemies = vec![Enemy::basic(1, Vec2::new(640.0, 100.0), 0.0)];
        enemies[0].freeze(5000.0);
        let mut shots = Vec::new();
        let mut events = Vec::new();
        update_enemies(&mut enemies, Vec2::new(640.0, 520.0), 1000.0, &mut shots, &mut events);
        assert_eq!(enemies[0].pos, Vec2::new(640.0, 100.0));
        update_enemies(&mut enemies, Vec2::new(640.0, 520.0), 5000.0, &mut shots, &mut events);
        assert!(enemies[0].pos.y > 100.0);
    }

    #[test]
    fn test_separation_pushes_apart() {
        let mut enemies = vec![
            Enemy::basic(1, Vec2::new(600.0, 400.0), 0.0),
            Enemy::basic(2, Vec2::new(620.0, 400.0), 0.0),
        ];
        let push = separation(&enemies, 0);
        assert!(push.x < 0.0);
        enemies[1].killed = true;
        assert_eq!(separation(&enemies, 0), Vec2::ZERO);
    }

    #[test]
    fn test_enemy_projectile_leaves_screen() {
        let mut shot = EnemyProjectile::new(Vec2::new(2.0, 300.0), std::f32::consts::PI, 4.0, 10.0);
        assert!(!shot.advance(Vec2::new(640.0, 520.0), None));
    }

    #[test]
    fn test_magnetism_bends_toward_player() {
        let player = Vec2::new(640.0, 520.0);
        let mut shot = EnemyProjectile::new(Vec2::new(640.0, 500.0), 0.0, 4.0, 10.0);
        assert!(shot.advance(player, Some((30.0, 0.05))));
        assert!((shot.angle - 0.05).abs() < 1e-6);

        let mut unaffected = EnemyProjectile::new(Vec2::new(640.0, 500.0), 0.0, 4.0, 10.0);
        unaffected.advance(player, None);
        assert_eq!(unaffected.angle, 0.0);
    }
}
