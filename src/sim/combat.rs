//! Damage application and kill bookkeeping
//!
//! Every source of enemy damage (projectiles, explosions, hazards) goes
//! through [`Combat::damage_enemy`], so a dead enemy can never pay out twice.

use std::f32::consts::TAU;

use glam::Vec2;

use super::collision::within_radius;
use super::drop::{Drop, DropKind, LootKind};
use super::enemy::{Enemy, Wound};
use super::events::{GameEvent, sounds};
use super::player::Player;
use super::popup::{DamagePopup, PopupText};
use super::progress::{RunProgress, kill_xp};
use super::projectile::{EXPLOSION_DAMAGE_FACTOR, EXPLOSION_RADIUS, Projectile};
use super::rng::GameRng;
use super::stats::PlayerStats;
use super::terrain::Terrain;
use crate::consts::MAX_PROJECTILES;

/// Mutable view of everything a hit can touch
pub struct Combat<'a> {
    pub enemies: &'a mut Vec<Enemy>,
    pub player: &'a mut Player,
    pub stats: &'a PlayerStats,
    pub progress: &'a mut RunProgress,
    pub drops: &'a mut Vec<Drop>,
    pub popups: &'a mut Vec<DamagePopup>,
    pub rng: &'a mut GameRng,
    pub events: &'a mut Vec<GameEvent>,
    pub wave: u32,
    pub now_ms: f32,
}

impl Combat<'_> {
    /// Damage one enemy, paying out kill rewards on the killing blow
    pub fn damage_enemy(&mut self, index: usize, amount: f32) -> Wound {
        let Some(enemy) = self.enemies.get_mut(index) else {
            return Wound::Ignored;
        };
        if enemy.killed {
            return Wound::Ignored;
        }

        let popup_at = Vec2::new(enemy.pos.x + self.rng.jitter(20.0), enemy.pos.y - 10.0);
        self.popups
            .push(DamagePopup::new(popup_at, PopupText::Amount(amount), 0xffffff, self.rng));

        let wound = enemy.wound(amount);
        if wound == Wound::Killed {
            self.reward_kill(index);
        }
        wound
    }

    /// Damage every live enemy strictly within `radius` of `center`
    pub fn damage_area(&mut self, center: Vec2, radius: f32, amount: f32) {
        for i in 0..self.enemies.len() {
            let e = &self.enemies[i];
            if !e.killed && within_radius(e.pos, center, radius) {
                self.damage_enemy(i, amount);
            }
        }
    }

    fn reward_kill(&mut self, index: usize) {
        let (pos, points, guaranteed) = {
            let e = &self.enemies[index];
            (e.pos, e.points, e.guaranteed_drop)
        };

        let loot = guaranteed.or_else(|| LootKind::roll(self.rng));
        if let Some(loot) = loot {
            let kind = DropKind::from_loot(loot, self.rng);
            self.drops.push(Drop::new(kind, pos, self.rng));
        }

        self.progress.kills += 1;
        self.progress.score += points;
        for level in self.progress.add_xp(kill_xp(self.wave)) {
            log::info!("Level up: {level}");
            self.events.push(GameEvent::LevelUp { level });
        }
        self.events.push(GameEvent::Sound(sounds::ENEMY_DEATH));

        if self.stats.lifesteal > 0.0 {
            self.player.heal(self.stats.lifesteal, self.stats.max_health, self.events);
        }
    }

    /// Projectile contact: damage plus vampiric, freeze and death-burst extras
    fn projectile_hit(&mut self, shot: &Projectile, index: usize, spawned: &mut Vec<Projectile>) {
        let wound = self.damage_enemy(index, shot.damage);
        if wound == Wound::Ignored {
            return;
        }

        let drain = self.stats.vampiric_fraction();
        if drain > 0.0 {
            self.player.heal(shot.damage * drain, self.stats.max_health, self.events);
        }

        match wound {
            Wound::Hurt if self.stats.time_freeze.active => {
                if self.rng.chance(self.stats.time_freeze_chance) {
                    let until = self.now_ms + self.stats.freeze_duration_ms();
                    self.enemies[index].freeze(until);
                }
            }
            Wound::Killed => {
                let count = self.stats.death_burst_count();
                let origin = self.enemies[index].pos;
                for k in 0..count {
                    let angle = TAU / count as f32 * k as f32;
                    spawned.push(Projectile::death_burst(origin, angle, shot.damage));
                }
            }
            _ => {}
        }
    }
}

/// Advance player projectiles, resolve enemy hits and area bursts, then
/// enforce the projectile cap by dropping the oldest.
pub fn resolve_projectiles(projectiles: &mut Vec<Projectile>, combat: &mut Combat, terrain: &Terrain) {
    let mut spawned = Vec::new();

    projectiles.retain_mut(|shot| {
        let mut alive = shot.advance(&combat.enemies[..], terrain);
        if alive {
            for i in (0..combat.enemies.len()).rev() {
                let enemy = &combat.enemies[i];
                if enemy.killed || !shot.hits(enemy) {
                    continue;
                }
                combat.projectile_hit(shot, i, &mut spawned);
                if shot.stops_on_hit() {
                    alive = false;
                    break;
                }
            }
        }
        if !alive && shot.explodes() {
            combat.damage_area(shot.pos, EXPLOSION_RADIUS, shot.damage * EXPLOSION_DAMAGE_FACTOR);
        }
        alive
    });

    projectiles.extend(spawned);
    cap_oldest(projectiles, MAX_PROJECTILES);
}

/// Drop the oldest entries beyond `cap`
pub fn cap_oldest<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sim::projectile::ProjectileKind;

    /// Owned backing storage for a `Combat` view
    pub(crate) struct Arena {
        pub enemies: Vec<Enemy>,
        pub player: Player,
        pub stats: PlayerStats,
        pub progress: RunProgress,
        pub drops: Vec<Drop>,
        pub popups: Vec<DamagePopup>,
        pub rng: GameRng,
        pub events: Vec<GameEvent>,
        pub wave: u32,
        pub now_ms: f32,
    }

    impl Arena {
        pub fn new(rng: GameRng) -> Self {
            Self {
                enemies: Vec::new(),
                player: Player::new(120.0),
                stats: PlayerStats::default(),
                progress: RunProgress::default(),
                drops: Vec::new(),
                popups: Vec::new(),
                rng,
                events: Vec::new(),
                wave: 1,
                now_ms: 0.0,
            }
        }

        pub fn combat(&mut self) -> Combat<'_> {
            Combat {
                enemies: &mut self.enemies,
                player: &mut self.player,
                stats: &self.stats,
                progress: &mut self.progress,
                drops: &mut self.drops,
                popups: &mut self.popups,
                rng: &mut self.rng,
                events: &mut self.events,
                wave: self.wave,
                now_ms: self.now_ms,
            }
        }
    }

    /// Rolls: popup jitter, popup drift, four failed loot rolls
    fn no_loot_kill() -> [f32; 6] {
        [0.5, 0.5, 0.9, 0.9, 0.9, 0.9]
    }

    #[test]
    fn test_kill_pays_out_once() {
        let mut arena = Arena::new(GameRng::scripted(no_loot_kill()));
        arena.enemies.push(Enemy::basic(1, Vec2::new(300.0, 300.0), 0.0));
        let mut combat = arena.combat();

        assert_eq!(combat.damage_enemy(0, 500.0), Wound::Killed);
        assert_eq!(combat.damage_enemy(0, 500.0), Wound::Ignored);
        drop(combat);

        assert_eq!(arena.progress.kills, 1);
        assert_eq!(arena.progress.score, 25);
        assert_eq!(arena.progress.xp, 17);
        assert!(arena.drops.is_empty());
        assert_eq!(arena.popups.len(), 1);
        let deaths = arena
            .events
            .iter()
            .filter(|e| **e == GameEvent::Sound(sounds::ENEMY_DEATH))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_lifesteal_heals_on_kill_only() {
        let mut arena = Arena::new(GameRng::scripted(no_loot_kill()));
        arena.stats.lifesteal = 4.0;
        arena.player.health = 100.0;
        arena.enemies.push(Enemy::basic(1, Vec2::new(300.0, 300.0), 0.0));
        arena.combat().damage_enemy(0, 500.0);
        assert_eq!(arena.player.health, 104.0);
        arena.combat().damage_enemy(0, 500.0);
        assert_eq!(arena.player.health, 104.0);
    }

    #[test]
    fn test_guaranteed_drop_skips_roll() {
        let mut arena = Arena::new(GameRng::scripted([0.5, 0.5, 0.5]));
        let mut enemy = Enemy::basic(1, Vec2::new(300.0, 300.0), 0.0);
        enemy.guaranteed_drop = Some(LootKind::Chest);
        arena.enemies.push(enemy);
        arena.combat().damage_enemy(0, 500.0);
        assert_eq!(arena.drops.len(), 1);
        assert_eq!(arena.drops[0].kind, DropKind::Chest);
    }

    #[test]
    fn test_kills_worth_250_points() {
        let mut arena = Arena::new(GameRng::seeded(11));
        for id in 0..10 {
            arena.enemies.push(Enemy::basic(id, Vec2::new(100.0 + id as f32 * 100.0, 200.0), 0.0));
        }
        for i in 0..10 {
            arena.combat().damage_enemy(i, 1000.0);
        }
        assert_eq!(arena.progress.score, 250);
        assert_eq!(arena.progress.kills, 10);
    }

    #[test]
    fn test_level_up_event() {
        let mut arena = Arena::new(GameRng::seeded(5));
        arena.progress.xp = 90;
        arena.enemies.push(Enemy::basic(1, Vec2::new(300.0, 300.0), 0.0));
        arena.combat().damage_enemy(0, 500.0);
        assert_eq!(arena.progress.level, 2);
        assert!(arena.events.contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_area_damage_radius() {
        let mut arena = Arena::new(GameRng::seeded(5));
        arena.enemies.push(Enemy::basic(1, Vec2::new(300.0, 300.0), 0.0));
        arena.enemies.push(Enemy::basic(2, Vec2::new(360.0, 300.0), 0.0));
        arena.combat().damage_area(Vec2::new(300.0, 300.0), 50.0, 35.0);
        assert_eq!(arena.enemies[0].health, 85.0);
        assert_eq!(arena.enemies[1].health, 120.0);
    }

    #[test]
    fn test_non_piercing_shot_stops_at_first_hit() {
        let mut arena = Arena::new(GameRng::seeded(5));
        arena.enemies.push(Enemy::basic(1, Vec2::new(302.0, 300.0), 0.0));
        arena.enemies.push(Enemy::basic(2, Vec2::new(304.0, 300.0), 0.0));
        let mut shots = vec![Projectile::new(Vec2::new(300.0, 300.0), 0.0, 10.0, 0, ProjectileKind::Plain)];
        resolve_projectiles(&mut shots, &mut arena.combat(), &Terrain::flat());
        assert!(shots.is_empty());
        // Newest enemy is tested first
        assert_eq!(arena.enemies[1].health, 110.0);
        assert_eq!(arena.enemies[0].health, 120.0);
    }

    #[test]
    fn test_piercing_shot_hits_every_overlap() {
        let mut arena = Arena::new(GameRng::seeded(5));
        arena.enemies.push(Enemy::basic(1, Vec2::new(302.0, 300.0), 0.0));
        arena.enemies.push(Enemy::basic(2, Vec2::new(304.0, 300.0), 0.0));
        let mut shot = Projectile::new(Vec2::new(300.0, 300.0), 0.0, 10.0, 0, ProjectileKind::Plain);
        shot.piercing = true;
        let mut shots = vec![shot];
        resolve_projectiles(&mut shots, &mut arena.combat(), &Terrain::flat());
        assert_eq!(shots.len(), 1);
        assert_eq!(arena.enemies[0].health, 110.0);
        assert_eq!(arena.enemies[1].health, 110.0);
    }

    #[test]
    fn test_explosive_shot_bursts_on_hit() {
        let mut arena = Arena::new(GameRng::seeded(5));
        arena.enemies.push(Enemy::basic(1, Vec2::new(302.0, 300.0), 0.0));
        arena.enemies.push(Enemy::basic(2, Vec2::new(340.0, 300.0), 0.0));
        let mut shots = vec![Projectile::new(Vec2::new(300.0, 300.0), 0.0, 20.0, 0, ProjectileKind::Explosive)];
        resolve_projectiles(&mut shots, &mut arena.combat(), &Terrain::flat());
        assert!(shots.is_empty());
        // Direct hit plus splash on the first; splash only on the second
        assert_eq!(arena.enemies[0].health, 120.0 - 20.0 - 14.0);
        assert_eq!(arena.enemies[1].health, 120.0 - 14.0);
    }

    #[test]
    fn test_explosive_shot_bursts_on_expiry() {
        let mut arena = Arena::new(GameRng::seeded(5));
        arena.enemies.push(Enemy::basic(1, Vec2::new(300.0, 200.0), 0.0));
        let mut shot = Projectile::new(Vec2::new(300.0, 240.0), 0.0, 20.0, 0, ProjectileKind::Explosive);
        shot.speed = 0.0;
        shot.lifetime = 1;
        let mut shots = vec![shot];
        resolve_projectiles(&mut shots, &mut arena.combat(), &Terrain::flat());
        assert!(shots.is_empty());
        assert_eq!(arena.enemies[0].health, 106.0);
    }

    #[test]
    fn test_death_burst_spawns_fragments() {
        let mut arena = Arena::new(GameRng::seeded(5));
        arena.stats.explosive_death.set(2);
        arena.enemies.push(Enemy::basic(1, Vec2::new(302.0, 300.0), 0.0));
        let mut shots = vec![Projectile::new(Vec2::new(300.0, 300.0), 0.0, 500.0, 0, ProjectileKind::Plain)];
        resolve_projectiles(&mut shots, &mut arena.combat(), &Terrain::flat());
        assert_eq!(shots.len(), 7);
        assert!(shots.iter().all(|s| s.kind == ProjectileKind::DeathBurst));
        assert!((shots[0].damage - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_vampiric_heals_fraction_of_damage() {
        let mut arena = Arena::new(GameRng::seeded(5));
        arena.stats.vampiric.set(2);
        arena.player.health = 50.0;
        arena.enemies.push(Enemy::basic(1, Vec2::new(302.0, 300.0), 0.0));
        let mut shots = vec![Projectile::new(Vec2::new(300.0, 300.0), 0.0, 40.0, 0, ProjectileKind::Plain)];
        resolve_projectiles(&mut shots, &mut arena.combat(), &Terrain::flat());
        assert!((arena.player.health - 54.0).abs() < 1e-4);
    }

    #[test]
    fn test_time_freeze_on_hit() {
        // popup jitter, popup drift, freeze roll
        let mut arena = Arena::new(GameRng::scripted([0.5, 0.5, 0.05]));
        arena.stats.time_freeze.set(1);
        arena.stats.time_freeze_chance = 0.1;
        arena.now_ms = 1000.0;
        arena.enemies.push(Enemy::basic(1, Vec2::new(302.0, 300.0), 0.0));
        let mut shots = vec![Projectile::new(Vec2::new(300.0, 300.0), 0.0, 10.0, 0, ProjectileKind::Plain)];
        resolve_projectiles(&mut shots, &mut arena.combat(), &Terrain::flat());
        assert_eq!(arena.enemies[0].frozen_until_ms, Some(5000.0));
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut items: Vec<u32> = (0..65).collect();
        cap_oldest(&mut items, 60);
        assert_eq!(items.len(), 60);
        assert_eq!(items[0], 5);
    }
}
