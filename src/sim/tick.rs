//! Per-frame simulation tick
//!
//! Core game loop that advances every system in a fixed order.

use std::f32::consts::TAU;

use glam::Vec2;

use super::combat::{cap_oldest, resolve_projectiles};
use super::drop::{DropKind, DropStep};
use super::enemy::{Enemy, EnemyTier, update_enemies};
use super::events::{GameEvent, sounds};
use super::player::Controls;
use super::popup::DamagePopup;
use super::state::{GamePhase, GameState};
use super::wave::{WavePhase, enemy_cap};
use crate::direction;

pub const HEALTH_PICKUP: f32 = 10.0;
const BOOM_RING: usize = 8;
const BOOM_RING_RADIUS: f32 = 20.0;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Trigger held
    pub fire: bool,
    /// Crosshair position in world units
    pub aim: Vec2,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the game plays itself
    pub autopilot: bool,
}

/// Advance the game by one display frame of `dt_ms` game time.
///
/// Order: terrain transition, player, barrier, trigger, companion,
/// projectiles, enemies (compacted), drops, popups, enemy projectiles,
/// enemy cap, hazards (compacted again), wave bookkeeping, spawning.
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    let mut input = input.clone();
    if input.autopilot {
        if state.phase == GamePhase::ChoosingCard {
            autopilot_choose(state);
        }
        autopilot(state, &mut input);
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ms += dt_ms;
    state.frame += 1;
    let now = state.time_ms;

    state.terrain.advance_transition(dt_ms);

    let controls = Controls {
        left: input.left,
        right: input.right,
        jump: input.jump,
    };
    state.player.update(controls, &state.stats, &state.terrain);
    state.player.tick_barrier();

    if input.fire && state.player.can_fire(now, &state.stats) {
        let shots = state.player.fire(
            input.aim,
            now,
            state.setup.weapon,
            &state.stats,
            &mut state.events,
        );
        state.projectiles.extend(shots);
    }

    if let Some(companion) = state.companion.as_mut()
        && let Some(shot) = companion.update(state.player.pos, &state.enemies, &state.stats, now)
    {
        state.projectiles.push(shot);
    }

    let mut projectiles = std::mem::take(&mut state.projectiles);
    {
        let (mut combat, terrain) = state.combat();
        resolve_projectiles(&mut projectiles, &mut combat, terrain);
    }
    state.projectiles = projectiles;

    update_enemies(
        &mut state.enemies,
        state.player.pos,
        now,
        &mut state.enemy_projectiles,
        &mut state.events,
    );
    state.enemies.retain(|e| !e.killed);

    update_drops(state);

    state.popups.retain_mut(|p| p.update());

    update_enemy_projectiles(state);
    if state.phase == GamePhase::GameOver {
        return;
    }

    cap_oldest(&mut state.enemies, enemy_cap(state.wave.number));

    let mut hazards = std::mem::take(&mut state.hazards);
    {
        let (mut combat, terrain) = state.combat();
        hazards.update(&mut combat, terrain);
    }
    state.hazards = hazards;
    state.enemies.retain(|e| !e.killed);

    if let WavePhase::Complete { early } = state.wave.phase(state.live_enemies(), now) {
        state.complete_wave(early);
    }

    spawn_enemy(state);
}

fn update_drops(state: &mut GameState) {
    let mut collected = Vec::new();
    let player = state.player.pos;
    let terrain = &state.terrain;
    state.drops.retain_mut(|drop| match drop.update(player, terrain) {
        DropStep::Resting => true,
        DropStep::Collected => {
            collected.push((drop.kind, drop.pos));
            false
        }
        DropStep::Lost => false,
    });

    for (kind, pos) in collected {
        let label_at = pos - Vec2::new(0.0, 10.0);
        match kind {
            DropKind::Health => {
                state.player.heal(HEALTH_PICKUP, state.stats.max_health, &mut state.events);
                state.events.push(GameEvent::Sound(sounds::HEALTH_PICKUP));
                state
                    .popups
                    .push(DamagePopup::label(label_at, "+10", kind.color(), &mut state.rng));
            }
            DropKind::Chest => {
                state.events.push(GameEvent::Sound(sounds::CHEST_PICKUP));
                state.queue_offer();
            }
            DropKind::Bomb => detonate_bomb(state, label_at),
            DropKind::Card(card) => {
                state.acquire_card(card);
                state.events.push(GameEvent::Sound(sounds::CARD_PICKUP));
                state
                    .popups
                    .push(DamagePopup::label(label_at, card.name(), kind.color(), &mut state.rng));
            }
        }
    }
}

/// Clear the field; bombed enemies pay points but no kill rewards
fn detonate_bomb(state: &mut GameState, label_at: Vec2) {
    let color = DropKind::Bomb.color();
    for enemy in state.enemies.iter_mut().filter(|e| !e.killed) {
        for i in 0..BOOM_RING {
            let at = enemy.pos + direction(TAU / BOOM_RING as f32 * i as f32) * BOOM_RING_RADIUS;
            state.popups.push(DamagePopup::label(at, "BOOM", color, &mut state.rng));
        }
        enemy.killed = true;
        state.progress.score += enemy.points;
    }
    state.enemies.clear();
    state.events.push(GameEvent::Sound(sounds::BOMB));
    state
        .popups
        .push(DamagePopup::label(label_at, "CLEAR!", color, &mut state.rng));
}

fn update_enemy_projectiles(state: &mut GameState) {
    let magnet = state.stats.magnet_pull();
    let mut shots = std::mem::take(&mut state.enemy_projectiles);
    let mut fatal = false;
    shots.retain_mut(|shot| {
        if !shot.advance(state.player.pos, magnet) {
            return false;
        }
        if shot.hitbox().overlaps(&state.player.hitbox()) {
            fatal |= state
                .player
                .take_damage(shot.damage, &state.stats, &mut state.events);
            return false;
        }
        true
    });
    state.enemy_projectiles = shots;
    if fatal {
        state.end_run();
    }
}

fn spawn_enemy(state: &mut GameState) {
    let live = state.live_enemies();
    let now = state.time_ms;
    let Some(plan) = state.wave.try_spawn(live, now, &mut state.rng) else {
        return;
    };

    let id = state.next_entity_id();
    let wave = state.wave.number;
    let mut enemy = Enemy::spawn(id, plan.pos, wave, plan.tier, now);
    enemy.guaranteed_drop = plan.guaranteed_drop;
    if plan.tier != EnemyTier::Normal {
        log::info!("{:?} enemy spawned on wave {wave}", plan.tier);
        state
            .events
            .push(GameEvent::EnemyTierSpawned { wave, tier: plan.tier });
    }
    state.enemies.push(enemy);
}

/// Take the first card that would do something
fn autopilot_choose(state: &mut GameState) {
    let pick = state
        .pending_offers
        .front()
        .and_then(|offer| offer.cards.iter().position(|c| !c.disabled));
    match pick {
        Some(index) => {
            state.choose_card(index);
        }
        None => {
            // Every card disabled: nothing to gain, drop the offer
            state.pending_offers.pop_front();
            if state.pending_offers.is_empty() {
                state.phase = GamePhase::Playing;
            }
        }
    }
}

/// Demo-mode steering: shoot the closest enemy, grab loot when safe,
/// sidestep incoming fire
fn autopilot(state: &GameState, input: &mut TickInput) {
    let me = state.player.pos;
    let closest = |a: &Vec2, b: &Vec2| a.distance_squared(me).total_cmp(&b.distance_squared(me));

    let target = state
        .enemies
        .iter()
        .filter(|e| !e.killed)
        .map(|e| e.pos)
        .min_by(closest);
    input.fire = target.is_some();
    if let Some(aim) = target {
        input.aim = aim;
    }

    let threat = state
        .enemy_projectiles
        .iter()
        .filter(|s| s.pos.distance(me) < 120.0 && s.pos.y < me.y)
        .map(|s| s.pos)
        .min_by(closest);

    let goal_x = if let Some(shot) = threat {
        // Step away from the incoming shot
        if shot.x < me.x { me.x + 100.0 } else { me.x - 100.0 }
    } else if let Some(loot) = state.drops.iter().map(|d| d.pos).min_by(closest) {
        loot.x
    } else {
        // Drift under the action with a slow oscillation
        let sway = (state.frame as f32 * 0.01).sin() * 200.0;
        target.map_or(me.x, |t| t.x) + sway
    };

    input.left = goal_x < me.x - 10.0;
    input.right = goal_x > me.x + 10.0;
    input.jump = threat.is_some_and(|shot| (shot.x - me.x).abs() < 30.0);
}
