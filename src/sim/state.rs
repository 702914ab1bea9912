//! Game state and run lifecycle
//!
//! Everything a run needs lives on [`GameState`]; restart rebuilds it from
//! the same [`GameSetup`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::cards::{Acquisition, CardId, CardOffer, CardTarget, OwnedCards, acquire};
use super::combat::Combat;
use super::companion::Companion;
use super::drop::Drop;
use super::enemy::{Enemy, EnemyProjectile};
use super::events::{GameEvent, RunSummary};
use super::hazard::Hazards;
use super::player::Player;
use super::popup::DamagePopup;
use super::progress::RunProgress;
use super::projectile::Projectile;
use super::rng::GameRng;
use super::stats::{Hat, PlayerStats, Weapon};
use super::terrain::{self, Terrain};
use super::wave::WaveState;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Waiting for the player to resolve the oldest pending card offer
    ChoosingCard,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Standard,
    /// Starts deep into the run with a preset deck
    Nightmare,
}

/// Everything needed to (re)build a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameSetup {
    pub seed: u64,
    pub weapon: Weapon,
    pub hat: Hat,
    pub mode: GameMode,
}

pub const NIGHTMARE_WAVE: u32 = 50;
pub const NIGHTMARE_DAMAGE_BONUS: f32 = 1.3;
pub const NIGHTMARE_HEALTH_BONUS: f32 = 1.5;

/// Preset deck for nightmare runs: (card, level)
pub const NIGHTMARE_DECK: [(CardId, u32); 12] = [
    (CardId::Vitality, 5),
    (CardId::Shield, 3),
    (CardId::Swiftness, 3),
    (CardId::Growth, 4),
    (CardId::Cadence, 3),
    (CardId::DoubleShot, 2),
    (CardId::Explosion, 1),
    (CardId::Piercing, 1),
    (CardId::Lifesteal, 2),
    (CardId::Ricochet, 2),
    (CardId::Fragmentation, 1),
    (CardId::Berserker, 1),
];

/// Range of the terrain noise seed drawn per wave
const TERRAIN_SEED_RANGE: f32 = 1000.0;

/// Read-only view for the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub health: f32,
    pub max_health: f32,
    pub score: u64,
    pub kills: u32,
    pub wave: u32,
    pub wave_remaining_ms: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub souls: u64,
    pub enemies: usize,
    pub barrier_frames: u32,
    pub cards: Vec<(CardId, u32)>,
    pub offer: Option<CardOffer>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub setup: GameSetup,
    pub phase: GamePhase,
    pub player: Player,
    pub stats: PlayerStats,
    pub owned_cards: OwnedCards,
    pub projectiles: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
    pub enemy_projectiles: Vec<EnemyProjectile>,
    pub drops: Vec<Drop>,
    pub hazards: Hazards,
    pub popups: Vec<DamagePopup>,
    pub companion: Option<Companion>,
    pub wave: WaveState,
    pub terrain: Terrain,
    pub progress: RunProgress,
    /// Meta currency, kept across restarts
    pub souls: u64,
    pub pending_offers: VecDeque<CardOffer>,
    pub rng: GameRng,
    pub events: Vec<GameEvent>,
    /// Game time in ms; does not advance while paused
    pub time_ms: f32,
    pub frame: u64,
    next_id: u32,
}

impl GameState {
    pub fn new(setup: GameSetup) -> Self {
        Self::with_rng(setup, GameRng::seeded(setup.seed))
    }

    /// Build a run around an explicit randomness source
    pub fn with_rng(setup: GameSetup, mut rng: GameRng) -> Self {
        let stats = PlayerStats::for_hat(setup.hat);
        let terrain = Terrain::new(rng.range(0.0, TERRAIN_SEED_RANGE));
        let mut state = Self {
            setup,
            phase: GamePhase::Playing,
            player: Player::new(stats.max_health),
            stats,
            owned_cards: OwnedCards::default(),
            projectiles: Vec::new(),
            enemies: Vec::new(),
            enemy_projectiles: Vec::new(),
            drops: Vec::new(),
            hazards: Hazards::default(),
            popups: Vec::new(),
            companion: None,
            wave: WaveState::new(1, 0.0),
            terrain,
            progress: RunProgress::default(),
            souls: 0,
            pending_offers: VecDeque::new(),
            rng,
            events: Vec::new(),
            time_ms: 0.0,
            frame: 0,
            next_id: 1,
        };

        if setup.mode == GameMode::Nightmare {
            state.apply_nightmare();
        }
        state.events.push(GameEvent::WaveStarted {
            wave: state.wave.number,
        });
        log::info!(
            "Run started: seed {} weapon {} hat {} wave {}",
            setup.seed,
            setup.weapon.as_str(),
            setup.hat.as_str(),
            state.wave.number
        );
        state
    }

    fn apply_nightmare(&mut self) {
        self.wave = WaveState::new(NIGHTMARE_WAVE, 0.0);
        for (card, level) in NIGHTMARE_DECK {
            for _ in 0..level {
                self.acquire_card(card);
            }
        }
        self.stats.scale_base(NIGHTMARE_DAMAGE_BONUS, NIGHTMARE_HEALTH_BONUS);
        self.player.restore_full(self.stats.max_health);
        // The preset deck is not news to the host
        self.events.clear();
    }

    /// Rebuild the run from the same setup; souls carry over
    pub fn restart(&mut self) {
        let souls = self.souls;
        *self = Self::new(self.setup);
        self.souls = souls;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn live_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| !e.killed).count()
    }

    /// Split borrow for damage resolution
    pub(crate) fn combat(&mut self) -> (Combat<'_>, &Terrain) {
        (
            Combat {
                enemies: &mut self.enemies,
                player: &mut self.player,
                stats: &self.stats,
                progress: &mut self.progress,
                drops: &mut self.drops,
                popups: &mut self.popups,
                rng: &mut self.rng,
                events: &mut self.events,
                wave: self.wave.number,
                now_ms: self.time_ms,
            },
            &self.terrain,
        )
    }

    /// Acquire a card outside of an offer (card drops, preset decks)
    pub fn acquire_card(&mut self, card: CardId) -> Acquisition {
        let mut target = CardTarget {
            stats: &mut self.stats,
            player: &mut self.player,
            companion: &mut self.companion,
            hazards: &mut self.hazards,
            events: &mut self.events,
        };
        acquire(&mut self.owned_cards, card, &mut target)
    }

    /// Queue a three-card offer drawn for the current player level
    pub fn queue_offer(&mut self) {
        let offer = CardOffer::roll(self.progress.level, &self.owned_cards, &mut self.rng);
        self.events.push(GameEvent::CardOffered(offer.clone()));
        self.pending_offers.push_back(offer);
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::ChoosingCard;
        }
    }

    /// Resolve the oldest pending offer with the card at `index`.
    ///
    /// Returns `None` (and keeps the offer open) when nothing is pending,
    /// the index is out of range or the card is disabled.
    pub fn choose_card(&mut self, index: usize) -> Option<Acquisition> {
        if self.phase != GamePhase::ChoosingCard {
            return None;
        }
        let slot = *self.pending_offers.front()?.cards.get(index)?;
        if slot.disabled {
            return None;
        }
        self.pending_offers.pop_front();
        let outcome = self.acquire_card(slot.card);
        if self.pending_offers.is_empty() {
            self.phase = GamePhase::Playing;
        }
        Some(outcome)
    }

    /// Close the current wave and open the next one
    pub(crate) fn complete_wave(&mut self, early: bool) {
        let finished = self.wave.number;
        log::info!(
            "Wave {finished} complete ({}), score {}",
            if early { "cleared" } else { "timeout" },
            self.progress.score
        );
        self.events.push(GameEvent::WaveCompleted {
            wave: finished,
            early,
        });

        self.wave.advance(self.time_ms);
        let seed = self.rng.range(0.0, TERRAIN_SEED_RANGE);
        self.terrain.begin_transition(terrain::generate(seed));
        self.events.push(GameEvent::WaveStarted {
            wave: self.wave.number,
        });
        self.queue_offer();
    }

    /// Terminal transition; pays out souls exactly once
    pub(crate) fn end_run(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        let summary = RunSummary::new(self.progress.score, self.wave.number, self.progress.kills);
        self.souls += summary.souls_earned;
        log::info!(
            "Game over: score {} wave {} kills {} souls +{}",
            summary.score,
            summary.wave,
            summary.kills,
            summary.souls_earned
        );
        self.events.push(GameEvent::GameOver(summary));
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            phase: self.phase,
            health: self.player.health,
            max_health: self.stats.max_health,
            score: self.progress.score,
            kills: self.progress.kills,
            wave: self.wave.number,
            wave_remaining_ms: self.wave.remaining_ms(self.time_ms),
            level: self.progress.level,
            xp: self.progress.xp,
            xp_to_next: self.progress.xp_to_next,
            souls: self.souls,
            enemies: self.live_enemies(),
            barrier_frames: self.player.barrier_frames,
            cards: self.owned_cards.iter().map(|c| (c.card, c.level)).collect(),
            offer: self.pending_offers.front().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Enemy;
    use glam::Vec2;

    #[test]
    fn test_new_game_defaults() {
        let mut state = GameState::new(GameSetup::default());
        assert_eq!(state.wave.number, 1);
        assert_eq!(state.progress.score, 0);
        assert_eq!(state.player.health, 120.0);
        assert_eq!(state.stats.max_health, 120.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.drain_events(), vec![GameEvent::WaveStarted { wave: 1 }]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_hat_applies_to_base() {
        let state = GameState::new(GameSetup {
            hat: Hat::Helmet,
            ..Default::default()
        });
        assert_eq!(state.stats.max_health, 180.0);
        assert_eq!(state.player.health, 180.0);
    }

    #[test]
    fn test_nightmare_preset() {
        let state = GameState::new(GameSetup {
            mode: GameMode::Nightmare,
            ..Default::default()
        });
        assert_eq!(state.wave.number, NIGHTMARE_WAVE);
        assert_eq!(state.owned_cards.len(), NIGHTMARE_DECK.len());
        assert_eq!(state.owned_cards.level_of(CardId::Vitality), Some(5));
        assert_eq!(state.owned_cards.level_of(CardId::Explosion), Some(1));
        // (120 * 1.5 + 100), nothing from giant
        assert!((state.stats.max_health - 280.0).abs() < 1e-3);
        assert_eq!(state.player.health, state.stats.max_health);
        assert!((state.stats.damage - 40.0 * 1.3 * 1.8).abs() < 1e-3);
        assert!((state.stats.damage_reduction - 0.75).abs() < 1e-6);
        assert_eq!(state.events, vec![GameEvent::WaveStarted { wave: 50 }]);
    }

    #[test]
    fn test_game_over_pays_souls_once() {
        let mut state = GameState::new(GameSetup::default());
        state.progress.score = 250;
        state.end_run();
        state.end_run();
        assert_eq!(state.souls, 2);
        let overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver(_)))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_restart_keeps_souls() {
        let mut state = GameState::new(GameSetup::default());
        state.progress.score = 990;
        state.enemies.push(Enemy::basic(1, Vec2::new(100.0, 100.0), 0.0));
        state.end_run();
        state.restart();
        assert_eq!(state.souls, 9);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.enemies.is_empty());
        assert_eq!(state.progress.score, 0);
    }

    #[test]
    fn test_offers_queue_and_resolve_in_order() {
        let mut state = GameState::new(GameSetup::default());
        state.queue_offer();
        state.queue_offer();
        assert_eq!(state.phase, GamePhase::ChoosingCard);
        assert_eq!(state.pending_offers.len(), 2);
        let second = state.pending_offers[1].clone();

        assert!(state.choose_card(7).is_none());
        assert_eq!(state.choose_card(0), Some(Acquisition::Added));
        assert_eq!(state.phase, GamePhase::ChoosingCard);
        assert_eq!(state.hud().offer, Some(second));

        assert!(state.choose_card(1).is_some());
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.choose_card(0).is_none());
    }

    #[test]
    fn test_complete_wave_transitions_terrain() {
        let mut state = GameState::new(GameSetup::default());
        state.time_ms = 12_000.0;
        state.complete_wave(true);
        assert_eq!(state.wave.number, 2);
        assert_eq!(state.wave.started_at_ms, 12_000.0);
        assert!(state.terrain.is_transitioning());
        assert_eq!(state.pending_offers.len(), 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::WaveCompleted { wave: 1, early: true }));
        assert!(events.contains(&GameEvent::WaveStarted { wave: 2 }));
    }

    #[test]
    fn test_card_drop_of_owned_non_stackable() {
        let mut state = GameState::new(GameSetup::default());
        assert_eq!(state.acquire_card(CardId::Piercing), Acquisition::Added);
        assert_eq!(state.acquire_card(CardId::Piercing), Acquisition::Rejected);
        assert_eq!(state.owned_cards.len(), 1);
    }
}
