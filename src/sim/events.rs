//! Side-effect requests emitted by the simulation
//!
//! The core never plays sound or touches UI directly. It appends events to
//! `GameState::events`, and the host drains them once per frame.

use serde::{Deserialize, Serialize};

use super::cards::{CardId, CardOffer};
use super::enemy::EnemyTier;

/// Oscillator shape for a sound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A single synthesized tone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundRequest {
    /// Hz
    pub frequency: f32,
    /// Seconds
    pub duration: f32,
    pub waveform: Waveform,
}

impl SoundRequest {
    pub const fn new(frequency: f32, duration: f32, waveform: Waveform) -> Self {
        Self {
            frequency,
            duration,
            waveform,
        }
    }
}

/// Fixed sound cues
pub mod sounds {
    use super::{SoundRequest, Waveform};

    pub const PLAYER_SHOT: SoundRequest = SoundRequest::new(800.0, 0.1, Waveform::Square);
    pub const PLAYER_HURT: SoundRequest = SoundRequest::new(200.0, 0.2, Waveform::Sawtooth);
    pub const ENEMY_SHOT: SoundRequest = SoundRequest::new(300.0, 0.1, Waveform::Triangle);
    pub const ENEMY_DEATH: SoundRequest = SoundRequest::new(400.0, 0.15, Waveform::Triangle);
    pub const HEALTH_PICKUP: SoundRequest = SoundRequest::new(400.0, 0.2, Waveform::Sine);
    pub const CHEST_PICKUP: SoundRequest = SoundRequest::new(600.0, 0.3, Waveform::Triangle);
    pub const BOMB: SoundRequest = SoundRequest::new(200.0, 0.5, Waveform::Sawtooth);
    pub const CARD_PICKUP: SoundRequest = SoundRequest::new(800.0, 0.4, Waveform::Triangle);

    /// Lightning pitch varies per strike
    pub fn lightning(frequency: f32) -> SoundRequest {
        SoundRequest::new(frequency, 0.2, Waveform::Sawtooth)
    }
}

/// Final numbers of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub wave: u32,
    pub kills: u32,
    pub souls_earned: u64,
}

impl RunSummary {
    pub fn new(score: u64, wave: u32, kills: u32) -> Self {
        Self {
            score,
            wave,
            kills,
            souls_earned: score / 100,
        }
    }
}

/// Events for the host (audio, UI, ranking)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundRequest),
    HealthChanged { health: f32, max_health: f32 },
    WaveStarted { wave: u32 },
    /// `early` when the budget was spawned and cleared before the timer ran out
    WaveCompleted { wave: u32, early: bool },
    EnemyTierSpawned { wave: u32, tier: EnemyTier },
    CardOffered(CardOffer),
    CardAcquired { card: CardId, level: u32 },
    LevelUp { level: u32 },
    GameOver(RunSummary),
}
