//! Floating combat text

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::GameRng;

/// Frames a popup stays visible
pub const POPUP_LIFE: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PopupText {
    /// Damage dealt, shown rounded down
    Amount(f32),
    Label(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamagePopup {
    pub pos: Vec2,
    pub vel: Vec2,
    pub text: PopupText,
    pub color: u32,
    pub life: u32,
}

impl DamagePopup {
    pub fn new(pos: Vec2, text: PopupText, color: u32, rng: &mut GameRng) -> Self {
        Self {
            pos,
            vel: Vec2::new(rng.jitter(2.0), -2.0),
            text,
            color,
            life: POPUP_LIFE,
        }
    }

    pub fn label(pos: Vec2, label: impl Into<String>, color: u32, rng: &mut GameRng) -> Self {
        Self::new(pos, PopupText::Label(label.into()), color, rng)
    }

    /// Returns `false` once faded out
    pub fn update(&mut self) -> bool {
        self.pos += self.vel;
        self.life = self.life.saturating_sub(1);
        self.vel.y *= 0.98;
        self.life > 0
    }

    /// Remaining opacity in [0, 1]
    pub fn alpha(&self) -> f32 {
        self.life as f32 / POPUP_LIFE as f32
    }
}
