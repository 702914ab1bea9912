//! 1-D ground heightmap with eased transitions between waves

use serde::{Deserialize, Serialize};

use crate::consts::{GROUND_Y, SCREEN_WIDTH};

/// Horizontal distance between samples
pub const SAMPLE_SPACING: f32 = 10.0;
/// Tallest hill above the baseline
pub const MAX_HILL_HEIGHT: f32 = 60.0;
/// Duration of a heightmap transition
pub const TRANSITION_MS: f32 = 3000.0;

/// Summed-sine noise (three octaves at 0.5 / 0.25 / 0.125)
fn noise(x: f32, seed: f32) -> f32 {
    let x = (x + seed) * 0.01;
    x.sin() * 0.5 + (x * 2.1).sin() * 0.25 + (x * 4.3).sin() * 0.125
}

/// Generate a heightmap for a seed; samples every 10 units across the screen
pub fn generate(seed: f32) -> Vec<f32> {
    let samples = (SCREEN_WIDTH / SAMPLE_SPACING) as usize + 1;
    (0..samples)
        .map(|i| {
            let x = i as f32 * SAMPLE_SPACING;
            let combined = noise(x * 0.5, seed) * 0.6
                + noise(x * 0.2, seed + 100.0) * 0.3
                + noise(x * 0.8, seed + 200.0) * 0.1;
            let hill = (combined * MAX_HILL_HEIGHT).max(0.0);
            GROUND_Y - hill
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Transition {
    from: Vec<f32>,
    to: Vec<f32>,
    elapsed_ms: f32,
}

/// Current ground surface plus an optional in-flight transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    heights: Vec<f32>,
    transition: Option<Transition>,
}

impl Terrain {
    pub fn new(seed: f32) -> Self {
        Self::from_heights(generate(seed))
    }

    pub fn from_heights(heights: Vec<f32>) -> Self {
        Self {
            heights,
            transition: None,
        }
    }

    /// Flat ground at the baseline
    pub fn flat() -> Self {
        let samples = (SCREEN_WIDTH / SAMPLE_SPACING) as usize + 1;
        Self::from_heights(vec![GROUND_Y; samples])
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Ground surface y at horizontal position x
    pub fn height_at(&self, x: f32) -> f32 {
        let Some(&last) = self.heights.last() else {
            return GROUND_Y;
        };
        let index = (x / SAMPLE_SPACING).floor();
        if index < 0.0 {
            return self.heights[0];
        }
        self.heights.get(index as usize).copied().unwrap_or(last)
    }

    /// Start easing toward `target`; ignored while a transition is running
    pub fn begin_transition(&mut self, target: Vec<f32>) {
        if self.transition.is_some() {
            return;
        }
        self.transition = Some(Transition {
            from: self.heights.clone(),
            to: target,
            elapsed_ms: 0.0,
        });
    }

    pub fn advance_transition(&mut self, dt_ms: f32) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        transition.elapsed_ms += dt_ms;
        let t = (transition.elapsed_ms / TRANSITION_MS).min(1.0);
        let eased = t * t * (3.0 - 2.0 * t);

        for (i, h) in self.heights.iter_mut().enumerate() {
            let (Some(&from), Some(&to)) = (transition.from.get(i), transition.to.get(i)) else {
                continue;
            };
            *h = from + (to - from) * eased;
        }

        if t >= 1.0 {
            if let Some(done) = self.transition.take() {
                self.heights = done.to;
            }
            log::debug!("Terrain transition complete");
        }
    }
}
