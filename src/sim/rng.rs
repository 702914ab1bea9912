//! Single randomness source for the simulation
//!
//! Every random decision (loot, spawns, hazards, card offers, terrain seeds)
//! goes through [`GameRng`], so a run is reproducible from its seed and tests
//! can script exact roll sequences.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
enum Source {
    Pcg(Pcg32),
    /// Scripted rolls are consumed first, then the fallback takes over
    Scripted { rolls: VecDeque<f32>, fallback: Pcg32 },
}

/// Seedable RNG producing unit rolls in [0, 1)
#[derive(Debug, Clone)]
pub struct GameRng {
    seed: u64,
    source: Source,
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            source: Source::Pcg(Pcg32::seed_from_u64(seed)),
        }
    }

    /// RNG that returns `rolls` in order before falling back to a seeded stream
    pub fn scripted(rolls: impl IntoIterator<Item = f32>) -> Self {
        Self {
            seed: 0,
            source: Source::Scripted {
                rolls: rolls.into_iter().collect(),
                fallback: Pcg32::seed_from_u64(0),
            },
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Queue more scripted rolls (switches a seeded source to scripted)
    pub fn push_rolls(&mut self, more: impl IntoIterator<Item = f32>) {
        match &mut self.source {
            Source::Scripted { rolls, .. } => rolls.extend(more),
            Source::Pcg(pcg) => {
                let fallback = pcg.clone();
                self.source = Source::Scripted {
                    rolls: more.into_iter().collect(),
                    fallback,
                };
            }
        }
    }

    /// Uniform roll in [0, 1)
    pub fn unit(&mut self) -> f32 {
        match &mut self.source {
            Source::Pcg(pcg) => pcg.random::<f32>(),
            Source::Scripted { rolls, fallback } => match rolls.pop_front() {
                Some(r) => r.clamp(0.0, 0.999_999),
                None => fallback.random::<f32>(),
            },
        }
    }

    /// True with probability `p` (one roll)
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform value in [lo, hi)
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }

    /// Uniform value in [-0.5, 0.5) scaled by `span`
    pub fn jitter(&mut self, span: f32) -> f32 {
        (self.unit() - 0.5) * span
    }

    /// Uniform index in 0..len (len must be non-zero)
    pub fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f32) as usize).min(len.saturating_sub(1))
    }

    /// Draw up to `count` distinct items without replacement
    pub fn sample<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        let mut pool: Vec<T> = items.to_vec();
        let take = count.min(pool.len());
        let mut picked = Vec::with_capacity(take);
        for _ in 0..take {
            let i = self.index(pool.len());
            picked.push(pool.swap_remove(i));
        }
        picked
    }
}
