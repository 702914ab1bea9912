//! Run score, kill count and experience levels

use serde::{Deserialize, Serialize};

/// XP required to go from `level` to `level + 1`
pub fn xp_for_level(level: u32) -> u32 {
    (100.0 * 1.2f64.powi(level.saturating_sub(1) as i32) + 1e-9).floor() as u32
}

/// XP granted per kill on `wave`
pub fn kill_xp(wave: u32) -> u32 {
    15 + 2 * wave
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProgress {
    pub score: u64,
    pub kills: u32,
    pub xp: u32,
    pub level: u32,
    pub xp_to_next: u32,
}

impl Default for RunProgress {
    fn default() -> Self {
        Self {
            score: 0,
            kills: 0,
            xp: 0,
            level: 1,
            xp_to_next: xp_for_level(1),
        }
    }
}

impl RunProgress {
    /// Add XP and return every level reached along the way
    pub fn add_xp(&mut self, amount: u32) -> Vec<u32> {
        let mut reached = Vec::new();
        self.xp += amount;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.xp_to_next = xp_for_level(self.level);
            reached.push(self.level);
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_curve() {
        assert_eq!(xp_for_level(1), 100);
        assert_eq!(xp_for_level(2), 120);
        assert_eq!(xp_for_level(3), 144);
        assert_eq!(xp_for_level(4), 172);
    }

    #[test]
    fn test_add_xp_carries_over() {
        let mut progress = RunProgress::default();
        assert!(progress.add_xp(99).is_empty());
        assert_eq!(progress.add_xp(1), vec![2]);
        assert_eq!(progress.xp, 0);
        assert_eq!(progress.xp_to_next, 120);

        // Enough for two levels at once
        assert_eq!(progress.add_xp(120 + 144 + 5), vec![3, 4]);
        assert_eq!(progress.xp, 5);
    }

    #[test]
    fn test_kill_xp_scales_with_wave() {
        assert_eq!(kill_xp(1), 17);
        assert_eq!(kill_xp(10), 35);
    }
}
