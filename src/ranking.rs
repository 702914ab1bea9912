//! Leaderboard boundary
//!
//! The simulation never talks to a leaderboard directly; the host submits a
//! finished run through a [`Submission`] guard to any [`RankingService`].
//! [`LocalRanking`] keeps the top scores in memory (and LocalStorage on web).

use serde::{Deserialize, Serialize};

use crate::sim::{Hat, RunSummary, Weapon};

/// Entries kept by the local leaderboard
pub const MAX_RANKING_ENTRIES: usize = 50;
/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub score: u64,
    pub wave: u32,
    pub weapon: Weapon,
    pub hat: Hat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankingError {
    #[error("player name is empty")]
    EmptyName,

    #[error("player name is {0} characters, limit is {}", MAX_NAME_LEN)]
    NameTooLong(usize),

    #[error("score already submitted for this run")]
    AlreadySubmitted,

    #[error("ranking service unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can store and list scores
pub trait RankingService {
    fn submit(&mut self, entry: RankingEntry) -> Result<(), RankingError>;

    /// Best `limit` entries, highest score first
    fn top(&self, limit: usize) -> Result<Vec<RankingEntry>, RankingError>;
}

/// In-memory leaderboard sorted by score, descending
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalRanking {
    entries: Vec<RankingEntry>,
}

impl LocalRanking {
    /// LocalStorage key (used only in wasm32)
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "seraph_arena_ranking";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        self.entries.len() < MAX_RANKING_ENTRIES || self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());

        if let Some(ranking) = stored.and_then(|json| serde_json::from_str::<LocalRanking>(&json).ok()) {
            log::info!("Loaded {} ranking entries", ranking.entries.len());
            return ranking;
        }
        log::info!("No ranking found, starting fresh");
        Self::new()
    }

    /// Save to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if let (Some(storage), Ok(json)) = (storage, serde_json::to_string(self)) {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Ranking saved ({} entries)", self.entries.len());
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

impl RankingService for LocalRanking {
    fn submit(&mut self, entry: RankingEntry) -> Result<(), RankingError> {
        // Ties keep the earlier entry ahead
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_RANKING_ENTRIES);
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<RankingEntry>, RankingError> {
        Ok(self.entries.iter().take(limit).cloned().collect())
    }
}

/// Trim and validate a player name
pub fn validate_name(raw: &str) -> Result<String, RankingError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 {
        return Err(RankingError::EmptyName);
    }
    if len > MAX_NAME_LEN {
        return Err(RankingError::NameTooLong(len));
    }
    Ok(name.to_string())
}

/// Allows one successful submission per run; failures may be retried
#[derive(Debug, Clone, Default)]
pub struct Submission {
    submitted: bool,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn submit(
        &mut self,
        service: &mut dyn RankingService,
        name: &str,
        run: &RunSummary,
        weapon: Weapon,
        hat: Hat,
    ) -> Result<(), RankingError> {
        if self.submitted {
            return Err(RankingError::AlreadySubmitted);
        }
        let name = validate_name(name)?;
        service.submit(RankingEntry {
            name,
            score: run.score,
            wave: run.wave,
            weapon,
            hat,
        })?;
        self.submitted = true;
        log::info!("Score {} submitted", run.score);
        Ok(())
    }

    /// New run, new chance to submit
    pub fn reset(&mut self) {
        self.submitted = false;
    }
}
