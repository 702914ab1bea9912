//! Player preferences
//!
//! Persisted separately from rankings in LocalStorage on web, as JSON.

use serde::{Deserialize, Serialize};

use crate::sim::{GameMode, GameSetup, Hat, Weapon};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Loadout ===
    pub weapon: Weapon,
    pub hat: Hat,
    pub mode: GameMode,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === HUD ===
    pub show_fps: bool,

    /// Last name typed into the ranking form
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weapon: Weapon::default(),
            hat: Hat::default(),
            mode: GameMode::default(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            show_fps: false,
            player_name: String::new(),
        }
    }
}

impl Settings {
    /// Run setup for the chosen loadout
    pub fn setup(&self, seed: u64) -> GameSetup {
        GameSetup {
            seed,
            weapon: self.weapon,
            hat: self.hat,
            mode: self.mode,
        }
    }

    /// Effective sound effect gain (respects mute)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "seraph_arena_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());

        match stored.map(|json| Self::from_json(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring stored settings: {e}");
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if let (Some(storage), Ok(json)) = (storage, self.to_json()) {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}
