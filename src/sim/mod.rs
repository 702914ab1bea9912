//! Frame-driven simulation module
//!
//! All gameplay logic lives here. This module is pure and reproducible:
//! - One tick per display frame, timers in game-time milliseconds
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod cards;
pub mod clock;
pub mod collision;
pub mod combat;
pub mod companion;
pub mod drop;
pub mod enemy;
pub mod events;
pub mod hazard;
pub mod player;
pub mod popup;
pub mod progress;
pub mod projectile;
pub mod rng;
pub mod state;
pub mod stats;
pub mod terrain;
pub mod tick;
pub mod wave;

pub use cards::{Acquisition, CardId, CardOffer, OfferedCard, OwnedCards, Rarity};
pub use clock::FrameClock;
pub use companion::Companion;
pub use drop::{Drop, DropKind, LootKind};
pub use enemy::{Enemy, EnemyProjectile, EnemyTier};
pub use events::{GameEvent, RunSummary, SoundRequest, Waveform};
pub use hazard::{HazardKind, Hazards};
pub use player::Player;
pub use popup::{DamagePopup, PopupText};
pub use progress::RunProgress;
pub use projectile::{Projectile, ProjectileKind};
pub use rng::GameRng;
pub use state::{GameMode, GamePhase, GameSetup, GameState, HudSnapshot};
pub use stats::{Hat, PlayerStats, Weapon};
pub use terrain::Terrain;
pub use tick::{TickInput, tick};
pub use wave::WaveState;
