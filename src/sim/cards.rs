//! Upgrade card catalog and acquisition rules
//!
//! Card effects are absolute: acquiring level N recomputes the affected
//! stats from base values, so applying the same level twice is harmless.

use serde::{Deserialize, Serialize};

use super::companion::Companion;
use super::events::GameEvent;
use super::hazard::{HazardKind, Hazards};
use super::player::{Player, barrier_frames};
use super::rng::GameRng;
use super::stats::PlayerStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardId {
    // Common
    Growth,
    Swiftness,
    Vitality,
    Cadence,
    // Uncommon
    DoubleShot,
    Lifesteal,
    Shield,
    Burst,
    Ricochet,
    Fragmentation,
    Magnetism,
    // Epic
    Barrier,
    Explosion,
    Piercing,
    Giant,
    Berserker,
    Temporal,
    Vampiric,
    // Legendary
    WillOWisp,
    Lightning,
    Meteors,
    Thorns,
    Poison,
    Fire,
    Nexus,
    Ascension,
}

impl CardId {
    /// Catalog order: rarity groups, common first
    pub const ALL: [CardId; 26] = [
        CardId::Growth,
        CardId::Swiftness,
        CardId::Vitality,
        CardId::Cadence,
        CardId::DoubleShot,
        CardId::Lifesteal,
        CardId::Shield,
        CardId::Burst,
        CardId::Ricochet,
        CardId::Fragmentation,
        CardId::Magnetism,
        CardId::Barrier,
        CardId::Explosion,
        CardId::Piercing,
        CardId::Giant,
        CardId::Berserker,
        CardId::Temporal,
        CardId::Vampiric,
        CardId::WillOWisp,
        CardId::Lightning,
        CardId::Meteors,
        CardId::Thorns,
        CardId::Poison,
        CardId::Fire,
        CardId::Nexus,
        CardId::Ascension,
    ];

    pub fn rarity(self) -> Rarity {
        use CardId::*;
        match self {
            Growth | Swiftness | Vitality | Cadence => Rarity::Common,
            DoubleShot | Lifesteal | Shield | Burst | Ricochet | Fragmentation | Magnetism => {
                Rarity::Uncommon
            }
            Barrier | Explosion | Piercing | Giant | Berserker | Temporal | Vampiric => Rarity::Epic,
            WillOWisp | Lightning | Meteors | Thorns | Poison | Fire | Nexus | Ascension => {
                Rarity::Legendary
            }
        }
    }

    pub fn stackable(self) -> bool {
        !matches!(self, CardId::Explosion | CardId::Piercing)
    }

    /// Display name shown on the card
    pub fn name(self) -> &'static str {
        use CardId::*;
        match self {
            Growth => "Crescimento",
            Swiftness => "Velocidade",
            Vitality => "Vida",
            Cadence => "Cadência",
            DoubleShot => "Duplo Tiro",
            Lifesteal => "Vida Vampira",
            Shield => "Escudo",
            Burst => "Rajada",
            Ricochet => "Ricochetear",
            Fragmentation => "Fragmentação",
            Magnetism => "Magnetismo",
            Barrier => "Barreira",
            Explosion => "Explosão",
            Piercing => "Penetração",
            Giant => "Gigante",
            Berserker => "Berserker",
            Temporal => "Temporal",
            Vampiric => "Vampírico",
            WillOWisp => "Will-o-Wisp",
            Lightning => "Raios",
            Meteors => "Meteoritos",
            Thorns => "Espinhos",
            Poison => "Veneno",
            Fire => "Fogo",
            Nexus => "Nexus",
            Ascension => "Ascensão",
        }
    }

    pub fn from_name(name: &str) -> Option<CardId> {
        CardId::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Effect text at `level`
    pub fn description(self, level: u32) -> String {
        use CardId::*;
        let l = level.max(1);
        let pct = |f: f64| ((1.0 - f) * 100.0).round() as i64;
        match self {
            Growth => format!("+{}% damage", 20 * l),
            Swiftness => format!("+{l} speed"),
            Vitality => format!("+{} max health", 20 * l),
            Cadence => format!("-{}% time between shots", pct(0.8f64.powi(l as i32))),
            DoubleShot => format!("+{l} extra projectiles"),
            Lifesteal => format!("Recover {} HP per kill", 2 * l),
            Shield => format!("+{}% damage reduction", 25 * l),
            Burst => format!("+{}% fire rate", pct(0.5f64.powi(l as i32))),
            Ricochet => format!("Ricochet level {l} ({}x max)", 3 + l),
            Fragmentation => format!("{} mini-shots per kill", 5 + l),
            Magnetism => format!("Attraction level {l} ({}px)", 20 + l * 10),
            Barrier => format!("Immune for {}s", 5.0 + (l - 1) as f32 * 2.5),
            Explosion => "Projectiles explode on impact".to_string(),
            Piercing => "Projectiles pass through enemies".to_string(),
            Giant => format!(
                "+{}% damage, +{}% health",
                -pct(2f64.powi(l as i32)),
                -pct(1.5f64.powi(l as i32))
            ),
            Berserker => format!("+{}% damage per 25% health lost", 50 * l),
            Temporal => format!("{}% chance to freeze for {}s", 10 * l, 3 + l),
            Vampiric => format!("Drain {}% of damage as health", 5 * l),
            WillOWisp => format!(
                "Wisp level {l} fires every {}s",
                companion_fire_rate_ms(l) / 1000.0
            ),
            Lightning => format!(
                "Lightning level {l} strikes every {}s",
                HazardKind::Lightning.interval_ms(l) / 1000.0
            ),
            Meteors => format!("Meteors level {l} fall more often"),
            Thorns => format!("Thorns level {l} deal more damage"),
            Poison => format!("Poison level {l} is more lethal"),
            Fire => format!("Fire level {l} burns longer"),
            Nexus => format!("{l} allies, respawn every {}s", 15u32.saturating_sub(2 * l).max(5)),
            Ascension => format!("Fly {}px high, +{}% aerial damage", 100 + l * 50, 25 * l),
        }
    }

    fn hazard(self) -> Option<HazardKind> {
        match self {
            CardId::Lightning => Some(HazardKind::Lightning),
            CardId::Meteors => Some(HazardKind::Meteor),
            CardId::Thorns => Some(HazardKind::Thorn),
            CardId::Poison => Some(HazardKind::Poison),
            CardId::Fire => Some(HazardKind::Fire),
            _ => None,
        }
    }
}

/// Companion fire interval at wisp `level`
pub fn companion_fire_rate_ms(level: u32) -> f32 {
    (800.0 - 150.0 * level.saturating_sub(1) as f32).max(200.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCard {
    pub card: CardId,
    pub rarity: Rarity,
    pub level: u32,
}

/// Cards held this run, in acquisition order, unique by card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCards(Vec<OwnedCard>);

impl OwnedCards {
    pub fn level_of(&self, card: CardId) -> Option<u32> {
        self.0.iter().find(|o| o.card == card).map(|o| o.level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OwnedCard> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What happened when a card was acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    Added,
    LevelledUp(u32),
    /// Already owned and not stackable; nothing changed
    Rejected,
}

/// Everything a card effect may write
pub struct CardTarget<'a> {
    pub stats: &'a mut PlayerStats,
    pub player: &'a mut Player,
    pub companion: &'a mut Option<Companion>,
    pub hazards: &'a mut Hazards,
    pub events: &'a mut Vec<GameEvent>,
}

/// Add `card` or raise its level, then apply its effect at the new level
pub fn acquire(owned: &mut OwnedCards, card: CardId, target: &mut CardTarget) -> Acquisition {
    let outcome = match owned.0.iter_mut().find(|o| o.card == card) {
        Some(_) if !card.stackable() => return Acquisition::Rejected,
        Some(existing) => {
            existing.level += 1;
            Acquisition::LevelledUp(existing.level)
        }
        None => {
            owned.0.push(OwnedCard {
                card,
                rarity: card.rarity(),
                level: 1,
            });
            Acquisition::Added
        }
    };

    let level = match outcome {
        Acquisition::LevelledUp(level) => level,
        _ => 1,
    };
    apply(card, level, target);
    log::debug!("Card acquired: {} (level {level})", card.name());
    target.events.push(GameEvent::CardAcquired { card, level });
    outcome
}

fn apply(card: CardId, level: u32, t: &mut CardTarget) {
    use CardId::*;
    let stats = &mut *t.stats;
    match card {
        Growth => stats.stacks.growth = level,
        Swiftness => stats.stacks.swiftness = level,
        Vitality => stats.stacks.vitality = level,
        Cadence => stats.stacks.cadence = level,
        Burst => stats.stacks.burst = level,
        Shield => stats.stacks.shield = level,
        Giant => stats.stacks.giant = level,
        DoubleShot => stats.multishot += level,
        Lifesteal => stats.lifesteal += 2.0 * level as f32,
        Ricochet => stats.ricochet.set(level),
        Fragmentation => stats.explosive_death.set(level),
        Magnetism => stats.magnetism.set(level),
        Explosion => stats.explosive = true,
        Piercing => stats.piercing = true,
        Berserker => stats.berserker.set(level),
        Temporal => {
            stats.time_freeze.set(level);
            stats.time_freeze_chance = 0.1 * level as f32;
        }
        Vampiric => stats.vampiric.set(level),
        Nexus => stats.nexus.set(level),
        Ascension => stats.ascension.set(level),
        Barrier => t.player.barrier_frames = barrier_frames(level),
        WillOWisp => {
            let companion = t.companion.get_or_insert_with(|| Companion::new(t.player.pos));
            companion.set_level(level);
        }
        Lightning | Meteors | Thorns | Poison | Fire => {
            if let Some(kind) = card.hazard() {
                t.hazards.activate(kind, level);
            }
        }
    }

    let grown = t.stats.recompute();
    if grown != 0.0 {
        t.player.adjust_max_health(grown, t.stats.max_health);
        t.events.push(GameEvent::HealthChanged {
            health: t.player.health,
            max_health: t.stats.max_health,
        });
    }
}

/// One card slot in a selection offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferedCard {
    pub card: CardId,
    pub rarity: Rarity,
    /// Level the card would reach if picked
    pub next_level: u32,
    /// Owned and not stackable, so picking it does nothing
    pub disabled: bool,
}

/// A pending choice of up to three cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOffer {
    pub cards: Vec<OfferedCard>,
}

pub const OFFER_SIZE: usize = 3;

/// Cards unlocked at player `level`
pub fn pool_for_level(level: u32) -> Vec<CardId> {
    let of = |rarity: Rarity| CardId::ALL.into_iter().filter(move |c| c.rarity() == rarity);
    let mut pool: Vec<CardId> = of(Rarity::Common).collect();
    if level >= 10 {
        pool.extend(of(Rarity::Uncommon));
    } else if level >= 5 {
        pool.extend(of(Rarity::Uncommon).take(2));
    }
    if level >= 15 {
        pool.extend(of(Rarity::Epic));
    }
    if level >= 20 {
        pool.extend(of(Rarity::Legendary));
    }
    pool
}

impl CardOffer {
    /// Draw three distinct cards from the pool unlocked at `level`
    pub fn roll(level: u32, owned: &OwnedCards, rng: &mut GameRng) -> Self {
        let pool = pool_for_level(level);
        let cards = rng
            .sample(&pool, OFFER_SIZE)
            .into_iter()
            .map(|card| {
                let current = owned.level_of(card);
                OfferedCard {
                    card,
                    rarity: card.rarity(),
                    next_level: current.map_or(1, |l| l + 1),
                    disabled: current.is_some() && !card.stackable(),
                }
            })
            .collect();
        Self { cards }
    }
}
