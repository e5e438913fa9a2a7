//! Core creature records.

use derive_getters::Getters;
use derive_new::new;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Catalog identifier of a creature (1-based).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("#{:04}", _0)]
pub struct CreatureId(u32);

impl CreatureId {
    /// Returns the raw numeric identifier.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// One entry of the creature catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct CatalogEntry {
    id: CreatureId,
    name: String,
}

/// The six base stats of a creature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct BaseStats {
    /// Hit points.
    pub hp: u16,
    /// Physical attack.
    pub attack: u16,
    /// Physical defense.
    pub defense: u16,
    /// Special attack.
    pub special_attack: u16,
    /// Special defense.
    pub special_defense: u16,
    /// Speed.
    pub speed: u16,
}

impl BaseStats {
    /// Upper bound of any single base stat, used to scale stat charts.
    pub const MAX: u16 = 255;

    /// Returns the stats as labelled chart axes, in display order.
    pub fn axes(&self) -> [(&'static str, u16); 6] {
        [
            ("HP", self.hp),
            ("ATK", self.attack),
            ("DEF", self.defense),
            ("S.ATK", self.special_attack),
            ("S.DEF", self.special_defense),
            ("SPD", self.speed),
        ]
    }

    /// Sum of all six stats.
    pub fn total(&self) -> u32 {
        self.axes().iter().map(|(_, v)| u32::from(*v)).sum()
    }
}

/// A fully fetched creature record.
///
/// Records are immutable once built; the `with_*` setters exist for
/// providers assembling a record from several responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct Creature {
    #[setters(skip)]
    id: CreatureId,
    #[setters(skip)]
    name: String,
    #[setters(into)]
    types: Vec<String>,
    /// Height in decimetres.
    height: u32,
    /// Weight in hectograms.
    weight: u32,
    #[setters(into)]
    sprite: String,
    stats: BaseStats,
    generation: u8,
    #[setters(into)]
    flavor_text: String,
    #[setters(into)]
    moves: Vec<String>,
    #[setters(strip_option)]
    evolution_chain_id: Option<u32>,
}

impl Creature {
    /// Creates a bare record with the given identity; remaining fields default.
    pub fn new(id: CreatureId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            types: Vec::new(),
            height: 0,
            weight: 0,
            sprite: String::new(),
            stats: BaseStats::default(),
            generation: 1,
            flavor_text: String::new(),
            moves: Vec::new(),
            evolution_chain_id: None,
        }
    }

    /// Case-insensitive exact comparison against the creature's name.
    ///
    /// Surrounding whitespace in the guess is ignored.
    pub fn is_named(&self, guess: &str) -> bool {
        guess.trim().to_lowercase() == self.name.to_lowercase()
    }

    /// Returns true if `text` mentions the creature's name anywhere
    /// (case-insensitive).
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        !self.name.is_empty() && text.to_lowercase().contains(&self.name.to_lowercase())
    }
}
