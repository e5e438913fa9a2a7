//! Creature records, the catalog, and the data provider seam.

mod catalog;
mod pokeapi;
mod provider;
mod types;

pub use catalog::{Catalog, MAX_SUGGESTIONS, display_name};
pub use pokeapi::PokeApiClient;
pub use provider::{CreatureError, CreatureProvider};
pub use types::{BaseStats, CatalogEntry, Creature, CreatureId};
