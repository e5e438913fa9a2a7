//! PokeAPI-backed creature provider.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use super::catalog::display_name;
use super::{BaseStats, Catalog, Creature, CreatureError, CreatureId, CreatureProvider};
use crate::config::PokeApiSettings;

const NO_ENTRY: &str = "No entry found.";

/// HTTP client for the public creature REST API.
///
/// The catalog is fetched once and cached for the lifetime of the client.
#[derive(Debug)]
pub struct PokeApiClient {
    http: reqwest::Client,
    settings: PokeApiSettings,
    catalog: OnceCell<Catalog>,
}

impl PokeApiClient {
    /// Creates a client for the configured API.
    #[instrument(skip(settings), fields(base_url = %settings.base_url()))]
    pub fn new(settings: PokeApiSettings) -> Self {
        info!("Creating PokeAPI client");
        Self {
            http: reqwest::Client::new(),
            settings,
            catalog: OnceCell::new(),
        }
    }

    #[instrument(skip(self))]
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, CreatureError> {
        let url = format!("{}/{}", self.settings.base_url().trim_end_matches('/'), path);
        debug!(%url, "GET");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CreatureError::new(format!("{} returned {}", url, status)));
        }
        Ok(response.json::<T>().await?)
    }

    #[instrument(skip(self))]
    async fn fetch_catalog(&self) -> Result<Catalog, CreatureError> {
        let page: ListPage = self
            .fetch(&format!("pokemon?limit={}", self.settings.catalog_limit()))
            .await?;
        let catalog = Catalog::from_names(page.results.iter().map(|r| display_name(&r.name)));
        info!(count = catalog.len(), "Catalog fetched");
        Ok(catalog)
    }

    /// Returns the species names along the first branch of an evolution chain.
    #[instrument(skip(self))]
    pub async fn evolution_line(&self, chain_id: u32) -> Result<Vec<String>, CreatureError> {
        let chain: EvolutionChain = self.fetch(&format!("evolution-chain/{}", chain_id)).await?;
        let mut line = Vec::new();
        let mut link = Some(&chain.chain);
        while let Some(current) = link {
            line.push(display_name(&current.species.name));
            link = current.evolves_to.first();
        }
        Ok(line)
    }
}

#[async_trait]
impl CreatureProvider for PokeApiClient {
    async fn list_creatures(&self) -> Result<Catalog, CreatureError> {
        self.catalog
            .get_or_try_init(|| self.fetch_catalog())
            .await
            .cloned()
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_creature(&self, id: CreatureId) -> Result<Creature, CreatureError> {
        let pokemon_path = format!("pokemon/{}", id.get());
        let species_path = format!("pokemon-species/{}", id.get());
        let (pokemon, species) = tokio::try_join!(
            self.fetch::<PokemonResponse>(&pokemon_path),
            self.fetch::<SpeciesResponse>(&species_path),
        )?;
        let creature = assemble(id, pokemon, species, *self.settings.moves_sampled())?;
        info!(name = %creature.name(), "Creature fetched");
        Ok(creature)
    }
}

/// Builds a [`Creature`] from the two API responses.
fn assemble(
    id: CreatureId,
    pokemon: PokemonResponse,
    species: SpeciesResponse,
    moves_sampled: usize,
) -> Result<Creature, CreatureError> {
    let stat = |i: usize| -> Result<u16, CreatureError> {
        pokemon
            .stats
            .get(i)
            .map(|s| s.base_stat)
            .ok_or_else(|| CreatureError::new(format!("Missing base stat {} for {}", i, id)))
    };
    let stats = BaseStats::new(stat(0)?, stat(1)?, stat(2)?, stat(3)?, stat(4)?, stat(5)?);

    let flavor_text = species
        .flavor_text_entries
        .iter()
        .find(|e| e.language.name == "en")
        .map(|e| normalize_flavor(&e.flavor_text))
        .unwrap_or_else(|| NO_ENTRY.to_string());

    let mut pool: Vec<String> = pokemon
        .moves
        .iter()
        .map(|m| m.entry.name.replace('-', " "))
        .collect();
    pool.shuffle(&mut rand::thread_rng());
    pool.truncate(moves_sampled);

    let sprite = pokemon
        .sprites
        .other
        .official_artwork
        .front_default
        .or(pokemon.sprites.front_default)
        .unwrap_or_default();
    if sprite.is_empty() {
        warn!(%id, "Creature has no sprite");
    }

    let generation = trailing_id(&species.generation.url)
        .and_then(|g| u8::try_from(g).ok())
        .unwrap_or(1);
    let mut creature = Creature::new(id, display_name(&pokemon.name))
        .with_types(pokemon.types.into_iter().map(|t| t.kind.name).collect::<Vec<_>>())
        .with_height(pokemon.height)
        .with_weight(pokemon.weight)
        .with_sprite(sprite)
        .with_stats(stats)
        .with_generation(generation)
        .with_flavor_text(flavor_text)
        .with_moves(pool);
    if let Some(chain) = species.evolution_chain.as_ref().and_then(|c| trailing_id(&c.url)) {
        creature = creature.with_evolution_chain_id(chain);
    }
    Ok(creature)
}

/// Flavor text from the API contains form feeds and hard line breaks.
fn normalize_flavor(raw: &str) -> String {
    raw.split(['\u{c}', '\n', '\r'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts the numeric id at the end of a resource URL such as
/// `https://pokeapi.co/api/v2/generation/3/`.
fn trailing_id(url: &str) -> Option<u32> {
    url.split('/').filter(|s| !s.is_empty()).next_back()?.parse().ok()
}

#[derive(Debug, Deserialize)]
struct ListPage {
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UrlResource {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PokemonResponse {
    name: String,
    height: u32,
    weight: u32,
    types: Vec<TypeSlot>,
    sprites: Sprites,
    stats: Vec<StatSlot>,
    moves: Vec<MoveSlot>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct StatSlot {
    base_stat: u16,
}

#[derive(Debug, Deserialize)]
struct MoveSlot {
    #[serde(rename = "move")]
    entry: NamedResource,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    front_default: Option<String>,
    #[serde(default)]
    other: OtherSprites,
}

#[derive(Debug, Default, Deserialize)]
struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    official_artwork: Artwork,
}

#[derive(Debug, Default, Deserialize)]
struct Artwork {
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpeciesResponse {
    flavor_text_entries: Vec<FlavorEntry>,
    generation: UrlResource,
    evolution_chain: Option<UrlResource>,
}

#[derive(Debug, Deserialize)]
struct FlavorEntry {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Debug, Deserialize)]
struct EvolutionChain {
    chain: ChainLink,
}

#[derive(Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    evolves_to: Vec<ChainLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_id_reads_last_segment() {
        assert_eq!(trailing_id("https://pokeapi.co/api/v2/generation/3/"), Some(3));
        assert_eq!(trailing_id("https://pokeapi.co/api/v2/evolution-chain/10"), Some(10));
        assert_eq!(trailing_id("nope"), None);
    }

    #[test]
    fn oversized_generation_falls_back_to_first() {
        let pokemon: PokemonResponse = serde_json::from_value(serde_json::json!({
            "name": "missingno",
            "height": 10,
            "weight": 100,
            "types": [],
            "sprites": { "front_default": null },
            "stats": [
                { "base_stat": 1 }, { "base_stat": 1 }, { "base_stat": 1 },
                { "base_stat": 1 }, { "base_stat": 1 }, { "base_stat": 1 }
            ],
            "moves": []
        }))
        .expect("pokemon json");
        let species: SpeciesResponse = serde_json::from_value(serde_json::json!({
            "flavor_text_entries": [],
            "generation": { "url": "https://pokeapi.co/api/v2/generation/300/" },
            "evolution_chain": null
        }))
        .expect("species json");

        let c = assemble(CreatureId::from(0), pokemon, species, 4).expect("assemble");
        assert_eq!(*c.generation(), 1);
        assert_eq!(c.flavor_text(), NO_ENTRY);
        assert_eq!(*c.evolution_chain_id(), None);
    }

    #[test]
    fn flavor_text_is_flattened() {
        assert_eq!(
            normalize_flavor("When several of\nthese POKéMON\u{c}gather"),
            "When several of these POKéMON gather"
        );
    }

    #[test]
    fn assemble_builds_record_from_responses() {
        let pokemon: PokemonResponse = serde_json::from_value(serde_json::json!({
            "name": "pikachu",
            "height": 4,
            "weight": 60,
            "types": [{ "type": { "name": "electric" } }],
            "sprites": {
                "front_default": "small.png",
                "other": { "official-artwork": { "front_default": "art.png" } }
            },
            "stats": [
                { "base_stat": 35 }, { "base_stat": 55 }, { "base_stat": 40 },
                { "base_stat": 50 }, { "base_stat": 50 }, { "base_stat": 90 }
            ],
            "moves": [
                { "move": { "name": "thunder-shock" } },
                { "move": { "name": "quick-attack" } },
                { "move": { "name": "tail-whip" } },
                { "move": { "name": "growl" } },
                { "move": { "name": "thunder" } }
            ]
        }))
        .expect("pokemon json");
        let species: SpeciesResponse = serde_json::from_value(serde_json::json!({
            "flavor_text_entries": [
                { "flavor_text": "Eine Maus", "language": { "name": "de" } },
                { "flavor_text": "It keeps its tail\nraised.", "language": { "name": "en" } }
            ],
            "generation": { "url": "https://pokeapi.co/api/v2/generation/1/" },
            "evolution_chain": { "url": "https://pokeapi.co/api/v2/evolution-chain/10/" }
        }))
        .expect("species json");

        let c = assemble(CreatureId::from(25), pokemon, species, 4).expect("assemble");
        assert_eq!(c.name(), "Pikachu");
        assert_eq!(c.types(), &["electric".to_string()]);
        assert_eq!(c.sprite(), "art.png");
        assert_eq!(c.stats().speed, 90);
        assert_eq!(*c.generation(), 1);
        assert_eq!(c.flavor_text(), "It keeps its tail raised.");
        assert_eq!(c.moves().len(), 4);
        assert!(c.moves().iter().all(|m| !m.contains('-')));
        assert_eq!(*c.evolution_chain_id(), Some(10));
    }
}
