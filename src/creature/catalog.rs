//! Static creature catalog with search helpers for guess input.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use super::{CatalogEntry, CreatureId};

/// Maximum number of autocomplete suggestions returned.
pub const MAX_SUGGESTIONS: usize = 5;

/// Ordered id/name list of every known creature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Wraps an ordered list of entries.
    #[instrument(skip(entries), fields(count = entries.len()))]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Builds a catalog from bare names, assigning 1-based ids in order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| CatalogEntry::new(CreatureId::from(i as u32 + 1), name.into()))
            .collect();
        Self { entries }
    }

    /// All entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: CreatureId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| *e.id() == id)
    }

    /// Picks a creature id uniformly at random.
    pub fn random_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<CreatureId> {
        self.entries.choose(rng).map(|e| *e.id())
    }

    /// Autocomplete: up to [`MAX_SUGGESTIONS`] names starting with `query`.
    ///
    /// Queries of one character or less yield nothing.
    #[instrument(skip(self))]
    pub fn suggestions(&self, query: &str) -> Vec<&CatalogEntry> {
        let query = query.trim().to_lowercase();
        if query.chars().count() <= 1 {
            return Vec::new();
        }
        let found: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.name().to_lowercase().starts_with(&query))
            .take(MAX_SUGGESTIONS)
            .collect();
        debug!(matches = found.len(), "Computed suggestions");
        found
    }

    /// Dex browser filter: every entry whose name contains `query`.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let query = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name().to_lowercase().contains(&query))
            .collect()
    }
}

/// Capitalizes the first character of an API name (`"pikachu"` -> `"Pikachu"`).
pub fn display_name(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_capitalizes() {
        assert_eq!(display_name("pikachu"), "Pikachu");
        assert_eq!(display_name("mr-mime"), "Mr-mime");
        assert_eq!(display_name(""), "");
    }
}
