//! Tests for catalog lookup, suggestions, and random selection.

use rand::SeedableRng;
use rand::rngs::StdRng;

use pokeguess::{Catalog, CreatureId, MAX_SUGGESTIONS};

fn catalog() -> Catalog {
    Catalog::from_names([
        "Bulbasaur", "Ivysaur", "Venusaur", "Charmander", "Charmeleon", "Charizard", "Pichu",
        "Pikachu", "Raichu", "Pidgey", "Pidgeotto", "Pidgeot", "Pinsir",
    ])
}

#[test]
fn test_ids_are_one_based_positions() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 13);
    let first = catalog.get(CreatureId::from(1)).expect("First entry exists");
    assert_eq!(first.name(), "Bulbasaur");
    assert_eq!(
        catalog.get(CreatureId::from(8)).map(|e| e.name().as_str()),
        Some("Pikachu")
    );
    assert!(catalog.get(CreatureId::from(0)).is_none());
    assert!(catalog.get(CreatureId::from(14)).is_none());
}

#[test]
fn test_suggestions_need_two_characters() {
    let catalog = catalog();
    assert!(catalog.suggestions("").is_empty());
    assert!(catalog.suggestions("p").is_empty());
    let names: Vec<_> = catalog.suggestions("CHAR").iter().map(|e| e.name().clone()).collect();
    assert_eq!(names, vec!["Charmander", "Charmeleon", "Charizard"]);
}

#[test]
fn test_suggestions_are_capped() {
    let catalog = catalog();
    let found = catalog.suggestions("pi");
    assert_eq!(found.len(), MAX_SUGGESTIONS);
    assert!(found.iter().all(|e| e.name().starts_with("Pi")));
}

#[test]
fn test_search_matches_substrings() {
    let catalog = catalog();
    let names: Vec<_> = catalog.search("saur").iter().map(|e| e.name().clone()).collect();
    assert_eq!(names, vec!["Bulbasaur", "Ivysaur", "Venusaur"]);
    assert!(catalog.search("mew").is_empty());
}

#[test]
fn test_random_id_stays_in_catalog() {
    let catalog = catalog();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let id = catalog.random_id(&mut rng).expect("Catalog is not empty");
        assert!(catalog.get(id).is_some());
    }
    assert_eq!(Catalog::default().random_id(&mut rng), None);
}
