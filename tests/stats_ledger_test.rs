//! Tests for the player statistics ledger.

use pokeguess::{GameMode, MemoryStatsStore, Outcome, PlayerStats, StatsLedger, StatsStore};

const KEY: &str = "player_stats_v3";

fn fresh() -> StatsLedger {
    StatsLedger::load(Box::new(MemoryStatsStore::new()), KEY)
}

#[test]
fn test_success_updates_totals_and_badge() {
    let mut ledger = fresh();
    let stats = ledger.record_outcome(GameMode::StatRadar, Outcome::Success, 700);
    assert_eq!(stats.games_completed, 1);
    assert_eq!(stats.total_score, 700);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.highest_streak, 1);
    assert!(stats.has_badge(GameMode::StatRadar));
    assert!(!stats.has_badge(GameMode::Silhouette));
}

#[test]
fn test_badge_unlocks_once() {
    let mut ledger = fresh();
    ledger.record_outcome(GameMode::MoveMaster, Outcome::Success, 500);
    ledger.record_outcome(GameMode::MoveMaster, Outcome::Success, 500);
    assert_eq!(ledger.stats().badges.len(), 1);
    assert_eq!(ledger.stats().games_completed, 2);
}

#[test]
fn test_forfeit_breaks_streak_but_keeps_best() {
    let mut ledger = fresh();
    for _ in 0..3 {
        ledger.record_outcome(GameMode::Silhouette, Outcome::Success, 100);
    }
    let stats = ledger.record_outcome(GameMode::Silhouette, Outcome::Forfeit, 0);
    assert_eq!(stats.current_streak, 0);
    assert_eq!(stats.highest_streak, 3);
    assert_eq!(stats.games_completed, 3);

    let stats = ledger.record_outcome(GameMode::TwoTruths, Outcome::Success, 900);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.highest_streak, 3);
    assert_eq!(stats.total_score, 1200);
}

#[test]
fn test_outcome_is_persisted() {
    struct Shared(std::sync::Arc<MemoryStatsStore>);
    impl StatsStore for Shared {
        fn load(&self, key: &str) -> Result<Option<String>, pokeguess::StoreError> {
            self.0.load(key)
        }
        fn save(&self, key: &str, blob: &str) -> Result<(), pokeguess::StoreError> {
            self.0.save(key, blob)
        }
    }

    let store = std::sync::Arc::new(MemoryStatsStore::new());
    let mut ledger = StatsLedger::load(Box::new(Shared(store.clone())), KEY);
    ledger.record_outcome(GameMode::ReverseGuess, Outcome::Success, 850);

    let reloaded = StatsLedger::load(Box::new(Shared(store)), KEY);
    assert_eq!(reloaded.stats(), ledger.stats());
    assert!(reloaded.stats().has_badge(GameMode::ReverseGuess));
}

#[test]
fn test_corrupt_record_yields_defaults() {
    let store = MemoryStatsStore::with_blob(KEY, "{not json");
    let ledger = StatsLedger::load(Box::new(store), KEY);
    assert_eq!(ledger.stats(), &PlayerStats::default());
}

#[test]
fn test_partial_record_fills_missing_fields() {
    let store =
        MemoryStatsStore::with_blob(KEY, r#"{"gamesCompleted": 4, "badges": ["speed-run"]}"#);
    let ledger = StatsLedger::load(Box::new(store), KEY);
    assert_eq!(ledger.stats().games_completed, 4);
    assert_eq!(ledger.stats().total_score, 0);
    assert!(ledger.stats().has_badge(GameMode::SpeedRun));
}
