//! Cumulative player statistics and badge unlocks.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::StatsStore;
use crate::game::{GameMode, Outcome};

/// Lifetime statistics of the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStats {
    /// Rounds won.
    pub games_completed: u32,
    /// Sum of all winning scores.
    pub total_score: u64,
    /// Consecutive wins up to now.
    pub current_streak: u32,
    /// Best streak ever reached.
    pub highest_streak: u32,
    /// Modes won at least once.
    pub badges: BTreeSet<GameMode>,
}

impl PlayerStats {
    /// Folds one finished round into the totals.
    ///
    /// Only wins count as completed games; a forfeit just breaks the streak.
    pub fn record(&mut self, mode: GameMode, outcome: Outcome, score: u32) {
        match outcome {
            Outcome::Success => {
                self.games_completed += 1;
                self.total_score += u64::from(score);
                self.current_streak += 1;
                self.highest_streak = self.highest_streak.max(self.current_streak);
                self.badges.insert(mode);
            }
            Outcome::Forfeit => {
                self.current_streak = 0;
            }
        }
    }

    /// Returns true if the badge for `mode` is unlocked.
    pub fn has_badge(&self, mode: GameMode) -> bool {
        self.badges.contains(&mode)
    }
}

/// Statistics plus the store they are persisted to.
pub struct StatsLedger {
    stats: PlayerStats,
    store: Box<dyn StatsStore>,
    key: String,
}

impl std::fmt::Debug for StatsLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsLedger")
            .field("stats", &self.stats)
            .field("key", &self.key)
            .finish()
    }
}

impl StatsLedger {
    /// Loads the ledger from `store`.
    ///
    /// A missing, unreadable, or corrupt record silently yields zeroed stats.
    #[instrument(skip(store, key), fields(key = %key.as_ref()))]
    pub fn load(store: Box<dyn StatsStore>, key: impl AsRef<str>) -> Self {
        let key = key.as_ref().to_string();
        let stats = match store.load(&key) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                warn!(error = %e, "Corrupt stats record, starting fresh");
                PlayerStats::default()
            }),
            Ok(None) => {
                debug!("No stats record, starting fresh");
                PlayerStats::default()
            }
            Err(e) => {
                warn!(error = %e, "Stats store unreadable, starting fresh");
                PlayerStats::default()
            }
        };
        info!(games_completed = stats.games_completed, "Stats loaded");
        Self { stats, store, key }
    }

    /// Current statistics.
    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    /// Records a finished round and persists the ledger.
    #[instrument(skip(self))]
    pub fn record_outcome(&mut self, mode: GameMode, outcome: Outcome, score: u32) -> &PlayerStats {
        self.stats.record(mode, outcome, score);
        info!(
            current_streak = self.stats.current_streak,
            total_score = self.stats.total_score,
            "Outcome recorded"
        );
        self.persist();
        &self.stats
    }

    /// Writes the ledger to the store; failures are logged and swallowed.
    #[instrument(skip(self))]
    fn persist(&self) {
        let blob = match serde_json::to_string(&self.stats) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "Failed to serialize stats");
                return;
            }
        };
        if let Err(e) = self.store.save(&self.key, &blob) {
            warn!(error = %e, "Failed to persist stats; keeping them in memory");
        }
    }
}
