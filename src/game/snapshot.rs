//! Read-only views of a round handed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::{GameMode, Obscurity, SessionId};
use crate::creature::{BaseStats, Creature};
use crate::narrative::Exchange;

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The creature was identified (or the speed run clock ran out).
    Success,
    /// The player gave up or ran out of questions.
    Forfeit,
}

impl Outcome {
    /// Returns true for [`Outcome::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Final result of a round, set exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Success or forfeit.
    pub outcome: Outcome,
    /// Final score; zero on forfeit.
    pub score: u32,
}

/// Response to a wrong guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    /// Hint contrasting the guess with the target.
    Comparison(String),
    /// Mockery once the player keeps missing.
    Taunt(String),
}

/// The mode-specific clue the player is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clue {
    /// Obscured sprite (silhouette and speed run).
    Silhouette {
        /// Sprite reference.
        sprite: String,
        /// Current filter levels.
        obscurity: Obscurity,
    },
    /// Base stat chart.
    StatChart {
        /// The six stats.
        stats: BaseStats,
    },
    /// Flavor text, redacted until the round ends.
    Redacted {
        /// Text to display.
        text: String,
    },
    /// Sampled move list.
    Moves {
        /// Move names.
        moves: Vec<String>,
    },
    /// Three statements to pick the lie from.
    Statements {
        /// Statement texts in display order.
        statements: Vec<String>,
        /// Index of the lie, revealed once the round ends.
        lie: Option<usize>,
    },
    /// Elimination dialogue; the player knows the target.
    Dialogue {
        /// Name of the creature the player is "thinking of".
        target_name: String,
        /// Its sprite.
        sprite: String,
        /// Question awaiting an answer.
        question: String,
        /// Questions answered so far.
        history: Vec<Exchange>,
    },
}

/// Lifecycle phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No round bound.
    Idle,
    /// Round in progress.
    Active,
    /// Round resolved.
    Terminal,
}

/// Everything the presentation layer needs to draw a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identity.
    pub id: SessionId,
    /// Mode being played.
    pub mode: GameMode,
    /// Active or Terminal.
    pub phase: Phase,
    /// Mission briefing.
    pub briefing: String,
    /// Hints bought so far.
    pub hints_used: u8,
    /// Maximum hints per round.
    pub clue_budget: u8,
    /// Wrong guesses so far.
    pub failed_guesses: u32,
    /// Most recent hint text.
    pub latest_hint: Option<String>,
    /// Reaction to the most recent wrong guess.
    pub feedback: Option<Feedback>,
    /// The mode's clue.
    pub clue: Clue,
    /// Whole seconds since the round started.
    pub elapsed_secs: u64,
    /// Seconds left (speed run only).
    pub time_left: Option<u32>,
    /// Creatures identified so far (speed run only).
    pub identified: Option<u32>,
    /// Final result once terminal.
    pub result: Option<RoundResult>,
    /// The target, revealed once terminal.
    pub revealed: Option<Creature>,
    /// Post-match trivia, if any arrived.
    pub lore: Option<String>,
}

impl SessionSnapshot {
    /// Returns true once the round has resolved.
    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }
}

/// Result of submitting an operation to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The operation is not valid in the current state or mode; nothing changed.
    Ignored,
    /// The round continues.
    Active(SessionSnapshot),
    /// The round has resolved.
    Terminal(SessionSnapshot),
}

impl Reply {
    /// Wraps a snapshot according to its phase.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        if snapshot.is_terminal() {
            Self::Terminal(snapshot)
        } else {
            Self::Active(snapshot)
        }
    }

    /// Returns true if the operation was ignored.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    /// Returns the snapshot, if any.
    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        match self {
            Self::Ignored => None,
            Self::Active(s) | Self::Terminal(s) => Some(s),
        }
    }
}
