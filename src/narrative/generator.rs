//! Narrative collaborator interface and its data types.

use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use tracing::{instrument, warn};

use crate::creature::Creature;
use crate::game::GameMode;
use crate::llm_client::LlmError;

/// One statement of a true/false set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Statement text shown to the player.
    pub statement: String,
    /// Whether this is the planted falsehood.
    pub is_lie: bool,
}

impl Statement {
    /// Creates a statement.
    pub fn new(statement: impl Into<String>, is_lie: bool) -> Self {
        Self {
            statement: statement.into(),
            is_lie,
        }
    }
}

/// Player's reply to a yes/no question.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Answer {
    /// Affirmative.
    #[strum(to_string = "YES", serialize = "y")]
    Yes,
    /// Negative.
    #[strum(to_string = "NO", serialize = "n")]
    No,
    /// Player does not know.
    #[strum(to_string = "UNSURE", serialize = "?")]
    Unsure,
}

/// One question/answer pair of the elimination dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// Question asked by the game.
    pub question: String,
    /// Player's answer.
    pub answer: Answer,
}

/// Generator of game-flavored text.
///
/// Every method may fail or return junk; callers go through
/// [`Narrator`](super::Narrator), which substitutes fallbacks.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// A cryptic hint; `level` runs from 1 (vague) to 5 (specific).
    async fn hint(&self, creature_name: &str, level: u8) -> Result<String, NarrativeError>;

    /// Mission briefing shown when a round starts.
    async fn briefing(&self, mode: GameMode) -> Result<String, NarrativeError>;

    /// Flavor text with the creature's name blanked out.
    async fn redaction(
        &self,
        flavor_text: &str,
        creature_name: &str,
    ) -> Result<String, NarrativeError>;

    /// Three statements about the creature, exactly one of them false.
    async fn true_false_set(&self, creature: &Creature) -> Result<Vec<Statement>, NarrativeError>;

    /// Next yes/no question given the dialogue so far.
    async fn next_question(
        &self,
        history: &[Exchange],
        target_name: &str,
    ) -> Result<String, NarrativeError>;

    /// Hint contrasting a wrong guess with the target.
    async fn comparison_hint(
        &self,
        target_name: &str,
        guessed_name: &str,
    ) -> Result<String, NarrativeError>;

    /// Trivia shown after a successful round.
    async fn post_match_lore(&self, creature_name: &str) -> Result<String, NarrativeError>;
}

/// Narrative generation error.
#[derive(Debug, Clone, Display, Error)]
#[display("Narrative error: {} at {}:{}", message, file, line)]
pub struct NarrativeError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl NarrativeError {
    /// Creates a new narrative error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        warn!(error_message = %message, "Narrative error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<LlmError> for NarrativeError {
    #[track_caller]
    fn from(err: LlmError) -> Self {
        Self::new(err.message)
    }
}
