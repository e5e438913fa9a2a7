//! Fallback-substituting front for the narrative generator.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::fallback;
use super::{Exchange, NarrativeError, NarrativeGenerator, Statement};
use crate::creature::Creature;
use crate::game::GameMode;

/// Infallible narrative source used by the session engine.
///
/// Wraps an optional generator. Failures, blank output, and malformed
/// statement sets are replaced by fixed fallbacks so a round never aborts
/// because of text generation.
#[derive(Clone, Default)]
pub struct Narrator {
    generator: Option<Arc<dyn NarrativeGenerator>>,
}

impl std::fmt::Debug for Narrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrator")
            .field("generator", &self.generator.is_some())
            .finish()
    }
}

/// Trims generated text, treating blank output as a failure.
fn non_empty(result: Result<String, NarrativeError>) -> Option<String> {
    match result {
        Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Ok(_) => {
            debug!("Generator returned blank text");
            None
        }
        Err(e) => {
            warn!(error = %e, "Generator failed");
            None
        }
    }
}

impl Narrator {
    /// Narrator backed by a generator.
    pub fn new(generator: Arc<dyn NarrativeGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// Narrator that only ever produces fallbacks.
    pub fn offline() -> Self {
        Self { generator: None }
    }

    /// Returns true if a generator is attached.
    pub fn is_online(&self) -> bool {
        self.generator.is_some()
    }

    /// Hint for the given clue level.
    #[instrument(skip(self))]
    pub async fn hint(&self, creature_name: &str, level: u8) -> String {
        let text = match &self.generator {
            Some(g) => non_empty(g.hint(creature_name, level).await),
            None => None,
        };
        text.unwrap_or_else(|| fallback::HINT.to_string())
    }

    /// Mission briefing for a round start.
    #[instrument(skip(self))]
    pub async fn briefing(&self, mode: GameMode) -> String {
        let text = match &self.generator {
            Some(g) => non_empty(g.briefing(mode).await),
            None => None,
        };
        text.unwrap_or_else(|| fallback::briefing(mode))
    }

    /// Redacted flavor text; never leaks the creature's name.
    #[instrument(skip(self, flavor_text))]
    pub async fn redaction(&self, flavor_text: &str, creature_name: &str) -> String {
        let text = match &self.generator {
            Some(g) => non_empty(g.redaction(flavor_text, creature_name).await),
            None => None,
        };
        let text = text.unwrap_or_else(|| flavor_text.to_string());
        fallback::redact(&text, creature_name)
    }

    /// Three statements with exactly one lie.
    #[instrument(skip(self, creature), fields(name = %creature.name()))]
    pub async fn true_false_set(&self, creature: &Creature) -> Vec<Statement> {
        let set = match &self.generator {
            Some(g) => match g.true_false_set(creature).await {
                Ok(set) if fallback::is_valid_true_false_set(&set) => Some(set),
                Ok(set) => {
                    warn!(len = set.len(), "Rejected malformed statement set");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Generator failed");
                    None
                }
            },
            None => None,
        };
        set.unwrap_or_else(fallback::true_false_set)
    }

    /// Next elimination question.
    #[instrument(skip(self, history), fields(asked = history.len()))]
    pub async fn next_question(&self, history: &[Exchange], target_name: &str) -> String {
        let text = match &self.generator {
            Some(g) => non_empty(g.next_question(history, target_name).await),
            None => None,
        };
        text.unwrap_or_else(|| fallback::QUESTION.to_string())
    }

    /// Feedback contrasting a wrong guess with the target.
    #[instrument(skip(self))]
    pub async fn comparison_hint(&self, target_name: &str, guessed_name: &str) -> String {
        let text = match &self.generator {
            Some(g) => non_empty(g.comparison_hint(target_name, guessed_name).await),
            None => None,
        };
        // The target's name must not slip through.
        text.map(|t| fallback::redact(&t, target_name))
            .unwrap_or_else(|| fallback::COMPARISON.to_string())
    }

    /// Post-match trivia, absent when nothing usable was generated.
    #[instrument(skip(self))]
    pub async fn post_match_lore(&self, creature_name: &str) -> Option<String> {
        match &self.generator {
            Some(g) => non_empty(g.post_match_lore(creature_name).await),
            None => None,
        }
    }
}
