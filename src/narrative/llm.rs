//! Narrative generator backed by a text-generation API.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::{Exchange, NarrativeError, NarrativeGenerator, Statement};
use crate::creature::Creature;
use crate::game::GameMode;
use crate::llm_client::LlmClient;

const DEXTER: &str = "You are Dexter, a terse AI field encyclopedia of creatures. \
    Reply with a single short sentence and nothing else.";
const PROFESSOR: &str = "You are a veteran creature professor dispatching trainers on missions. \
    Reply with one urgent sentence in classic anime style, under 20 words.";
const EDITOR: &str = "You edit text. Output only the edited text, with no commentary.";
const QUIZMASTER: &str = "You write quiz material. Output only JSON, no prose or code fences.";

/// [`NarrativeGenerator`] that prompts an [`LlmClient`].
#[derive(Debug, Clone)]
pub struct LlmNarrator {
    client: LlmClient,
}

impl LlmNarrator {
    /// Wraps a configured client.
    #[instrument(skip(client))]
    pub fn new(client: LlmClient) -> Self {
        info!("Creating LLM narrator");
        Self { client }
    }
}

/// Pulls a JSON array out of a reply that may be wrapped in prose or fences.
fn parse_statements(reply: &str) -> Result<Vec<Statement>, NarrativeError> {
    let start = reply.find('[');
    let end = reply.rfind(']');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &reply[s..=e],
        _ => return Err(NarrativeError::new("No JSON array in statement reply")),
    };
    serde_json::from_str(json)
        .map_err(|e| NarrativeError::new(format!("Malformed statement JSON: {}", e)))
}

#[async_trait]
impl NarrativeGenerator for LlmNarrator {
    #[instrument(skip(self))]
    async fn hint(&self, creature_name: &str, level: u8) -> Result<String, NarrativeError> {
        let prompt = format!(
            "Give a cryptic clue about {creature_name}. Difficulty {level}/5: at low levels stay \
             vague (habitat, color); at high levels mention a signature ability or move. Never \
             name it or its evolutions. Under 15 words. Format: \"DEXTER HINT: <hint>\""
        );
        Ok(self.client.generate(DEXTER, &prompt).await?)
    }

    #[instrument(skip(self))]
    async fn briefing(&self, mode: GameMode) -> Result<String, NarrativeError> {
        let prompt = format!("Brief a trainer starting a \"{}\" mission.", mode.title());
        Ok(self.client.generate(PROFESSOR, &prompt).await?)
    }

    #[instrument(skip(self, flavor_text))]
    async fn redaction(
        &self,
        flavor_text: &str,
        creature_name: &str,
    ) -> Result<String, NarrativeError> {
        let prompt = format!(
            "Replace the name \"{creature_name}\" and its species category (such as \"the Mouse \
             creature\") with [REDACTED] in this text, leaving every other word \
             unchanged:\n{flavor_text}"
        );
        Ok(self.client.generate(EDITOR, &prompt).await?)
    }

    #[instrument(skip(self, creature), fields(name = %creature.name()))]
    async fn true_false_set(&self, creature: &Creature) -> Result<Vec<Statement>, NarrativeError> {
        let prompt = format!(
            "Write 3 statements of at most 10 words about the creature {} (types: {}). Two must be \
             true facts about its biology, moves or types; exactly one must be a plausible lie. \
             Return a JSON array of objects with keys \"statement\" (string) and \"isLie\" (bool).",
            creature.name(),
            creature.types().join("/"),
        );
        let reply = self.client.generate(QUIZMASTER, &prompt).await?;
        let set = parse_statements(&reply)?;
        debug!(count = set.len(), "Parsed statements");
        Ok(set)
    }

    #[instrument(skip(self, history), fields(asked = history.len()))]
    async fn next_question(
        &self,
        history: &[Exchange],
        target_name: &str,
    ) -> Result<String, NarrativeError> {
        let transcript = history
            .iter()
            .map(|h| format!("Q: {} A: {}", h.question, h.answer))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "You are deducing which creature the player has in mind; it is {target_name}. \
             Questions so far:\n{transcript}\nAsk the next best short yes/no question. If you are \
             90% sure, ask \"Are you <name>?\". Otherwise ask about appearance, type or abilities."
        );
        Ok(self.client.generate(DEXTER, &prompt).await?)
    }

    #[instrument(skip(self))]
    async fn comparison_hint(
        &self,
        target_name: &str,
        guessed_name: &str,
    ) -> Result<String, NarrativeError> {
        let prompt = format!(
            "The player guessed \"{guessed_name}\" but the answer is \"{target_name}\". \
             Give a hint comparing the two or naming a key difference, without saying \
             \"{target_name}\"."
        );
        Ok(self.client.generate(DEXTER, &prompt).await?)
    }

    #[instrument(skip(self))]
    async fn post_match_lore(&self, creature_name: &str) -> Result<String, NarrativeError> {
        let prompt = format!(
            "Share one rare or funny fact about {creature_name} a trainer should know. \
             Start with \"DID YOU KNOW?\""
        );
        Ok(self.client.generate(DEXTER, &prompt).await?)
    }
}
