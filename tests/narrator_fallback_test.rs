//! Tests for the narrator's fallback substitution.

use std::sync::Arc;

use async_trait::async_trait;

use pokeguess::{
    Answer, Creature, CreatureId, Exchange, GameMode, NarrativeError, NarrativeGenerator, Narrator,
    REDACTED, Statement, is_valid_true_false_set,
};

/// Generator that returns broken output for everything.
struct Garbage;

#[async_trait]
impl NarrativeGenerator for Garbage {
    async fn hint(&self, _creature_name: &str, _level: u8) -> Result<String, NarrativeError> {
        Ok("   ".to_string())
    }

    async fn briefing(&self, _mode: GameMode) -> Result<String, NarrativeError> {
        Err(NarrativeError::new("rate limited"))
    }

    async fn redaction(
        &self,
        _flavor_text: &str,
        creature_name: &str,
    ) -> Result<String, NarrativeError> {
        Ok(format!("The {} leaks its own name.", creature_name))
    }

    async fn true_false_set(&self, _creature: &Creature) -> Result<Vec<Statement>, NarrativeError> {
        Ok(vec![Statement::new("Only one statement", true)])
    }

    async fn next_question(
        &self,
        _history: &[Exchange],
        _target_name: &str,
    ) -> Result<String, NarrativeError> {
        Ok(String::new())
    }

    async fn comparison_hint(
        &self,
        target_name: &str,
        _guessed_name: &str,
    ) -> Result<String, NarrativeError> {
        Ok(format!("Smaller than {}.", target_name))
    }

    async fn post_match_lore(&self, _creature_name: &str) -> Result<String, NarrativeError> {
        Ok("\n".to_string())
    }
}

fn garbage() -> Narrator {
    Narrator::new(Arc::new(Garbage))
}

#[tokio::test]
async fn test_blank_and_failed_text_falls_back() {
    let narrator = garbage();
    assert!(!narrator.hint("Pikachu", 1).await.trim().is_empty());
    let briefing = narrator.briefing(GameMode::StatRadar).await;
    assert!(briefing.contains(GameMode::StatRadar.title()));
    assert!(!narrator.next_question(&[], "Pikachu").await.is_empty());
    assert_eq!(narrator.post_match_lore("Pikachu").await, None);
}

#[tokio::test]
async fn test_generated_text_is_redacted() {
    let narrator = garbage();
    let redacted = narrator.redaction("Pikachu stores electricity.", "Pikachu").await;
    assert_eq!(redacted, format!("The {} leaks its own name.", REDACTED));

    let comparison = narrator.comparison_hint("Pikachu", "Raichu").await;
    assert!(!comparison.contains("Pikachu"));
}

#[tokio::test]
async fn test_malformed_statement_set_is_replaced() {
    let set = garbage()
        .true_false_set(&Creature::new(CreatureId::from(25), "Pikachu"))
        .await;
    assert!(is_valid_true_false_set(&set));
}

#[tokio::test]
async fn test_offline_narrator_redacts_raw_flavor_text() {
    let narrator = Narrator::offline();
    assert!(!narrator.is_online());
    let text = narrator
        .redaction("PIKACHU that can generate powerful electricity.", "Pikachu")
        .await;
    assert_eq!(text, format!("{} that can generate powerful electricity.", REDACTED));
    let history = [Exchange {
        question: "Is it yellow?".to_string(),
        answer: Answer::Yes,
    }];
    assert_eq!(narrator.next_question(&history, "Pikachu").await, "Is it a legendary?");
}

#[test]
fn test_answers_parse_loosely() {
    assert_eq!("yes".parse::<Answer>().ok(), Some(Answer::Yes));
    assert_eq!("N".parse::<Answer>().ok(), Some(Answer::No));
    assert_eq!("Unsure".parse::<Answer>().ok(), Some(Answer::Unsure));
    assert!("maybe".parse::<Answer>().is_err());
    assert_eq!(Answer::No.to_string(), "NO");
}
