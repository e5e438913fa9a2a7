//! Live connectivity tests for the LLM client, narrator, and creature API.
//!
//! Run with `--features api`; they need network access and API keys.

use std::sync::Arc;

use pokeguess::{
    CreatureId, CreatureProvider, GameMode, LlmClient, LlmConfig, LlmNarrator, LlmProvider,
    Narrator, PokeApiClient, PokeApiSettings, is_valid_true_false_set,
};
use tracing::instrument;

fn openai_client() -> LlmClient {
    dotenvy::dotenv().ok();
    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
    LlmClient::new(LlmConfig::new(
        LlmProvider::OpenAI,
        api_key,
        "gpt-4o-mini".to_string(),
        150,
    ))
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_connectivity() {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("ANTHROPIC_API_KEY").expect("ANTHROPIC_API_KEY not set");

    let config = LlmConfig::new(
        LlmProvider::Anthropic,
        api_key,
        "claude-3-5-haiku-20241022".to_string(),
        50,
    );

    let client = LlmClient::new(config);

    let response = client
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_connectivity() {
    let response = openai_client()
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_live_narration() {
    let narrator = Narrator::new(Arc::new(LlmNarrator::new(openai_client())));
    let provider = PokeApiClient::new(PokeApiSettings::default());
    let pikachu = provider
        .get_creature(CreatureId::from(25))
        .await
        .expect("Failed to fetch creature");

    let hint = narrator.hint(pikachu.name(), 3).await;
    assert!(!hint.is_empty());
    eprintln!("Hint: {}", hint);

    let briefing = narrator.briefing(GameMode::TwoTruths).await;
    assert!(!briefing.is_empty());

    let set = narrator.true_false_set(&pikachu).await;
    assert!(is_valid_true_false_set(&set));
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_pokeapi_connectivity() {
    let client = PokeApiClient::new(PokeApiSettings::default());

    let catalog = client.list_creatures().await.expect("Failed to fetch catalog");
    assert!(catalog.len() > 150);
    assert_eq!(
        catalog.get(CreatureId::from(25)).map(|e| e.name().as_str()),
        Some("Pikachu")
    );

    let pikachu = client
        .get_creature(CreatureId::from(25))
        .await
        .expect("Failed to fetch creature");
    assert_eq!(pikachu.name(), "Pikachu");
    assert_eq!(*pikachu.generation(), 1);
    assert!(pikachu.types().iter().any(|t| t == "electric"));
    assert!(!pikachu.flavor_text().is_empty());

    let chain_id = (*pikachu.evolution_chain_id()).expect("Pikachu evolves");
    let line = client.evolution_line(chain_id).await.expect("Failed to fetch chain");
    assert_eq!(line, vec!["Pichu", "Pikachu", "Raichu"]);
}
