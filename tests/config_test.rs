//! Tests for TOML configuration loading.

use std::io::Write;

use tempfile::NamedTempFile;

use pokeguess::{GameConfig, LlmProvider};

#[test]
fn test_defaults() {
    let config = GameConfig::default();
    assert_eq!(*config.llm().provider(), LlmProvider::OpenAI);
    assert_eq!(config.llm().model(), "gpt-4o-mini");
    assert_eq!(config.pokeapi().base_url(), "https://pokeapi.co/api/v2");
    assert_eq!(*config.pokeapi().catalog_limit(), 1010);
    assert_eq!(config.rules().clue_budget, 5);
    assert_eq!(config.rules().question_budget, 15);
    assert_eq!(config.rules().speed_run_seconds, 60);
    assert_eq!(config.stats().db_path(), "pokeguess.db");
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let config = GameConfig::from_toml(
        r#"
        [llm]
        provider = "anthropic"
        model = "claude-3-5-haiku-20241022"

        [rules]
        speed_run_seconds = 90
        "#,
    )
    .expect("Parse failed");
    assert_eq!(*config.llm().provider(), LlmProvider::Anthropic);
    assert_eq!(*config.llm().max_tokens(), 150);
    assert_eq!(config.rules().speed_run_seconds, 90);
    assert_eq!(config.rules().base_score, 1000);
    assert_eq!(*config.pokeapi().moves_sampled(), 4);
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "[stats]\ndb_path = \"elsewhere.db\"").expect("Write failed");
    let config = GameConfig::from_file(file.path()).expect("Load failed");
    assert_eq!(config.stats().db_path(), "elsewhere.db");
    assert_eq!(config.stats().key(), "player_stats_v3");
}

#[test]
fn test_missing_file_yields_defaults() {
    let config = GameConfig::load_or_default("/nonexistent/pokeguess.toml").expect("Defaults");
    assert_eq!(config.rules().hint_penalty, 150);
}

#[test]
fn test_malformed_toml_is_an_error() {
    let err = GameConfig::from_toml("[rules\nbase_score = ").expect_err("Should fail");
    assert!(err.message.contains("Failed to parse config"));
}
