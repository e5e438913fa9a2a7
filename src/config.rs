//! Game configuration loaded from TOML.

use crate::game::RoundRules;
use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Top-level configuration.
///
/// Every section is optional; a missing file yields [`GameConfig::default`].
#[derive(Debug, Clone, Default, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Narrative generation backend.
    llm: LlmSettings,
    /// Creature data API.
    pokeapi: PokeApiSettings,
    /// Scoring and budget constants.
    rules: RoundRules,
    /// Player statistics storage.
    stats: StatsSettings,
}

/// LLM settings for the narrative generator.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (openai or anthropic).
    #[serde(default = "default_provider")]
    provider: LlmProvider,

    /// Model name.
    #[serde(default = "default_model")]
    model: String,

    /// Maximum tokens per response.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
}

#[instrument]
fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

#[instrument]
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

#[instrument]
fn default_max_tokens() -> u32 {
    150
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmSettings {
    /// Creates LLM configuration from these settings.
    /// Requires OPENAI_API_KEY or ANTHROPIC_API_KEY environment variable.
    #[instrument(skip(self), fields(provider = ?self.provider, model = %self.model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");

        let var = match self.provider {
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        };
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;

        Ok(LlmConfig::new(
            self.provider,
            api_key,
            self.model.clone(),
            self.max_tokens,
        ))
    }
}

/// Creature REST API settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct PokeApiSettings {
    /// API root, without trailing slash.
    base_url: String,
    /// Number of catalog entries requested.
    catalog_limit: u32,
    /// How many moves are sampled from a creature's move pool.
    moves_sampled: usize,
}

impl Default for PokeApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
            catalog_limit: 1010,
            moves_sampled: 4,
        }
    }
}

impl PokeApiSettings {
    /// Settings pointing at a different API root.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Where player statistics are stored.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSettings {
    /// SQLite database path.
    db_path: String,
    /// Key the stats blob is stored under.
    key: String,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            db_path: "pokeguess.db".to_string(),
            key: "player_stats_v3".to_string(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(
            provider = ?config.llm.provider,
            speed_run_seconds = config.rules.speed_run_seconds,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("No config file, using defaults");
            Ok(Self::default())
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
