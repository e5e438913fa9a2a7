//! Pokeguess library - creature guessing rounds driven by an async session engine
//!
//! A round binds one creature fetched from a public creature API and lets the
//! player identify it through one of seven clue modes. Narrative text comes
//! from an LLM when one is configured and from canned fallbacks otherwise.
//!
//! # Architecture
//!
//! - **Creature**: records, the catalog, and the PokeAPI provider
//! - **Narrative**: hints, briefings, statements, and questions, with fallbacks
//! - **Game**: the round state machine and the [`SessionEngine`] driving it
//! - **Stats**: the persisted player ledger and its badge unlocks
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pokeguess::{
//!     GameMode, MemoryStatsStore, PokeApiClient, PokeApiSettings, SessionEngine, StatsLedger,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = Arc::new(PokeApiClient::new(PokeApiSettings::default()));
//! let ledger = StatsLedger::load(Box::new(MemoryStatsStore::new()), "player_stats_v3");
//! let engine = SessionEngine::builder(provider, ledger).build();
//!
//! let round = engine.start(GameMode::Silhouette).await?;
//! println!("{}", round.briefing);
//! engine.submit_guess("Pikachu").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod creature;
mod game;
mod llm_client;
mod narrative;
mod stats;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig, LlmSettings, PokeApiSettings, StatsSettings};

// Crate-level exports - Creature data
pub use creature::{
    BaseStats, Catalog, CatalogEntry, Creature, CreatureError, CreatureId, CreatureProvider,
    MAX_SUGGESTIONS, PokeApiClient, display_name,
};

// Crate-level exports - Session engine
pub use game::{
    AnswerVerdict, Clue, EngineBuilder, EngineError, Feedback, GameMode, GuessVerdict, ModeState,
    Obscurity, Outcome, Phase, Reply, RoundResult, RoundRules, Session, SessionEngine, SessionId,
    SessionSnapshot, TickVerdict,
};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Narrative
pub use narrative::{
    Answer, Exchange, LlmNarrator, NarrativeError, NarrativeGenerator, Narrator, REDACTED,
    Statement, is_valid_true_false_set, redact, taunt,
};

// Crate-level exports - Player statistics
pub use stats::{
    MemoryStatsStore, PlayerStats, SqliteStatsStore, StatsBlob, StatsLedger, StatsStore, StoreError,
};
