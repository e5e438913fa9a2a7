//! Creature data collaborator interface.

use async_trait::async_trait;
use derive_more::{Display, Error};
use tracing::{error, instrument};

use super::{Catalog, Creature, CreatureId};

/// Source of creature records.
///
/// Implementations are pure lookups from the game's point of view; any
/// caching is their own business.
#[async_trait]
pub trait CreatureProvider: Send + Sync {
    /// Returns the full id/name catalog.
    async fn list_creatures(&self) -> Result<Catalog, CreatureError>;

    /// Fetches one creature by id.
    async fn get_creature(&self, id: CreatureId) -> Result<Creature, CreatureError>;
}

/// Creature data fetch error.
#[derive(Debug, Clone, Display, Error)]
#[display("Creature data error: {} at {}:{}", message, file, line)]
pub struct CreatureError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CreatureError {
    /// Creates a new creature data error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Creature data error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for CreatureError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("HTTP error: {}", err))
    }
}
