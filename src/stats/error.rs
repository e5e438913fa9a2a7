//! Stats storage error types.

use derive_more::{Display, Error};
use tracing::{instrument, warn};

/// Storage failure, tagged with the key or database path it concerns.
#[derive(Debug, Clone, Display, Error)]
#[display("Stats storage error on '{}': {} at {}:{}", subject, message, file, line)]
pub struct StoreError {
    /// Blob key, or database path for connection and migration failures.
    pub subject: String,
    /// What went wrong.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates an error about `subject` with caller location tracking.
    #[track_caller]
    #[instrument(skip(subject, message))]
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let err = Self {
            subject: subject.into(),
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        };
        warn!(subject = %err.subject, message = %err.message, "Stats storage failure");
        err
    }

    /// The database at `path` could not be opened.
    #[track_caller]
    pub fn connect(path: &str, err: diesel::ConnectionError) -> Self {
        Self::new(path, format!("Failed to connect: {}", err))
    }

    /// Pending migrations could not be applied to the database at `path`.
    #[track_caller]
    pub fn migrate(path: &str, err: impl std::fmt::Display) -> Self {
        Self::new(path, format!("Migrations failed: {}", err))
    }

    /// Reading or writing the blob under `key` failed.
    #[track_caller]
    pub fn query(key: &str, err: diesel::result::Error) -> Self {
        Self::new(key, format!("Query failed: {}", err))
    }
}
