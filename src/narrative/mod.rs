//! Generated game text: hints, briefings, statements, questions.

mod fallback;
mod generator;
mod llm;
mod narrator;

pub use fallback::{REDACTED, is_valid_true_false_set, redact, taunt};
pub use generator::{Answer, Exchange, NarrativeError, NarrativeGenerator, Statement};
pub use llm::LlmNarrator;
pub use narrator::Narrator;
