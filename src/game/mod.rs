//! Round lifecycle, scoring, and the session engine.

mod engine;
mod mode;
mod rules;
mod session;
mod snapshot;

pub use engine::{EngineBuilder, EngineError, SessionEngine};
pub use mode::GameMode;
pub use rules::{Obscurity, RoundRules};
pub use session::{AnswerVerdict, GuessVerdict, ModeState, Session, SessionId, TickVerdict};
pub use snapshot::{Clue, Feedback, Outcome, Phase, Reply, RoundResult, SessionSnapshot};
