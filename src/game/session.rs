//! The round state machine.
//!
//! A [`Session`] holds every rule of a round and mutates only through its
//! transition methods. It performs no I/O: transitions that need a
//! collaborator return a verdict telling the engine what to fetch, and the
//! engine feeds the result back through a follow-up method.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use super::snapshot::{Clue, Feedback, Outcome, Phase, RoundResult, SessionSnapshot};
use super::{GameMode, Obscurity, RoundRules};
use crate::creature::Creature;
use crate::narrative::{Answer, Exchange, Statement};

/// Identity of one round. Issued in increasing order by the engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("session-{}", _0)]
pub struct SessionId(pub(crate) u64);

/// Mode-specific auxiliary state.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeState {
    /// Silhouette has no extra state.
    Silhouette,
    /// Stat radar has no extra state.
    StatRadar,
    /// Redacted flavor text.
    RedactedDex {
        /// Text with the name blanked.
        redacted: String,
    },
    /// Move master has no extra state.
    MoveMaster,
    /// Generated statement set.
    TwoTruths {
        /// Exactly three statements, one of them a lie.
        statements: Vec<Statement>,
    },
    /// Elimination dialogue.
    ReverseGuess {
        /// Answered questions.
        history: Vec<Exchange>,
        /// Question awaiting an answer.
        question: String,
    },
    /// Countdown chain.
    SpeedRun {
        /// Seconds remaining.
        time_left: u32,
        /// Creatures identified so far.
        identified: u32,
        /// The current target was already credited and awaits its successor.
        rebinding: bool,
    },
}

impl ModeState {
    /// Mode this state belongs to.
    pub fn mode(&self) -> GameMode {
        match self {
            Self::Silhouette => GameMode::Silhouette,
            Self::StatRadar => GameMode::StatRadar,
            Self::RedactedDex { .. } => GameMode::RedactedDex,
            Self::MoveMaster => GameMode::MoveMaster,
            Self::TwoTruths { .. } => GameMode::TwoTruths,
            Self::ReverseGuess { .. } => GameMode::ReverseGuess,
            Self::SpeedRun { .. } => GameMode::SpeedRun,
        }
    }
}

/// What a guess did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessVerdict {
    /// Not a guess-driven mode, or the round is over.
    Ignored,
    /// Wrong guess in a speed run; no penalty.
    Shrugged,
    /// Correct guess ended the round.
    Won,
    /// Correct guess in a speed run, already credited; bind the next
    /// creature with [`Session::advance_chain`].
    ChainHit,
    /// Wrong guess, counted.
    Miss {
        /// Failed guesses after this one.
        failed_guesses: u32,
        /// True once the counter had already reached the taunt threshold.
        taunt: bool,
    },
}

/// What an elimination answer did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerVerdict {
    /// Not an elimination round, or the round is over.
    Ignored,
    /// The player confirmed a question naming the target.
    Confirmed,
    /// Question budget exhausted.
    Exhausted,
    /// Ask the next question with [`Session::set_question`].
    NeedsQuestion,
}

/// What a clock tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickVerdict {
    /// Not a speed run, or the round is over.
    Ignored,
    /// Clock still running with this many seconds left.
    Running(u32),
    /// Clock reached zero; the round ended.
    Expired,
}

/// One round of play.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    target: Creature,
    rules: RoundRules,
    started_at: Instant,
    finished_at: Option<Instant>,
    briefing: String,
    hints_used: u8,
    failed_guesses: u32,
    latest_hint: Option<String>,
    feedback: Option<Feedback>,
    state: ModeState,
    result: Option<RoundResult>,
    lore: Option<String>,
}

impl Session {
    /// Binds a freshly started round.
    #[instrument(
        skip(target, briefing, state, rules),
        fields(mode = %state.mode(), target = %target.name())
    )]
    pub fn new(
        id: SessionId,
        target: Creature,
        briefing: String,
        state: ModeState,
        rules: RoundRules,
        now: Instant,
    ) -> Self {
        info!(%id, "Round started");
        Self {
            id,
            target,
            rules,
            started_at: now,
            finished_at: None,
            briefing,
            hints_used: 0,
            failed_guesses: 0,
            latest_hint: None,
            feedback: None,
            state,
            result: None,
            lore: None,
        }
    }

    /// Session identity.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Mode being played.
    pub fn mode(&self) -> GameMode {
        self.state.mode()
    }

    /// Creature currently bound.
    pub fn target(&self) -> &Creature {
        &self.target
    }

    /// Mode-specific state.
    pub fn state(&self) -> &ModeState {
        &self.state
    }

    /// Hints bought so far.
    pub fn hints_used(&self) -> u8 {
        self.hints_used
    }

    /// Wrong guesses so far.
    pub fn failed_guesses(&self) -> u32 {
        self.failed_guesses
    }

    /// Final result, once terminal.
    pub fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    /// Returns true while the round accepts moves.
    pub fn is_active(&self) -> bool {
        self.result.is_none()
    }

    /// Resolves the round. Has no effect if it already resolved.
    #[instrument(skip(self), fields(id = %self.id, mode = %self.mode()))]
    fn finish(&mut self, outcome: Outcome, now: Instant) {
        if self.result.is_some() {
            return;
        }
        let score = match (outcome, &self.state) {
            (Outcome::Forfeit, _) => 0,
            (Outcome::Success, ModeState::SpeedRun { identified, .. }) => {
                self.rules.timed_score(*identified)
            }
            (Outcome::Success, _) => {
                let elapsed = now.duration_since(self.started_at);
                self.rules.score(self.hints_used, elapsed)
            }
        };
        self.finished_at = Some(now);
        self.result = Some(RoundResult { outcome, score });
        info!(?outcome, score, target = %self.target.name(), "Round resolved");
    }

    /// Checks a typed guess against the bound creature.
    #[instrument(skip(self), fields(id = %self.id, mode = %self.mode()))]
    pub fn submit_guess(&mut self, guess: &str, now: Instant) -> GuessVerdict {
        if !self.is_active() || !self.mode().is_guess_driven() {
            debug!("Guess ignored");
            return GuessVerdict::Ignored;
        }
        let correct = self.target.is_named(guess);
        if let ModeState::SpeedRun {
            identified,
            rebinding,
            ..
        } = &mut self.state
        {
            if !correct {
                return GuessVerdict::Shrugged;
            }
            // A retry after a failed refetch names the same target again.
            if !*rebinding {
                *identified += 1;
                *rebinding = true;
            }
            info!(identified = *identified, "Chain hit");
            return GuessVerdict::ChainHit;
        }
        if correct {
            self.finish(Outcome::Success, now);
            return GuessVerdict::Won;
        }
        let taunt = self.failed_guesses >= self.rules.taunt_threshold;
        self.failed_guesses += 1;
        debug!(failed_guesses = self.failed_guesses, taunt, "Wrong guess");
        GuessVerdict::Miss {
            failed_guesses: self.failed_guesses,
            taunt,
        }
    }

    /// Binds the next speed run creature after a credited hit.
    #[instrument(skip(self, next), fields(id = %self.id, next = %next.name()))]
    pub fn advance_chain(&mut self, next: Creature) -> bool {
        if !self.is_active() {
            return false;
        }
        match &mut self.state {
            ModeState::SpeedRun { rebinding, .. } => {
                *rebinding = false;
                self.target = next;
                self.feedback = None;
                debug!("Chain advanced");
                true
            }
            _ => false,
        }
    }

    /// Buys a hint. Returns the new hint level, or `None` if not allowed.
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn request_hint(&mut self) -> Option<u8> {
        if !self.is_active()
            || !self.mode().allows_hints()
            || self.hints_used >= self.rules.clue_budget
        {
            debug!(hints_used = self.hints_used, "Hint refused");
            return None;
        }
        self.hints_used += 1;
        Some(self.hints_used)
    }

    /// Records generated hint text.
    pub fn set_hint(&mut self, text: String) {
        if self.is_active() {
            self.latest_hint = Some(text);
        }
    }

    /// Records the reaction to a wrong guess.
    pub fn set_feedback(&mut self, feedback: Feedback) {
        if self.is_active() {
            self.feedback = Some(feedback);
        }
    }

    /// Answers the pending elimination question.
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn submit_answer(&mut self, answer: Answer, now: Instant) -> AnswerVerdict {
        if !self.is_active() {
            return AnswerVerdict::Ignored;
        }
        let ModeState::ReverseGuess { history, question } = &mut self.state else {
            return AnswerVerdict::Ignored;
        };
        let confirmed = answer == Answer::Yes && self.target.is_mentioned_in(question);
        history.push(Exchange {
            question: question.clone(),
            answer,
        });
        let asked = history.len();
        if confirmed {
            self.finish(Outcome::Success, now);
            AnswerVerdict::Confirmed
        } else if asked >= self.rules.question_budget {
            self.finish(Outcome::Forfeit, now);
            AnswerVerdict::Exhausted
        } else {
            AnswerVerdict::NeedsQuestion
        }
    }

    /// Elimination history, if this is an elimination round.
    pub fn history(&self) -> Option<&[Exchange]> {
        match &self.state {
            ModeState::ReverseGuess { history, .. } => Some(history),
            _ => None,
        }
    }

    /// Sets the next elimination question.
    pub fn set_question(&mut self, next: String) {
        if !self.is_active() {
            return;
        }
        if let ModeState::ReverseGuess { question, .. } = &mut self.state {
            *question = next;
        }
    }

    /// Picks a statement as the lie. Returns the outcome, or `None` if ignored.
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn answer_true_false(&mut self, index: usize, now: Instant) -> Option<Outcome> {
        if !self.is_active() {
            return None;
        }
        let ModeState::TwoTruths { statements } = &self.state else {
            return None;
        };
        let outcome = if statements.get(index)?.is_lie {
            Outcome::Success
        } else {
            Outcome::Forfeit
        };
        self.finish(outcome, now);
        Some(outcome)
    }

    /// Advances the speed run clock by one second.
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn tick(&mut self, now: Instant) -> TickVerdict {
        if !self.is_active() {
            return TickVerdict::Ignored;
        }
        let ModeState::SpeedRun { time_left, .. } = &mut self.state else {
            return TickVerdict::Ignored;
        };
        *time_left = time_left.saturating_sub(1);
        if *time_left == 0 {
            self.finish(Outcome::Success, now);
            TickVerdict::Expired
        } else {
            TickVerdict::Running(*time_left)
        }
    }

    /// Gives up. In a speed run this banks the chain instead.
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn surrender(&mut self, now: Instant) -> Option<Outcome> {
        if !self.is_active() {
            return None;
        }
        let outcome = if self.mode().is_timed() {
            Outcome::Success
        } else {
            Outcome::Forfeit
        };
        self.finish(outcome, now);
        Some(outcome)
    }

    /// Attaches post-match trivia to a resolved round.
    pub fn set_lore(&mut self, lore: String) {
        if !self.is_active() {
            self.lore = Some(lore);
        }
    }

    /// Projects the round into a presentation view.
    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        let terminal = !self.is_active();
        let until = self.finished_at.unwrap_or(now);
        let obscurity = if terminal {
            Obscurity::CLEAR
        } else {
            Obscurity::for_hints(self.hints_used)
        };

        let clue = match &self.state {
            ModeState::Silhouette | ModeState::SpeedRun { .. } => Clue::Silhouette {
                sprite: self.target.sprite().clone(),
                obscurity,
            },
            ModeState::StatRadar => Clue::StatChart {
                stats: *self.target.stats(),
            },
            ModeState::RedactedDex { redacted } => Clue::Redacted {
                text: if terminal {
                    self.target.flavor_text().clone()
                } else {
                    redacted.clone()
                },
            },
            ModeState::MoveMaster => Clue::Moves {
                moves: self.target.moves().clone(),
            },
            ModeState::TwoTruths { statements } => Clue::Statements {
                statements: statements.iter().map(|s| s.statement.clone()).collect(),
                lie: terminal
                    .then(|| statements.iter().position(|s| s.is_lie))
                    .flatten(),
            },
            ModeState::ReverseGuess { history, question } => Clue::Dialogue {
                target_name: self.target.name().clone(),
                sprite: self.target.sprite().clone(),
                question: question.clone(),
                history: history.clone(),
            },
        };

        let (time_left, identified) = match &self.state {
            ModeState::SpeedRun {
                time_left,
                identified,
                ..
            } => (Some(*time_left), Some(*identified)),
            _ => (None, None),
        };

        SessionSnapshot {
            id: self.id,
            mode: self.mode(),
            phase: if terminal { Phase::Terminal } else { Phase::Active },
            briefing: self.briefing.clone(),
            hints_used: self.hints_used,
            clue_budget: self.rules.clue_budget,
            failed_guesses: self.failed_guesses,
            latest_hint: self.latest_hint.clone(),
            feedback: self.feedback.clone(),
            clue,
            elapsed_secs: until.duration_since(self.started_at).as_secs(),
            time_left,
            identified,
            result: self.result.clone(),
            revealed: terminal.then(|| self.target.clone()),
            lore: self.lore.clone(),
        }
    }
}
