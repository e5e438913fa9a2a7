//! Async driver around the round state machine.
//!
//! The engine owns at most one [`Session`]. Collaborator calls happen with
//! the state lock released; every response is tagged with the [`SessionId`]
//! it was requested for and dropped if that session is no longer current.
//! While a call is outstanding for the current session the engine is busy
//! and ignores further guesses, hints, and answers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use derive_setters::Setters;
use rand::thread_rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, instrument, warn};

use super::session::{AnswerVerdict, GuessVerdict, ModeState, Session, SessionId, TickVerdict};
use super::snapshot::{Feedback, Outcome, Phase, Reply, SessionSnapshot};
use super::{GameMode, RoundRules};
use crate::creature::{Catalog, Creature, CreatureError, CreatureProvider};
use crate::narrative::{Answer, Narrator, taunt};
use crate::stats::{PlayerStats, StatsLedger};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Failure to start or continue a round.
#[derive(Debug, Clone, derive_more::Display)]
pub enum EngineError {
    /// Creature data could not be fetched.
    #[display("Creature data unavailable: {}", _0)]
    Fetch(CreatureError),

    /// The catalog has no entries to pick from.
    #[display("Creature catalog is empty")]
    EmptyCatalog,

    /// A newer start replaced this one while it was loading.
    #[display("Round start superseded by a newer start")]
    Superseded,
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::EmptyCatalog | Self::Superseded => None,
        }
    }
}

impl From<CreatureError> for EngineError {
    #[track_caller]
    fn from(err: CreatureError) -> Self {
        Self::Fetch(err)
    }
}

#[derive(Debug, Default)]
struct EngineState {
    session: Option<Session>,
    last_issued: u64,
    busy: Option<SessionId>,
    countdown: Option<JoinHandle<()>>,
}

impl EngineState {
    /// The current session, if it has the given id and is still active.
    fn active(&mut self, id: SessionId) -> Option<&mut Session> {
        self.session
            .as_mut()
            .filter(|s| s.id() == id && s.is_active())
    }

    fn is_busy(&self) -> bool {
        matches!((&self.session, self.busy), (Some(s), Some(b)) if s.id() == b)
    }

    fn release(&mut self, id: SessionId) {
        if self.busy == Some(id) {
            self.busy = None;
        }
    }

    fn stop_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}

struct EngineInner {
    provider: Arc<dyn CreatureProvider>,
    narrator: Narrator,
    rules: RoundRules,
    auto_countdown: bool,
    ledger: Mutex<StatsLedger>,
    state: Mutex<EngineState>,
    updates: watch::Sender<Option<SessionSnapshot>>,
}

/// Configures a [`SessionEngine`].
#[derive(Setters)]
#[setters(prefix = "with_")]
pub struct EngineBuilder {
    #[setters(skip)]
    provider: Arc<dyn CreatureProvider>,
    #[setters(skip)]
    ledger: StatsLedger,
    /// Narrative source; offline fallbacks by default.
    narrator: Narrator,
    /// Scoring and budget constants.
    rules: RoundRules,
    /// Whether speed runs drive their own one-second clock.
    auto_countdown: bool,
}

impl EngineBuilder {
    /// Builds the engine.
    #[instrument(skip(self))]
    pub fn build(self) -> SessionEngine {
        info!(
            narrator_online = self.narrator.is_online(),
            auto_countdown = self.auto_countdown,
            "Creating session engine"
        );
        let (updates, _) = watch::channel(None);
        SessionEngine {
            inner: Arc::new(EngineInner {
                provider: self.provider,
                narrator: self.narrator,
                rules: self.rules,
                auto_countdown: self.auto_countdown,
                ledger: Mutex::new(self.ledger),
                state: Mutex::new(EngineState::default()),
                updates,
            }),
        }
    }
}

/// Owns the active round and routes player actions to it.
///
/// Cloning yields another handle to the same engine.
#[derive(Clone)]
pub struct SessionEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("narrator", &self.inner.narrator)
            .field("rules", &self.inner.rules)
            .finish()
    }
}

impl SessionEngine {
    /// Starts configuring an engine.
    pub fn builder(provider: Arc<dyn CreatureProvider>, ledger: StatsLedger) -> EngineBuilder {
        EngineBuilder {
            provider,
            ledger,
            narrator: Narrator::offline(),
            rules: RoundRules::default(),
            auto_countdown: true,
        }
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ledger(&self) -> MutexGuard<'_, StatsLedger> {
        self.inner.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: &SessionSnapshot) {
        self.inner.updates.send_replace(Some(snapshot.clone()));
    }

    /// Snapshots the session, publishes it, and wraps it in a reply.
    fn reply(&self, session: &Session) -> Reply {
        let snapshot = session.snapshot(Instant::now());
        self.publish(&snapshot);
        Reply::from_snapshot(snapshot)
    }

    /// Follow-up for every transition into Terminal.
    fn conclude(&self, st: &mut EngineState) {
        st.stop_countdown();
        let Some(session) = st.session.as_ref() else {
            return;
        };
        if let Some(result) = session.result() {
            self.ledger()
                .record_outcome(session.mode(), result.outcome, result.score);
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        match &self.state().session {
            None => Phase::Idle,
            Some(s) if s.is_active() => Phase::Active,
            Some(_) => Phase::Terminal,
        }
    }

    /// View of the current round, if any.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.state().session.as_ref().map(|s| s.snapshot(Instant::now()))
    }

    /// Returns true while a collaborator call for the current round is outstanding.
    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    /// Receives every snapshot the engine publishes, including timer updates.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionSnapshot>> {
        self.inner.updates.subscribe()
    }

    /// Current player statistics.
    pub fn stats(&self) -> PlayerStats {
        self.ledger().stats().clone()
    }

    /// The creature catalog, for guess suggestions.
    pub async fn catalog(&self) -> Result<Catalog, EngineError> {
        Ok(self.inner.provider.list_creatures().await?)
    }

    async fn random_creature(&self) -> Result<Creature, EngineError> {
        let catalog = self.inner.provider.list_creatures().await?;
        let id = catalog
            .random_id(&mut thread_rng())
            .ok_or(EngineError::EmptyCatalog)?;
        Ok(self.inner.provider.get_creature(id).await?)
    }

    async fn prepare_state(&self, mode: GameMode, target: &Creature) -> ModeState {
        let narrator = &self.inner.narrator;
        match mode {
            GameMode::Silhouette => ModeState::Silhouette,
            GameMode::StatRadar => ModeState::StatRadar,
            GameMode::MoveMaster => ModeState::MoveMaster,
            GameMode::RedactedDex => ModeState::RedactedDex {
                redacted: narrator.redaction(target.flavor_text(), target.name()).await,
            },
            GameMode::TwoTruths => ModeState::TwoTruths {
                statements: narrator.true_false_set(target).await,
            },
            GameMode::ReverseGuess => ModeState::ReverseGuess {
                history: Vec::new(),
                question: narrator.next_question(&[], target.name()).await,
            },
            GameMode::SpeedRun => ModeState::SpeedRun {
                time_left: self.inner.rules.speed_run_seconds,
                identified: 0,
                rebinding: false,
            },
        }
    }

    /// Starts a round, replacing whatever round existed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if creature data cannot be fetched, in which
    /// case the previous state is left untouched.
    #[instrument(skip(self))]
    pub async fn start(&self, mode: GameMode) -> Result<SessionSnapshot, EngineError> {
        let id = {
            let mut st = self.state();
            st.last_issued += 1;
            SessionId(st.last_issued)
        };
        info!(%id, "Starting round");

        let target = self.random_creature().await?;
        let briefing = self.inner.narrator.briefing(mode).await;
        let state = self.prepare_state(mode, &target).await;

        let mut guard = self.state();
        let st = &mut *guard;
        if st.last_issued != id.0 {
            warn!(%id, "Start superseded");
            return Err(EngineError::Superseded);
        }
        st.stop_countdown();
        st.busy = None;
        let session = Session::new(id, target, briefing, state, self.inner.rules, Instant::now());
        let snapshot = session.snapshot(Instant::now());
        st.session = Some(session);
        if mode.is_timed() && self.inner.auto_countdown {
            st.countdown = Some(self.spawn_countdown(id));
        }
        self.publish(&snapshot);
        Ok(snapshot)
    }

    fn spawn_countdown(&self, id: SessionId) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                match engine.tick_session(id).await {
                    Reply::Active(_) => continue,
                    Reply::Terminal(_) | Reply::Ignored => break,
                }
            }
            debug!(%id, "Countdown finished");
        })
    }

    /// Submits a typed guess.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] only when a correct speed run guess cannot
    /// fetch the next creature. The hit stays credited and the target stays
    /// bound, so guessing it again retries the fetch.
    #[instrument(skip(self))]
    pub async fn submit_guess(&self, guess: &str) -> Result<Reply, EngineError> {
        let (id, verdict, target_name) = {
            let mut guard = self.state();
            let st = &mut *guard;
            if st.is_busy() {
                debug!("Busy, guess ignored");
                return Ok(Reply::Ignored);
            }
            let Some(session) = st.session.as_mut() else {
                return Ok(Reply::Ignored);
            };
            let verdict = session.submit_guess(guess, Instant::now());
            let id = session.id();
            let target_name = session.target().name().clone();
            match &verdict {
                GuessVerdict::Ignored | GuessVerdict::Shrugged => return Ok(Reply::Ignored),
                GuessVerdict::Won => {
                    self.conclude(st);
                }
                GuessVerdict::Miss { taunt: true, .. } => {
                    if let Some(session) = st.session.as_mut() {
                        session.set_feedback(Feedback::Taunt(taunt(guess)));
                        return Ok(self.reply(session));
                    }
                }
                GuessVerdict::ChainHit | GuessVerdict::Miss { taunt: false, .. } => {
                    st.busy = Some(id);
                }
            }
            (id, verdict, target_name)
        };

        match verdict {
            GuessVerdict::Won => Ok(self.finish_with_lore(id, &target_name).await),
            GuessVerdict::ChainHit => {
                let next = self.random_creature().await;
                let mut guard = self.state();
                guard.release(id);
                let next = next?;
                match guard.active(id) {
                    Some(session) => {
                        session.advance_chain(next);
                        Ok(self.reply(session))
                    }
                    None => {
                        debug!(%id, "Dropping stale chain creature");
                        Ok(Reply::Ignored)
                    }
                }
            }
            GuessVerdict::Miss { .. } => {
                let text = self.inner.narrator.comparison_hint(&target_name, guess).await;
                let mut guard = self.state();
                guard.release(id);
                match guard.active(id) {
                    Some(session) => {
                        session.set_feedback(Feedback::Comparison(text));
                        Ok(self.reply(session))
                    }
                    None => {
                        debug!(%id, "Dropping stale comparison hint");
                        Ok(Reply::Ignored)
                    }
                }
            }
            GuessVerdict::Ignored | GuessVerdict::Shrugged => Ok(Reply::Ignored),
        }
    }

    /// Fetches lore for a just-won round and returns the final reply.
    async fn finish_with_lore(&self, id: SessionId, target_name: &str) -> Reply {
        {
            let mut st = self.state();
            if let Some(session) = st.session.as_ref().filter(|s| s.id() == id) {
                let snapshot = session.snapshot(Instant::now());
                self.publish(&snapshot);
            }
            st.busy = Some(id);
        }
        let lore = self.inner.narrator.post_match_lore(target_name).await;
        let mut guard = self.state();
        guard.release(id);
        match guard.session.as_mut().filter(|s| s.id() == id) {
            Some(session) => {
                if let Some(lore) = lore {
                    session.set_lore(lore);
                }
                self.reply(session)
            }
            None => {
                debug!(%id, "Round replaced before lore arrived");
                Reply::Ignored
            }
        }
    }

    /// Buys one hint.
    #[instrument(skip(self))]
    pub async fn request_hint(&self) -> Reply {
        let (id, level, name) = {
            let mut guard = self.state();
            let st = &mut *guard;
            if st.is_busy() {
                debug!("Busy, hint ignored");
                return Reply::Ignored;
            }
            let Some(session) = st.session.as_mut() else {
                return Reply::Ignored;
            };
            let Some(level) = session.request_hint() else {
                return Reply::Ignored;
            };
            let id = session.id();
            let name = session.target().name().clone();
            self.publish(&session.snapshot(Instant::now()));
            st.busy = Some(id);
            (id, level, name)
        };

        let text = self.inner.narrator.hint(&name, level).await;
        let mut guard = self.state();
        guard.release(id);
        match guard.active(id) {
            Some(session) => {
                session.set_hint(text);
                self.reply(session)
            }
            None => {
                debug!(%id, "Dropping stale hint");
                Reply::Ignored
            }
        }
    }

    /// Answers the pending elimination question.
    #[instrument(skip(self))]
    pub async fn submit_answer(&self, answer: Answer) -> Reply {
        let (id, history, name) = {
            let mut guard = self.state();
            let st = &mut *guard;
            if st.is_busy() {
                debug!("Busy, answer ignored");
                return Reply::Ignored;
            }
            let Some(session) = st.session.as_mut() else {
                return Reply::Ignored;
            };
            let id = session.id();
            let name = session.target().name().clone();
            match session.submit_answer(answer, Instant::now()) {
                AnswerVerdict::Ignored => return Reply::Ignored,
                AnswerVerdict::Exhausted => {
                    self.conclude(st);
                    return st
                        .session
                        .as_ref()
                        .map_or(Reply::Ignored, |s| self.reply(s));
                }
                AnswerVerdict::Confirmed => {
                    self.conclude(st);
                    (id, None, name)
                }
                AnswerVerdict::NeedsQuestion => {
                    let history = session.history().map(<[_]>::to_vec).unwrap_or_default();
                    self.publish(&session.snapshot(Instant::now()));
                    st.busy = Some(id);
                    (id, Some(history), name)
                }
            }
        };

        let Some(history) = history else {
            return self.finish_with_lore(id, &name).await;
        };
        let question = self.inner.narrator.next_question(&history, &name).await;
        let mut guard = self.state();
        guard.release(id);
        match guard.active(id) {
            Some(session) => {
                session.set_question(question);
                self.reply(session)
            }
            None => {
                debug!(%id, "Dropping stale question");
                Reply::Ignored
            }
        }
    }

    /// Picks statement `index` as the lie. One shot; no retries.
    #[instrument(skip(self))]
    pub async fn answer_true_false(&self, index: usize) -> Reply {
        let (id, outcome, name) = {
            let mut guard = self.state();
            let st = &mut *guard;
            if st.is_busy() {
                return Reply::Ignored;
            }
            let Some(session) = st.session.as_mut() else {
                return Reply::Ignored;
            };
            let Some(outcome) = session.answer_true_false(index, Instant::now()) else {
                return Reply::Ignored;
            };
            let id = session.id();
            let name = session.target().name().clone();
            self.conclude(st);
            if !outcome.is_success() {
                return st
                    .session
                    .as_ref()
                    .map_or(Reply::Ignored, |s| self.reply(s));
            }
            (id, outcome, name)
        };
        debug!(?outcome, "Lie found");
        self.finish_with_lore(id, &name).await
    }

    /// Advances the speed run clock by one second.
    #[instrument(skip(self))]
    pub async fn tick(&self) -> Reply {
        let id = match self.state().session.as_ref() {
            Some(s) => s.id(),
            None => return Reply::Ignored,
        };
        self.tick_session(id).await
    }

    async fn tick_session(&self, id: SessionId) -> Reply {
        let name = {
            let mut guard = self.state();
            let st = &mut *guard;
            let Some(session) = st.active(id) else {
                return Reply::Ignored;
            };
            match session.tick(Instant::now()) {
                TickVerdict::Ignored => return Reply::Ignored,
                TickVerdict::Running(_) => return self.reply(session),
                TickVerdict::Expired => {
                    let name = session.target().name().clone();
                    // The caller may be the countdown task itself; detach it instead of aborting.
                    st.countdown.take();
                    self.conclude(st);
                    name
                }
            }
        };
        info!(%id, "Speed run clock expired");
        self.finish_with_lore(id, &name).await
    }

    /// Gives up (or banks the chain in a speed run).
    #[instrument(skip(self))]
    pub async fn surrender(&self) -> Reply {
        let (id, outcome, name) = {
            let mut guard = self.state();
            let st = &mut *guard;
            let Some(session) = st.session.as_mut() else {
                return Reply::Ignored;
            };
            let Some(outcome) = session.surrender(Instant::now()) else {
                return Reply::Ignored;
            };
            let id = session.id();
            let name = session.target().name().clone();
            self.conclude(st);
            if outcome == Outcome::Forfeit {
                return st
                    .session
                    .as_ref()
                    .map_or(Reply::Ignored, |s| self.reply(s));
            }
            (id, outcome, name)
        };
        debug!(?outcome, "Chain banked");
        self.finish_with_lore(id, &name).await
    }

    /// Returns a terminal engine to idle.
    #[instrument(skip(self))]
    pub fn reset(&self) -> bool {
        let mut st = self.state();
        match &st.session {
            Some(s) if !s.is_active() => {
                info!(id = %s.id(), "Round cleared");
                st.stop_countdown();
                st.session = None;
                st.busy = None;
                self.inner.updates.send_replace(None);
                true
            }
            _ => false,
        }
    }
}
