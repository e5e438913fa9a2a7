//! Scripted collaborators shared by the engine tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use pokeguess::{
    BaseStats, Catalog, Creature, CreatureError, CreatureId, CreatureProvider, Exchange, GameMode,
    MemoryStatsStore, NarrativeError, NarrativeGenerator, Narrator, SessionEngine, Statement,
    StatsLedger,
};

/// A fully populated creature record.
pub fn creature(id: u32, name: &str) -> Creature {
    Creature::new(CreatureId::from(id), name)
        .with_types(vec!["electric".to_string()])
        .with_height(4)
        .with_weight(60)
        .with_sprite(format!("https://sprites.example/{}.png", id))
        .with_stats(BaseStats {
            hp: 35,
            attack: 55,
            defense: 40,
            special_attack: 50,
            special_defense: 50,
            speed: 90,
        })
        .with_flavor_text(format!(
            "When several of these {} gather, their electricity can build.",
            name
        ))
        .with_moves(vec!["thunder shock".to_string(), "quick attack".to_string()])
}

/// Provider that hands out creatures in the scripted order.
///
/// The last creature repeats once the queue runs dry.
pub struct ScriptedProvider {
    queue: Mutex<VecDeque<Creature>>,
    last: Mutex<Option<Creature>>,
    failing: AtomicBool,
    fetches: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedProvider {
    pub fn new(names: &[&str]) -> Self {
        let queue = names
            .iter()
            .enumerate()
            .map(|(i, name)| creature(i as u32 + 1, name))
            .collect();
        Self {
            queue: Mutex::new(queue),
            last: Mutex::new(None),
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    /// Makes every following fetch fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes every following creature fetch wait for a permit.
    pub fn gate_fetches(&self, gate: Arc<Notify>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    /// Creature fetches attempted so far.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CreatureProvider for ScriptedProvider {
    async fn list_creatures(&self) -> Result<Catalog, CreatureError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CreatureError::new("catalog offline"));
        }
        Ok(Catalog::from_names(["Bulbasaur", "Charmander", "Squirtle", "Pikachu", "Eevee"]))
    }

    async fn get_creature(&self, _id: CreatureId) -> Result<Creature, CreatureError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CreatureError::new("creature offline"));
        }
        let mut last = self.last.lock().unwrap();
        let next = self.queue.lock().unwrap().pop_front().or_else(|| last.clone());
        let next = next.ok_or_else(|| CreatureError::new("script exhausted"))?;
        *last = Some(next.clone());
        Ok(next)
    }
}

/// Generator with canned answers and an optional gate on hints.
#[derive(Default)]
pub struct ScriptedNarrator {
    /// Questions asked in order; afterwards "Does it fly?".
    pub questions: Mutex<VecDeque<String>>,
    /// When set, hint and comparison calls wait for a permit.
    pub gate: Option<Arc<Notify>>,
    /// Lore returned after a win.
    pub lore: Option<String>,
    /// Statement set returned for true/false rounds.
    pub statements: Option<Vec<Statement>>,
}

impl ScriptedNarrator {
    pub fn with_questions(questions: &[&str]) -> Self {
        Self {
            questions: Mutex::new(questions.iter().map(|q| q.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl NarrativeGenerator for ScriptedNarrator {
    async fn hint(&self, creature_name: &str, level: u8) -> Result<String, NarrativeError> {
        self.wait().await;
        Ok(format!("Hint {} about the creature ({} letters)", level, creature_name.len()))
    }

    async fn briefing(&self, mode: GameMode) -> Result<String, NarrativeError> {
        Ok(format!("Briefing for {}", mode))
    }

    async fn redaction(
        &self,
        _flavor_text: &str,
        _creature_name: &str,
    ) -> Result<String, NarrativeError> {
        Err(NarrativeError::new("redaction unavailable"))
    }

    async fn true_false_set(&self, _creature: &Creature) -> Result<Vec<Statement>, NarrativeError> {
        self.statements
            .clone()
            .ok_or_else(|| NarrativeError::new("no statements scripted"))
    }

    async fn next_question(
        &self,
        _history: &[Exchange],
        _target_name: &str,
    ) -> Result<String, NarrativeError> {
        let next = self.questions.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| "Does it fly?".to_string()))
    }

    async fn comparison_hint(
        &self,
        target_name: &str,
        guessed_name: &str,
    ) -> Result<String, NarrativeError> {
        self.wait().await;
        Ok(format!("{} is heavier than {}", guessed_name, target_name))
    }

    async fn post_match_lore(&self, creature_name: &str) -> Result<String, NarrativeError> {
        Ok(self
            .lore
            .clone()
            .unwrap_or_else(|| format!("{} was first catalogued long ago.", creature_name)))
    }
}

/// Engine over the scripted provider, with no automatic countdown.
pub fn engine(provider: Arc<ScriptedProvider>, narrator: Narrator) -> SessionEngine {
    let ledger = StatsLedger::load(Box::new(MemoryStatsStore::new()), "player_stats_v3");
    SessionEngine::builder(provider, ledger)
        .with_narrator(narrator)
        .with_auto_countdown(false)
        .build()
}
