//! Pokeguess - terminal frontend
//!
//! Plays rounds against the session engine on stdin/stdout. Logs go to stderr.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, DexAction};
use pokeguess::{
    Answer, BaseStats, Catalog, Clue, CreatureId, CreatureProvider, Feedback, GameConfig,
    GameMode, LlmClient, LlmNarrator, MemoryStatsStore, Narrator, Outcome, PlayerStats,
    PokeApiClient, Reply, SessionEngine, SessionSnapshot, SqliteStatsStore, StatsLedger,
    StatsStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = GameConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Play { mode } => run_play(&config, mode).await,
        Command::Stats => run_stats(&config),
        Command::Modes => run_modes(),
        Command::Dex { action } => run_dex(&config, action).await,
    }
}

/// Opens the SQLite store, falling back to memory if it cannot be opened.
#[instrument(skip(config))]
fn open_ledger(config: &GameConfig) -> StatsLedger {
    let opened = SqliteStatsStore::open(config.stats().db_path().clone());
    let store: Box<dyn StatsStore> = match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "Stats database unavailable, stats will not persist");
            Box::new(MemoryStatsStore::new())
        }
    };
    StatsLedger::load(store, config.stats().key())
}

/// Uses the LLM when a key is available, canned text otherwise.
#[instrument(skip(config))]
fn build_narrator(config: &GameConfig) -> Narrator {
    match config.llm().create_llm_config() {
        Ok(llm_config) => {
            info!(model = %llm_config.model(), "Narrative generation online");
            Narrator::new(Arc::new(LlmNarrator::new(LlmClient::new(llm_config))))
        }
        Err(e) => {
            info!(reason = %e, "Narrative generation offline, using fallbacks");
            Narrator::offline()
        }
    }
}

/// Play one round interactively.
async fn run_play(config: &GameConfig, mode: GameMode) -> Result<()> {
    let provider = Arc::new(PokeApiClient::new(config.pokeapi().clone()));
    let engine = SessionEngine::builder(provider, open_ledger(config))
        .with_narrator(build_narrator(config))
        .with_rules(*config.rules())
        .build();

    println!("Loading {}...", mode.title());
    let round = engine.start(mode).await?;
    let catalog = engine.catalog().await?;
    println!("\n{}\n", round.briefing);
    render(&round);
    print_controls(mode);

    let mut updates = engine.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_second_shown = round.time_left;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                let reply = handle_line(&engine, &catalog, line.trim()).await?;
                match reply {
                    Some(Reply::Terminal(snapshot)) => {
                        render(&snapshot);
                        break;
                    }
                    Some(Reply::Active(snapshot)) => render(&snapshot),
                    Some(Reply::Ignored) => println!("(nothing happened)"),
                    None => {
                        if engine.snapshot().is_some_and(|s| s.is_terminal()) {
                            break;
                        }
                    }
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                let Some(snapshot) = current else { continue };
                if snapshot.is_terminal() {
                    render(&snapshot);
                    break;
                }
                if snapshot.time_left != last_second_shown {
                    last_second_shown = snapshot.time_left;
                    if let Some(left) = snapshot.time_left.filter(|t| t % 10 == 0 || *t <= 5) {
                        println!("  {}s left", left);
                    }
                }
            }
        }
    }

    print_stats(&engine.stats());
    Ok(())
}

/// Routes one input line. `None` means the line was handled locally.
async fn handle_line(
    engine: &SessionEngine,
    catalog: &Catalog,
    line: &str,
) -> Result<Option<Reply>> {
    if line.is_empty() {
        return Ok(None);
    }
    let lower = line.to_lowercase();
    let reply = match lower.as_str() {
        "quit" | "exit" => {
            let reply = engine.surrender().await;
            return Ok(Some(reply));
        }
        "hint" => engine.request_hint().await,
        "give up" | "surrender" => engine.surrender().await,
        _ => {
            if let Some(prefix) = line.strip_prefix('?') {
                let names: Vec<_> = catalog
                    .suggestions(prefix.trim())
                    .into_iter()
                    .map(|e| e.name().clone())
                    .collect();
                if names.is_empty() {
                    println!("  no matches");
                } else {
                    println!("  {}", names.join(", "));
                }
                return Ok(None);
            }
            if let Some(n) = lower.strip_prefix("pick ") {
                match n.trim().parse::<usize>() {
                    Ok(n) if n >= 1 => engine.answer_true_false(n - 1).await,
                    _ => {
                        println!("  usage: pick <1-3>");
                        return Ok(None);
                    }
                }
            } else if let Ok(answer) = lower.parse::<Answer>() {
                engine.submit_answer(answer).await
            } else {
                match engine.submit_guess(line).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!(error = %e, "Guess could not be processed");
                        println!("  Could not load the next creature, try again.");
                        return Ok(None);
                    }
                }
            }
        }
    };
    Ok(Some(reply))
}

fn print_controls(mode: GameMode) {
    let controls = match mode {
        GameMode::TwoTruths => "pick <n> to choose the lie",
        GameMode::ReverseGuess => "answer yes / no / unsure",
        GameMode::SpeedRun => "type names, ?<prefix> for suggestions, give up to bank the chain",
        _ => "type a name, ?<prefix> for suggestions, hint, give up",
    };
    println!("[{}; quit to leave]\n", controls);
}

fn render(snapshot: &SessionSnapshot) {
    match &snapshot.clue {
        Clue::Silhouette { sprite, obscurity } => {
            println!(
                "Silhouette: {} (blur {}px, brightness {}%, contrast {}%)",
                sprite, obscurity.blur, obscurity.brightness, obscurity.contrast
            );
        }
        Clue::StatChart { stats } => {
            for (axis, value) in stats.axes() {
                let bar = "#".repeat(usize::from(value) * 30 / usize::from(BaseStats::MAX));
                println!("  {:<16} {:>3} {}", axis, value, bar);
            }
            println!("  {:<16} {:>3}", "Total", stats.total());
        }
        Clue::Redacted { text } => println!("Dex entry: {}", text),
        Clue::Moves { moves } => println!("Known moves: {}", moves.join(", ")),
        Clue::Statements { statements, lie } => {
            for (i, statement) in statements.iter().enumerate() {
                let marker = if *lie == Some(i) { "  <- the lie" } else { "" };
                println!("  {}. {}{}", i + 1, statement, marker);
            }
        }
        Clue::Dialogue {
            target_name,
            question,
            history,
            ..
        } => {
            println!("You are thinking of {}. Question {}:", target_name, history.len() + 1);
            println!("  {}", question);
        }
    }

    if let Some(hint) = &snapshot.latest_hint {
        println!("Hint {}/{}: {}", snapshot.hints_used, snapshot.clue_budget, hint);
    }
    match &snapshot.feedback {
        Some(Feedback::Comparison(text)) => println!("Not quite. {}", text),
        Some(Feedback::Taunt(text)) => println!("{}", text),
        None => {}
    }
    if let (Some(left), Some(identified)) = (snapshot.time_left, snapshot.identified) {
        println!("{}s left, {} identified", left, identified);
    }

    if let Some(result) = &snapshot.result {
        let name = snapshot.revealed.as_ref().map_or("?", |c| c.name().as_str());
        match result.outcome {
            Outcome::Success => println!("\nSuccess! It was {}. Score: {}", name, result.score),
            Outcome::Forfeit => println!("\nRound lost. It was {}.", name),
        }
        if let Some(lore) = &snapshot.lore {
            println!("{}", lore);
        }
    }
}

fn print_stats(stats: &PlayerStats) {
    println!("\nGames completed: {}", stats.games_completed);
    println!("Total score:     {}", stats.total_score);
    println!("Streak:          {} (best {})", stats.current_streak, stats.highest_streak);
    for mode in GameMode::all() {
        let mark = if stats.has_badge(mode) { "x" } else { " " };
        println!("  [{}] {}", mark, mode.badge_name());
    }
}

fn run_stats(config: &GameConfig) -> Result<()> {
    print_stats(open_ledger(config).stats());
    Ok(())
}

fn run_modes() -> Result<()> {
    for mode in GameMode::all() {
        println!("{:<14} {}", mode.to_string(), mode.title());
    }
    Ok(())
}

/// Browse the catalog.
async fn run_dex(config: &GameConfig, action: DexAction) -> Result<()> {
    let client = PokeApiClient::new(config.pokeapi().clone());
    match action {
        DexAction::Search { query } => {
            let catalog = client.list_creatures().await?;
            for entry in catalog.search(&query) {
                println!("{} {}", entry.id(), entry.name());
            }
        }
        DexAction::Show { id } => {
            let creature = client.get_creature(CreatureId::from(id)).await?;
            println!("{} {}", creature.id(), creature.name());
            println!("Types:      {}", creature.types().join(" / "));
            println!("Generation: {}", creature.generation());
            println!(
                "Height:     {:.1} m   Weight: {:.1} kg",
                f64::from(*creature.height()) / 10.0,
                f64::from(*creature.weight()) / 10.0
            );
            println!("Moves:      {}", creature.moves().join(", "));
            println!("{}", creature.flavor_text());
            if let Some(chain_id) = creature.evolution_chain_id() {
                match client.evolution_line(*chain_id).await {
                    Ok(line) => println!("Evolution:  {}", line.join(" -> ")),
                    Err(e) => warn!(error = %e, "Evolution chain unavailable"),
                }
            }
        }
    }
    Ok(())
}
