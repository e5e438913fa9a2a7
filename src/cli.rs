//! Command-line interface for pokeguess.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pokeguess::GameMode;

/// Pokeguess - identify the creature from partial clues
#[derive(Parser, Debug)]
#[command(name = "pokeguess")]
#[command(about = "Creature guessing game for the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file (optional)
    #[arg(short, long, global = true, default_value = "pokeguess.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one round
    Play {
        /// Game mode (silhouette, stat-radar, redacted-dex, move-master,
        /// two-truths, reverse-guess, speed-run)
        #[arg(short, long, default_value = "silhouette")]
        mode: GameMode,
    },

    /// Show player statistics and badges
    Stats,

    /// List the available game modes
    Modes,

    /// Browse the creature catalog
    Dex {
        /// Dex action
        #[command(subcommand)]
        action: DexAction,
    },
}

/// Catalog browsing actions
#[derive(Subcommand, Debug)]
pub enum DexAction {
    /// List creatures whose name contains the query
    Search {
        /// Name fragment
        query: String,
    },

    /// Show one creature's full record
    Show {
        /// Catalog number
        id: u32,
    },
}
