//! Player statistics and their persistence.

mod error;
mod ledger;
mod schema; // Diesel generated schema - internal use only
mod store;

pub use error::StoreError;
pub use ledger::{PlayerStats, StatsLedger};
pub use store::{MemoryStatsStore, SqliteStatsStore, StatsBlob, StatsStore};
