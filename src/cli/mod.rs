pub mod add;
pub mod chat;
pub mod demo;
pub mod init;
pub mod stats;
pub mod status;

use clap::{Parser, Subcommand};

use crate::db::Ledger;
use crate::error::Result;
use crate::flow::ChartRenderer;
use crate::settings;

/// Open (and idempotently initialize) the ledger under the configured data
/// directory. Every subcommand goes through here, matching the
/// create-table-on-start behavior of the store contract.
pub(crate) fn open_ledger() -> Result<Ledger> {
    let data_dir = settings::get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let ledger = Ledger::new(data_dir.join("tally.db"));
    ledger.initialize()?;
    Ok(ledger)
}

pub(crate) fn default_renderer() -> Option<Box<dyn ChartRenderer>> {
    #[cfg(feature = "chart")]
    {
        Some(Box::new(crate::chart::PdfChart))
    }
    #[cfg(not(feature = "chart"))]
    {
        None
    }
}

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Single-user income/expense tracker with a chat-style interface."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize the ledger.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Allow-listed chat identity
        #[arg(long = "user-id")]
        user_id: Option<i64>,
    },
    /// Interactive chat session.
    Chat,
    /// Record one entry directly.
    Add {
        /// Entry kind: income or expense
        category: String,
        /// Whole non-negative amount
        amount: i64,
        /// Optional free-text comment
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Period statistics: totals, counts, balance.
    Stats {
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: String,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: String,
        /// Also write the daily bar chart when the period length allows
        #[arg(long)]
        chart: bool,
    },
    /// Show the current database and entry counts.
    Status,
    /// Load deterministic sample entries to explore tally.
    Demo,
}
