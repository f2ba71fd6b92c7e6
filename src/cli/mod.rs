pub mod accounts;
pub mod detect;
pub mod formats;
pub mod import;
pub mod init;
pub mod load;
pub mod preview;
pub mod status;
pub mod transactions;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{Result, TallyError};
use crate::settings::load_settings;

/// Open the configured database, refusing to create one outside `init`.
pub(crate) fn open_db() -> Result<Connection> {
    let db_path = load_settings().db_path();
    if !db_path.exists() {
        return Err(TallyError::Settings(format!(
            "No database found at {}\nRun `tally init` to create one.",
            db_path.display()
        )));
    }
    get_connection(&db_path)
}

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Normalize bank CSV statements and reconcile them into one transaction ledger."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Switch to an existing tally data directory.
    Load {
        /// Path to data directory containing tally.db
        path: String,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// List the supported statement formats.
    Formats,
    /// Suggest a format key from a statement filename.
    Detect {
        /// Filename as downloaded from the bank
        filename: String,
    },
    /// Normalize a statement and print the rows without storing them.
    Preview {
        /// Path to CSV file
        file: String,
        /// Format key (see `tally formats`)
        #[arg(long)]
        format: String,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a CSV file, or every CSV in a directory.
    Import {
        /// Path to a CSV file or a directory of CSV files
        path: String,
        /// Account to import into (required for a single file; overrides detection for a directory)
        #[arg(long)]
        account: Option<String>,
    },
    /// Query and classify stored transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account bound to a statement format.
    Add {
        /// Account name, e.g. 'Joint Savings'
        name: String,
        /// Format key, e.g. sofi-savings
        #[arg(long)]
        format: String,
        /// Institution name
        #[arg(long)]
        institution: Option<String>,
    },
    /// List all accounts.
    List,
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List stored transactions by date.
    List {
        #[arg(long)]
        year: Option<i32>,
        /// Month number, 1-12
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Only this account
        #[arg(long)]
        account: Option<String>,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the label, category or extra labels of one transaction. Pass "" to clear.
    Label {
        /// Transaction id
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "additional-labels")]
        additional_labels: Option<String>,
    },
}
