mod amount;
mod cli;
mod db;
mod detect;
mod error;
mod fmt;
mod format;
mod importer;
mod models;
mod normalizer;
mod reconcile;
mod registry;
mod settings;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{AccountsCommands, Cli, Commands, TransactionsCommands};
use db::TransactionFilter;
use registry::FormatRegistry;
use settings::load_settings;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&load_settings().log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let registry = FormatRegistry::builtin();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Load { path } => cli::load::run(&path),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                name,
                format,
                institution,
            } => cli::accounts::add(&registry, &name, &format, institution.as_deref()),
            AccountsCommands::List => cli::accounts::list(&registry),
        },
        Commands::Formats => cli::formats::run(&registry),
        Commands::Detect { filename } => cli::detect::run(&registry, &filename),
        Commands::Preview { file, format, json } => cli::preview::run(&registry, &file, &format, json),
        Commands::Import { path, account } => cli::import::run(&registry, &path, account.as_deref()),
        Commands::Transactions { command } => match command {
            TransactionsCommands::List {
                year,
                month,
                account,
                json,
            } => cli::transactions::list(TransactionFilter { year, month, account }, json),
            TransactionsCommands::Label {
                id,
                label,
                category,
                additional_labels,
            } => cli::transactions::label(
                &id,
                label.as_deref(),
                category.as_deref(),
                additional_labels.as_deref(),
            ),
        },
        Commands::Status => cli::status::run(&registry),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if e.is_data_error() {
            eprintln!("Check that the file is an unmodified export in the account's format (see `tally formats`).");
        }
        std::process::exit(1);
    }
}
