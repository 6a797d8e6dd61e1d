//! pft CLI - pull bank data from Plaid into local TSV ledgers

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{balances, exchange, link, menu, sync, transactions};
use pft_core::DEFAULT_USER_ID;

/// pft - personal finance tracker
#[derive(Parser)]
#[command(name = "pft", version, about, long_about = None)]
struct Cli {
    /// Directory holding transactions.tsv, balances.tsv and settings.json
    #[arg(long, global = true, env = "PFT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu
    Menu,

    /// Create a Plaid Link token for connecting a new account
    Link {
        /// Client user id sent to Plaid
        #[arg(long, default_value = DEFAULT_USER_ID)]
        user_id: String,
    },

    /// Exchange a public token from Plaid Link for an access token
    Exchange {
        /// Public token returned by the Link flow
        public_token: String,
    },

    /// Fetch accounts and transactions and save them to the ledger
    Sync {
        /// Access token of the linked item
        #[arg(long)]
        access_token: String,
        /// First day of the window (YYYY-MM-DD, default: 30 days ago)
        #[arg(long, value_parser = parse_date)]
        start_date: Option<NaiveDate>,
        /// Last day of the window (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date)]
        end_date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the latest balance snapshot
    Balances {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored transactions
    Transactions {
        /// Show only the last N rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("invalid date '{}', use YYYY-MM-DD", s))
}

fn init_logging(verbose: bool) {
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir.as_deref();

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => menu::run(data_dir),
        Commands::Link { user_id } => link::run(data_dir, &user_id),
        Commands::Exchange { public_token } => exchange::run(data_dir, &public_token),
        Commands::Sync {
            access_token,
            start_date,
            end_date,
            json,
        } => sync::run(data_dir, &access_token, start_date, end_date, json),
        Commands::Balances { json } => balances::run(data_dir, json),
        Commands::Transactions { limit, json } => transactions::run(data_dir, limit, json),
    }
}
