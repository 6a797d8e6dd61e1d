//! Sync command - fetch accounts and transactions into the ledger

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use indicatif::ProgressBar;
use pft_core::{PftContext, SyncResult};

use super::get_context;

pub fn run(
    data_dir: Option<&Path>,
    access_token: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let result = perform(&ctx, access_token, start, end, !json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_result(&result);
    Ok(())
}

/// Run a sync, showing a spinner on stderr while waiting on the provider
pub fn perform(
    ctx: &PftContext,
    access_token: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    show_progress: bool,
) -> Result<SyncResult> {
    let service = ctx.sync_service()?;

    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_message("Fetching accounts and transactions...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = service.sync(access_token, start, end);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    Ok(result?)
}

pub fn print_result(result: &SyncResult) {
    println!("{} {}", "Synced:".green(), result.provider);
    println!("  Found {} accounts", result.accounts_fetched);
    println!("  Found {} transactions", result.transactions_fetched);
    println!("  Transaction breakdown:");
    println!("    New: {}", result.transactions_added);
    println!("    Skipped: {} (already exists)", result.transactions_skipped);
    println!("  Balances saved: {}", result.balances_written);
}
