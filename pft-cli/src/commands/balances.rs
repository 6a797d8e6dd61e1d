//! Balances command - show the latest balance snapshot

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;
use pft_core::ports::LedgerStore;
use pft_core::BalanceRow;

use super::get_context;
use crate::output::{self, create_table, money_cell};

pub fn run(data_dir: Option<&Path>, json: bool) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let rows = ctx.store.latest_balances()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    print_balances(&rows);
    Ok(())
}

pub fn print_balances(rows: &[BalanceRow]) {
    if rows.is_empty() {
        output::warning("No balance data available. Please fetch data first.");
        return;
    }

    println!("{}", "Current Account Balances".bold());

    let mut table = create_table();
    table.set_header(vec!["Account", "Type", "Current", "Available", "Last Updated"]);

    for row in rows {
        let available = match row.balance_available {
            Some(amount) => money_cell(amount),
            None => Cell::new("-"),
        };
        table.add_row(vec![
            Cell::new(&row.account_name),
            Cell::new(&row.account_type),
            money_cell(row.balance_current),
            available,
            Cell::new(row.last_updated.format(pft_core::domain::balance::TIMESTAMP_FORMAT)),
        ]);
    }

    println!("{}", table);
}
