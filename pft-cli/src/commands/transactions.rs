//! Transactions command - list stored ledger rows

use std::path::Path;

use anyhow::Result;
use comfy_table::Cell;
use pft_core::ports::LedgerStore;

use super::get_context;
use crate::output::{self, create_table, money_cell};

pub fn run(data_dir: Option<&Path>, limit: Option<usize>, json: bool) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let rows = ctx.store.transactions()?;
    let total = rows.len();

    // Newest rows are at the end of the table
    let skip = limit.map_or(0, |n| total.saturating_sub(n));
    let shown = &rows[skip..];

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        output::warning("No transactions stored yet. Run 'pft sync' first.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Date", "Account", "Description", "Category", "Merchant", "Amount"]);

    for row in shown {
        table.add_row(vec![
            Cell::new(row.date),
            Cell::new(&row.account_name),
            Cell::new(&row.description),
            Cell::new(&row.category),
            Cell::new(&row.merchant_name),
            money_cell(row.amount),
        ]);
    }

    println!("{}", table);
    output::info(&format!("Showing {} of {} transactions", shown.len(), total));
    Ok(())
}
