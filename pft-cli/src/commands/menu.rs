//! Interactive menu - the default when no subcommand is given

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;
use pft_core::ports::LedgerStore;
use pft_core::{PftContext, DEFAULT_USER_ID};

use super::{balances, get_context, link, sync};
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Link,
    Fetch,
    Balances,
    Exit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Link),
            "2" => Some(Self::Fetch),
            "3" => Some(Self::Balances),
            "4" => Some(Self::Exit),
            _ => None,
        }
    }
}

pub fn run(data_dir: Option<&Path>) -> Result<()> {
    let ctx = get_context(data_dir)?;

    println!("{}", "Personal Finance Tracker".bold());
    println!("{}", "=".repeat(30));

    loop {
        println!();
        println!("Options:");
        println!("1. Connect new account (get link token)");
        println!("2. Fetch transactions and balances");
        println!("3. View current balances");
        println!("4. Exit");

        let input: String = Input::new()
            .with_prompt("Enter your choice (1-4)")
            .allow_empty(true)
            .interact_text()?;

        let Some(choice) = Choice::parse(&input) else {
            output::warning("Invalid choice. Please try again.");
            continue;
        };

        if choice == Choice::Exit {
            println!("Goodbye!");
            return Ok(());
        }

        // Errors are shown and the loop keeps going
        if let Err(e) = handle(&ctx, choice) {
            output::error(&format!("Error: {:#}", e));
        }
    }
}

fn handle(ctx: &PftContext, choice: Choice) -> Result<()> {
    match choice {
        Choice::Link => {
            let token = link::create(ctx, DEFAULT_USER_ID)?;
            println!();
            link::print_token(&token);
        }
        Choice::Fetch => {
            let access_token: String = Input::new()
                .with_prompt("Enter your access token")
                .interact_text()?;
            let result = sync::perform(ctx, access_token.trim(), None, None, true)?;
            println!();
            sync::print_result(&result);
        }
        Choice::Balances => {
            let rows = ctx.store.latest_balances()?;
            println!();
            balances::print_balances(&rows);
        }
        Choice::Exit => {}
    }
    Ok(())
}
