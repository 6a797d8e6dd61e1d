//! Link command - start connecting a new account

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use pft_core::PftContext;

use super::get_context;

/// Where to run Plaid Link in sandbox mode
const QUICKSTART_URL: &str = "https://plaid.com/docs/quickstart/";

pub fn run(data_dir: Option<&Path>, user_id: &str) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let token = create(&ctx, user_id)?;
    print_token(&token);
    Ok(())
}

pub fn create(ctx: &PftContext, user_id: &str) -> Result<String> {
    Ok(ctx.link_service()?.create_link_token(user_id)?)
}

pub fn print_token(token: &str) {
    println!("{} {}", "Link token created:".green(), token);
    println!();
    println!("For sandbox testing, use the Plaid Link demo:");
    println!("  {}", QUICKSTART_URL);
    println!("Use any of the sandbox credentials provided by Plaid, then run");
    println!("  {} to get an access token.", "pft exchange <PUBLIC_TOKEN>".bold());
}
