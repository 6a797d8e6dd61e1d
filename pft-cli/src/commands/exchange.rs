//! Exchange command - trade a public token for an access token

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::get_context;

pub fn run(data_dir: Option<&Path>, public_token: &str) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let access_token = ctx.link_service()?.exchange_public_token(public_token)?;

    println!("{} {}", "Access token:".green(), access_token);
    println!("Keep it somewhere safe; pass it to {}.", "pft sync --access-token".bold());
    Ok(())
}
