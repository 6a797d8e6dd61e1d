//! CLI command implementations

pub mod balances;
pub mod exchange;
pub mod link;
pub mod menu;
pub mod sync;
pub mod transactions;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pft_core::PftContext;

/// Subdirectory of the platform data directory used by default
const DEFAULT_DIR_NAME: &str = "pft";

/// Resolve the data directory
///
/// `--data-dir` (or `PFT_DATA_DIR`, handled by clap) wins; otherwise the
/// platform data directory, e.g. `~/.local/share/pft` on Linux.
pub fn get_data_dir(data_dir: Option<&Path>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => dirs::data_dir()
            .map(|d| d.join(DEFAULT_DIR_NAME))
            .context("Could not determine a data directory; pass --data-dir"),
    }
}

/// Create the pft context for the resolved data directory
pub fn get_context(data_dir: Option<&Path>) -> Result<PftContext> {
    let data_dir = get_data_dir(data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), "Using data directory");

    PftContext::new(&data_dir).context("Failed to initialize pft context")
}
