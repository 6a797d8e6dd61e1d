//! pft core - ledger storage and provider sync for a personal finance tracker
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Core entities (Account, ProviderTransaction, LedgerTransaction, BalanceRow)
//! - **ports**: Trait definitions for external dependencies (LedgerStore, ProviderGateway)
//! - **services**: Use-case orchestration (sync, account linking)
//! - **adapters**: Concrete implementations (TSV files, Plaid HTTP API)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::plaid::PlaidClient;
use adapters::tsv::TsvLedgerStore;
use config::Config;
use ports::{LedgerStore, ProviderGateway};
use services::{LinkService, SyncService};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Account, AccountBalances, BalanceRow, LedgerTransaction, ProviderTransaction};
pub use services::{SyncResult, DEFAULT_USER_ID};

/// Main context for pft operations
///
/// Holds the configuration and the ledger store. The provider gateway is
/// built on demand so commands that only read the ledger work without
/// credentials.
pub struct PftContext {
    pub config: Config,
    pub store: Arc<TsvLedgerStore>,
}

impl PftContext {
    /// Load configuration and make sure both ledger tables exist
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let store = Arc::new(TsvLedgerStore::new(data_dir));
        store
            .initialize()
            .with_context(|| format!("Failed to initialize ledger in {}", data_dir.display()))?;

        Ok(Self { config, store })
    }

    pub fn data_dir(&self) -> &Path {
        self.store.data_dir()
    }

    /// Build the Plaid gateway from configuration
    pub fn gateway(&self) -> domain::result::Result<Arc<dyn ProviderGateway>> {
        let (client_id, secret) = self.config.plaid_credentials()?;
        let client = PlaidClient::new(
            client_id,
            secret,
            self.config.plaid_environment,
            self.config.http_timeout(),
        )?;
        Ok(Arc::new(client))
    }

    pub fn sync_service(&self) -> domain::result::Result<SyncService> {
        let store: Arc<dyn LedgerStore> = self.store.clone();
        Ok(SyncService::new(store, self.gateway()?))
    }

    pub fn link_service(&self) -> domain::result::Result<LinkService> {
        Ok(LinkService::new(self.gateway()?))
    }
}
