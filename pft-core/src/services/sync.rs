//! Sync service - pull accounts and transactions into the local ledger

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::domain::result::Result;
use crate::ports::{LedgerStore, ProviderGateway};

/// Sync service for account and transaction synchronization
pub struct SyncService {
    store: Arc<dyn LedgerStore>,
    gateway: Arc<dyn ProviderGateway>,
}

/// Counts reported after a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub provider: String,
    pub accounts_fetched: usize,
    pub transactions_fetched: usize,
    pub transactions_added: usize,
    /// Fetched transactions already in the ledger (or repeated in the fetch)
    pub transactions_skipped: usize,
    pub balances_written: usize,
}

impl SyncService {
    pub fn new(store: Arc<dyn LedgerStore>, gateway: Arc<dyn ProviderGateway>) -> Self {
        Self { store, gateway }
    }

    /// Fetch accounts and transactions for `access_token` and persist them
    ///
    /// Steps run in order: fetch accounts, fetch transactions, append
    /// transactions, replace balances. The first failure is returned as-is;
    /// steps that already completed are not rolled back.
    pub fn sync(
        &self,
        access_token: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<SyncResult> {
        let provider = self.gateway.name().to_string();

        let accounts = self.gateway.get_accounts(access_token)?;
        info!(provider = %provider, count = accounts.len(), "Found accounts");

        let transactions = self.gateway.get_transactions(access_token, start, end)?;
        info!(provider = %provider, count = transactions.len(), "Found transactions");

        let added = self.store.append_transactions(&transactions, &accounts)?;
        let balances_written = self.store.replace_balances(&accounts)?;

        info!(
            provider = %provider,
            added,
            balances = balances_written,
            "Sync complete"
        );

        Ok(SyncResult {
            provider,
            accounts_fetched: accounts.len(),
            transactions_fetched: transactions.len(),
            transactions_added: added,
            transactions_skipped: transactions.len() - added,
            balances_written,
        })
    }
}
