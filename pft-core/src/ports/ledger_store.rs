//! Ledger store port - local persistence of transactions and balances

use crate::domain::result::Result;
use crate::domain::{Account, BalanceRow, LedgerTransaction, ProviderTransaction};

/// Storage for the two ledger tables
///
/// Every mutating operation is a full read-modify-write of one table.
/// There is no locking; concurrent writers race and the last one wins.
pub trait LedgerStore: Send + Sync {
    /// Create both tables (header only) if they do not exist yet
    fn initialize(&self) -> Result<()>;

    /// Append the transactions whose ids are not stored yet
    ///
    /// `known_accounts` is only used to resolve account names. Returns the
    /// number of inserted rows; duplicates are skipped silently.
    fn append_transactions(
        &self,
        transactions: &[ProviderTransaction],
        known_accounts: &[Account],
    ) -> Result<usize>;

    /// Replace the balances table with one row per account
    fn replace_balances(&self, accounts: &[Account]) -> Result<usize>;

    /// Read the balances table (empty if it was never written)
    fn latest_balances(&self) -> Result<Vec<BalanceRow>>;

    /// Read every stored transaction in file order (empty if never written)
    fn transactions(&self) -> Result<Vec<LedgerTransaction>>;
}
