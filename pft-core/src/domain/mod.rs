//! Core domain entities
//!
//! Plain data structures plus the normalization rules applied when provider
//! records enter the ledger. No I/O.

mod account;
pub mod balance;
pub mod result;
pub mod transaction;

pub use account::{Account, AccountBalances};
pub use balance::BalanceRow;
pub use transaction::{LedgerTransaction, ProviderTransaction};
