//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, not on concrete implementations.

mod ledger_store;
mod provider_gateway;

pub use ledger_store::LedgerStore;
pub use provider_gateway::{DateWindow, ProviderGateway, DEFAULT_WINDOW_DAYS};
