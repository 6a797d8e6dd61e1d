//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Tab-separated flat files for the LedgerStore port
//! - Plaid HTTP client for the ProviderGateway port

pub mod plaid;
pub mod tsv;

#[cfg(test)]
pub mod plaid_mock;
