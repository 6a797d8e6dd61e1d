//! Provider gateway port
//!
//! Defines the interface to the account-aggregation service: opening a link
//! session, exchanging the resulting public token, and fetching accounts and
//! transactions for an access credential.

use chrono::{Duration, Local, NaiveDate};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, ProviderTransaction};

/// Length of the transaction window when no start date is given
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Aggregation provider gateway
///
/// Implementations talk to a remote provider. The SyncService and
/// LinkService use this trait without knowing which provider is behind it.
pub trait ProviderGateway: Send + Sync {
    /// Provider name (e.g., "plaid")
    fn name(&self) -> &str;

    /// Start a link session for `user_id` and return its link token
    fn create_link_token(&self, user_id: &str) -> Result<String>;

    /// Exchange a short-lived public token for a durable access credential
    fn exchange_public_token(&self, public_token: &str) -> Result<String>;

    /// Fetch all accounts reachable with `access_token`, with balances
    fn get_accounts(&self, access_token: &str) -> Result<Vec<Account>>;

    /// Fetch transactions in the window `[start, end]`
    ///
    /// Omitted bounds default independently (see [`DateWindow::resolve`]).
    fn get_transactions(
        &self,
        access_token: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ProviderTransaction>>;
}

/// Inclusive date range for a transactions fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Resolve optional bounds against today's local date
    pub fn resolve(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        Self::resolve_at(start, end, Local::now().date_naive())
    }

    /// Resolve optional bounds against a given `today`
    ///
    /// start defaults to `today - 30 days`, end defaults to `today`.
    pub fn resolve_at(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self> {
        let start = start.unwrap_or(today - Duration::days(DEFAULT_WINDOW_DAYS));
        let end = end.unwrap_or(today);

        if start > end {
            return Err(Error::validation(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        Ok(Self { start, end })
    }
}
