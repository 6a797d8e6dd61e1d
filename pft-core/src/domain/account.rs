//! Account domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A financial account as reported by the provider
/// Note: account_type is a freeform string using Plaid nomenclature.
/// Common values include "depository", "credit", "investment", "loan", "other"
/// but any string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    /// Display name
    pub name: String,
    pub account_type: String,
    pub subtype: Option<String>,
    /// Last digits of the account number
    pub mask: Option<String>,
    pub balances: AccountBalances,
}

/// Balances attached to an account at fetch time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalances {
    /// Required by the ledger; optional here because the wire may omit it
    pub current: Option<Decimal>,
    pub available: Option<Decimal>,
    pub iso_currency_code: Option<String>,
}

impl Account {
    /// Create an account with no balance information
    pub fn new(
        account_id: impl Into<String>,
        name: impl Into<String>,
        account_type: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            name: name.into(),
            account_type: account_type.into(),
            subtype: None,
            mask: None,
            balances: AccountBalances::default(),
        }
    }

    /// Set current and available balances
    pub fn with_balances(mut self, current: Option<Decimal>, available: Option<Decimal>) -> Self {
        self.balances.current = current;
        self.balances.available = available;
        self
    }
}
