//! Balance snapshot domain model

use chrono::{NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::Account;

/// Format of `last_updated` in the balances table
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A row of the balances table: one account's balance at the latest save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub account_id: String,
    pub account_name: String,
    pub account_type: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance_current: Decimal,
    /// Empty field when the provider reports no available balance
    #[serde(with = "rust_decimal::serde::str_option")]
    pub balance_available: Option<Decimal>,
    /// Local wall-clock time of the save, second precision
    #[serde(with = "timestamp")]
    pub last_updated: NaiveDateTime,
}

impl BalanceRow {
    /// Column names of the balances table, in order
    pub const COLUMNS: [&'static str; 6] = [
        "account_id",
        "account_name",
        "account_type",
        "balance_current",
        "balance_available",
        "last_updated",
    ];

    /// Build a row from a fetched account
    ///
    /// Fails with a validation error naming the account when the provider
    /// did not supply a current balance.
    pub fn from_account(account: &Account, last_updated: NaiveDateTime) -> Result<Self> {
        let balance_current = account.balances.current.ok_or_else(|| {
            Error::validation(format!(
                "account {} has no current balance",
                account.account_id
            ))
        })?;

        Ok(Self {
            account_id: account.account_id.clone(),
            account_name: account.name.clone(),
            account_type: account.account_type.clone(),
            balance_current,
            balance_available: account.balances.available,
            last_updated: truncate_to_seconds(last_updated),
        })
    }
}

/// Drop sub-second precision
pub fn truncate_to_seconds(time: NaiveDateTime) -> NaiveDateTime {
    time.with_nanosecond(0).unwrap_or(time)
}

/// (De)serialize timestamps as `YYYY-MM-DD HH:MM:SS`
mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}
