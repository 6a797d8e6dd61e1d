//! Transaction domain models
//!
//! `ProviderTransaction` is a record as fetched, in the provider's sign
//! convention. `LedgerTransaction` is a row of the local transactions table.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account name stored when a transaction's account is not among the known accounts
pub const UNKNOWN_ACCOUNT_NAME: &str = "Unknown";

/// Separator used when joining provider category labels
const CATEGORY_SEPARATOR: &str = ", ";

/// A transaction as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTransaction {
    pub transaction_id: String,
    pub account_id: String,
    /// Raw signed amount (provider convention)
    pub amount: Decimal,
    pub date: NaiveDate,
    pub name: String,
    /// Category labels, most general first
    pub category: Vec<String>,
    pub merchant_name: Option<String>,
    pub pending: bool,
    pub iso_currency_code: Option<String>,
}

impl ProviderTransaction {
    /// Create a transaction with required fields
    pub fn new(
        transaction_id: impl Into<String>,
        account_id: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
        name: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            account_id: account_id.into(),
            amount,
            date,
            name: name.into(),
            category: Vec::new(),
            merchant_name: None,
            pending: false,
            iso_currency_code: None,
        }
    }
}

/// A row of the transactions table
///
/// Field order is the column order of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub transaction_id: String,
    pub account_id: String,
    /// Account display name at insertion time
    pub account_name: String,
    /// Positive = money out, negative = money in
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub merchant_name: String,
}

impl LedgerTransaction {
    /// Column names of the transactions table, in order
    pub const COLUMNS: [&'static str; 8] = [
        "transaction_id",
        "account_id",
        "account_name",
        "amount",
        "date",
        "description",
        "category",
        "merchant_name",
    ];

    /// Normalize a provider transaction into a ledger row
    ///
    /// The amount is negated: the provider reports spending as negative,
    /// the ledger stores it as positive.
    pub fn from_provider(tx: &ProviderTransaction, account_name: Option<&str>) -> Self {
        Self {
            transaction_id: tx.transaction_id.clone(),
            account_id: tx.account_id.clone(),
            account_name: account_name.unwrap_or(UNKNOWN_ACCOUNT_NAME).to_string(),
            amount: negate_amount(tx.amount),
            date: tx.date,
            description: tx.name.clone(),
            category: join_categories(&tx.category),
            merchant_name: tx.merchant_name.clone().unwrap_or_default(),
        }
    }
}

/// Flip the sign of an amount, treating -0 as 0
pub fn negate_amount(amount: Decimal) -> Decimal {
    if amount.is_zero() {
        Decimal::ZERO
    } else {
        -amount
    }
}

/// Join category labels with ", " (empty string for no labels)
pub fn join_categories(categories: &[String]) -> String {
    categories.join(CATEGORY_SEPARATOR)
}
