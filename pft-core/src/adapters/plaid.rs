//! Plaid API client
//!
//! Handles link-token creation, public-token exchange and account/transaction
//! fetches against the Plaid REST API.
//!
//! API Documentation: https://plaid.com/docs/api/

use std::time::Duration;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountBalances, ProviderTransaction};
use crate::ports::{DateWindow, ProviderGateway};

/// API version pinned through the `Plaid-Version` header
pub const PLAID_VERSION: &str = "2020-09-14";

/// Environment variable to override the Plaid API base URL (mock servers, proxies)
pub const PLAID_BASE_URL_ENV: &str = "PLAID_BASE_URL";

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Name shown to the end user in the Link flow
pub const CLIENT_NAME: &str = "Personal Finance Tracker";

const PRODUCTS: [&str; 2] = ["transactions", "auth"];
const COUNTRY_CODES: [&str; 1] = ["US"];
const LANGUAGE: &str = "en";

/// Page size for /transactions/get (API maximum is 500)
const TRANSACTIONS_PAGE_SIZE: usize = 500;

/// Error codes that mean the credential or token itself is bad
const AUTH_ERROR_CODES: [&str; 6] = [
    "INVALID_ACCESS_TOKEN",
    "INVALID_PUBLIC_TOKEN",
    "INVALID_LINK_TOKEN",
    "INVALID_API_KEYS",
    "ITEM_LOGIN_REQUIRED",
    "ACCESS_NOT_GRANTED",
];

// =============================================================================
// Environment
// =============================================================================

/// Plaid deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaidEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl PlaidEnvironment {
    /// Parse an environment name; unknown names fall back to sandbox
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Self::Sandbox,
            "production" => Self::Production,
            other => {
                warn!(environment = other, "Unknown Plaid environment, using sandbox");
                Self::Sandbox
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.plaid.com",
            Self::Production => "https://production.plaid.com",
        }
    }
}

/// Base URL for `environment`, unless overridden by `PLAID_BASE_URL`
pub fn get_base_url(environment: PlaidEnvironment) -> String {
    std::env::var(PLAID_BASE_URL_ENV).unwrap_or_else(|_| environment.base_url().to_string())
}

// =============================================================================
// API Request/Response Models
// =============================================================================

#[derive(Debug, Serialize)]
struct LinkTokenCreateRequest<'a> {
    client_name: &'a str,
    language: &'a str,
    country_codes: &'a [&'a str],
    products: &'a [&'a str],
    user: LinkUser<'a>,
}

#[derive(Debug, Serialize)]
struct LinkUser<'a> {
    client_user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct LinkTokenCreateResponse {
    link_token: String,
}

#[derive(Debug, Serialize)]
struct PublicTokenExchangeRequest<'a> {
    public_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct PublicTokenExchangeResponse {
    access_token: String,
    #[serde(default)]
    item_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct AccessTokenRequest<'a> {
    access_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccountsGetResponse {
    accounts: Vec<PlaidAccount>,
}

/// Plaid account from API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaidAccount {
    pub account_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    pub balances: PlaidBalances,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaidBalances {
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub current: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub available: Option<Decimal>,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
}

#[derive(Debug, Serialize)]
struct TransactionsGetRequest<'a> {
    access_token: &'a str,
    start_date: String,
    end_date: String,
    options: TransactionsGetOptions,
}

#[derive(Debug, Serialize)]
struct TransactionsGetOptions {
    count: usize,
    offset: usize,
}

#[derive(Debug, Deserialize)]
struct TransactionsGetResponse {
    transactions: Vec<PlaidTransaction>,
    total_transactions: usize,
}

/// Plaid transaction from API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaidTransaction {
    pub transaction_id: String,
    pub account_id: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    pub date: chrono::NaiveDate,
    pub name: String,
    /// Legacy category hierarchy; null for some transactions
    #[serde(default)]
    pub category: Option<Vec<String>>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize)]
struct PlaidErrorBody {
    #[serde(default)]
    error_type: String,
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    error_message: String,
}

/// Deserialize amount that can be number or string
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    parse_amount(&value).map_err(D::Error::custom)
}

/// Deserialize optional amount (null or missing is None)
fn deserialize_optional_amount<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => parse_amount(&v).map(Some).map_err(D::Error::custom),
    }
}

fn parse_amount(value: &JsonValue) -> std::result::Result<Decimal, String> {
    let raw = match value {
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        _ => return Err("expected number or string for amount".to_string()),
    };
    raw.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|e| format!("invalid decimal '{}': {}", raw, e))
}

// =============================================================================
// Plaid HTTP Client
// =============================================================================

/// Plaid API client
pub struct PlaidClient {
    client: reqwest::blocking::Client,
    client_id: String,
    secret: String,
    base_url: String,
    timeout_secs: u64,
}

impl std::fmt::Debug for PlaidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaidClient")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl PlaidClient {
    /// Create a client for `environment`.
    ///
    /// Uses the `PLAID_BASE_URL` environment variable if set.
    pub fn new(
        client_id: &str,
        secret: &str,
        environment: PlaidEnvironment,
        timeout: Duration,
    ) -> Result<Self> {
        debug!(environment = environment.as_str(), "Creating Plaid client");
        Self::new_with_base_url(client_id, secret, &get_base_url(environment), timeout)
    }

    /// Create a client against a custom base URL
    pub fn new_with_base_url(
        client_id: &str,
        secret: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if client_id.trim().is_empty() {
            return Err(Error::config("Plaid client id cannot be empty"));
        }
        if secret.trim().is_empty() {
            return Err(Error::config("Plaid secret cannot be empty"));
        }
        url::Url::parse(base_url)
            .map_err(|e| Error::config(format!("invalid Plaid base URL '{}': {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            secret: secret.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body to `path` and decode the JSON response
    fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint = path, "Plaid request");

        let response = self
            .client
            .post(&url)
            .header("PLAID-CLIENT-ID", &self.client_id)
            .header("PLAID-SECRET", &self.secret)
            .header("Plaid-Version", PLAID_VERSION)
            .json(body)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(map_error_response(status.as_u16(), &text));
        }

        response
            .json::<R>()
            .map_err(|e| Error::remote(format!("Failed to parse Plaid {} response: {}", path, e)))
    }

    /// Fetch one page of transactions
    fn fetch_transactions_page(
        &self,
        access_token: &str,
        window: DateWindow,
        offset: usize,
    ) -> Result<TransactionsGetResponse> {
        let request = TransactionsGetRequest {
            access_token,
            start_date: window.start.format("%Y-%m-%d").to_string(),
            end_date: window.end.format("%Y-%m-%d").to_string(),
            options: TransactionsGetOptions {
                count: TRANSACTIONS_PAGE_SIZE,
                offset,
            },
        };
        self.post("/transactions/get", &request)
    }

    /// Map Plaid account to domain Account
    fn map_account(&self, account: &PlaidAccount) -> Account {
        Account {
            account_id: account.account_id.clone(),
            name: account.name.clone(),
            account_type: account.account_type.clone(),
            subtype: account.subtype.clone(),
            mask: account.mask.clone(),
            balances: AccountBalances {
                current: account.balances.current,
                available: account.balances.available,
                iso_currency_code: account.balances.iso_currency_code.clone(),
            },
        }
    }

    /// Map Plaid transaction to domain ProviderTransaction
    fn map_transaction(&self, tx: &PlaidTransaction) -> ProviderTransaction {
        ProviderTransaction {
            transaction_id: tx.transaction_id.clone(),
            account_id: tx.account_id.clone(),
            amount: tx.amount,
            date: tx.date,
            name: tx.name.clone(),
            category: tx.category.clone().unwrap_or_default(),
            merchant_name: tx.merchant_name.clone().filter(|m| !m.trim().is_empty()),
            pending: tx.pending,
            iso_currency_code: tx.iso_currency_code.clone(),
        }
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::remote(format!(
                "Connection timed out after {} seconds",
                self.timeout_secs
            ))
        } else if error.is_connect() {
            Error::remote("Unable to connect to Plaid servers")
        } else {
            Error::remote(format!("Plaid request failed: {}", error))
        }
    }
}

/// Classify a non-2xx response
///
/// Credential/token error codes and HTTP 401/403 are authentication
/// failures; everything else is a remote service failure.
fn map_error_response(status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<PlaidErrorBody>(body).ok();

    let is_auth_code = parsed
        .as_ref()
        .map(|b| AUTH_ERROR_CODES.contains(&b.error_code.as_str()))
        .unwrap_or(false);

    let detail = match &parsed {
        Some(b) if !b.error_code.is_empty() => format!(
            "{} {}: {} (HTTP {})",
            b.error_type, b.error_code, b.error_message, status
        ),
        _ => format!("Plaid API error: HTTP {}", status),
    };

    if is_auth_code || status == 401 || status == 403 {
        Error::auth(detail)
    } else {
        Error::remote(detail)
    }
}

impl ProviderGateway for PlaidClient {
    fn name(&self) -> &str {
        "plaid"
    }

    fn create_link_token(&self, user_id: &str) -> Result<String> {
        let request = LinkTokenCreateRequest {
            client_name: CLIENT_NAME,
            language: LANGUAGE,
            country_codes: &COUNTRY_CODES,
            products: &PRODUCTS,
            user: LinkUser {
                client_user_id: user_id,
            },
        };

        let response: LinkTokenCreateResponse = self.post("/link/token/create", &request)?;
        info!("Created link token");
        Ok(response.link_token)
    }

    fn exchange_public_token(&self, public_token: &str) -> Result<String> {
        let response: PublicTokenExchangeResponse = self.post(
            "/item/public_token/exchange",
            &PublicTokenExchangeRequest { public_token },
        )?;
        info!(item_id = ?response.item_id, "Exchanged public token");
        Ok(response.access_token)
    }

    fn get_accounts(&self, access_token: &str) -> Result<Vec<Account>> {
        let response: AccountsGetResponse =
            self.post("/accounts/get", &AccessTokenRequest { access_token })?;

        let accounts: Vec<Account> = response
            .accounts
            .iter()
            .map(|a| self.map_account(a))
            .collect();

        info!(count = accounts.len(), "Fetched accounts");
        Ok(accounts)
    }

    fn get_transactions(
        &self,
        access_token: &str,
        start: Option<chrono::NaiveDate>,
        end: Option<chrono::NaiveDate>,
    ) -> Result<Vec<ProviderTransaction>> {
        let window = DateWindow::resolve(start, end)?;
        debug!(start = %window.start, end = %window.end, "Fetching transactions");

        let mut transactions = Vec::new();
        loop {
            let page = self.fetch_transactions_page(access_token, window, transactions.len())?;
            let received = page.transactions.len();
            transactions.extend(page.transactions.iter().map(|t| self.map_transaction(t)));

            debug!(
                received,
                collected = transactions.len(),
                total = page.total_transactions,
                "Fetched transactions page"
            );

            if received == 0 || transactions.len() >= page.total_transactions {
                break;
            }
        }

        info!(count = transactions.len(), "Fetched transactions");
        Ok(transactions)
    }
}

// =============================================================================
// Tests
// =============================================================================
