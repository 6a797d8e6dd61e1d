//! Mock Plaid API server for testing
//!
//! This module provides a mock HTTP server that simulates the subset of the
//! Plaid API used by the gateway:
//! - POST /link/token/create returns { link_token, expiration, request_id }
//! - POST /item/public_token/exchange returns { access_token, item_id, request_id }
//! - POST /accounts/get returns { accounts: [...], request_id }
//! - POST /transactions/get returns { accounts, transactions: [...], total_transactions }
//!
//! Errors use Plaid's body shape { error_type, error_code, error_message }.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value as JsonValue};

/// Mock Plaid server for testing
pub struct MockPlaidServer {
    port: u16,
    running: Arc<AtomicBool>,
    transaction_requests: Arc<AtomicUsize>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Configuration for mock data generation
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Number of accounts to generate
    pub num_accounts: usize,
    /// Total number of transactions across all accounts
    pub num_transactions: usize,
    /// Cap on transactions per page, regardless of the requested count
    pub page_limit: Option<usize>,
    /// Answer every data request with ITEM_LOGIN_REQUIRED
    pub fail_auth: bool,
    /// Answer every request with HTTP 500
    pub server_error: bool,
    /// Leave `balances.current` null on the last account
    pub missing_current_balance: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            num_accounts: 2,
            num_transactions: 10,
            page_limit: None,
            fail_auth: false,
            server_error: false,
            missing_current_balance: false,
        }
    }
}

/// Access token handed out by the exchange endpoint
pub const MOCK_ACCESS_TOKEN: &str = "access-sandbox-mock";

/// First day of generated transactions; later ones go back one day each
const ANCHOR_DATE: (i32, u32, u32) = (2024, 1, 31);

impl MockPlaidServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let transaction_requests = Arc::new(AtomicUsize::new(0));
        let counter = transaction_requests.clone();

        // Non-blocking accept for graceful shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let counter = counter.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &counter);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            transaction_requests,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Number of /transactions/get calls served so far
    pub fn transaction_requests(&self) -> usize {
        self.transaction_requests.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockPlaidServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A parsed HTTP request: path, lowercased header names, JSON body
struct Request {
    path: String,
    headers: Vec<(String, String)>,
    body: JsonValue,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn str_field(&self, name: &str) -> &str {
        self.body.get(name).and_then(|v| v.as_str()).unwrap_or("")
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let path = request_line.split_whitespace().nth(1)?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).ok()?;
    let body = serde_json::from_slice(&body).unwrap_or(JsonValue::Null);

    Some(Request {
        path,
        headers,
        body,
    })
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, counter: &AtomicUsize) {
    let _ = stream.set_nonblocking(false);

    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    };

    if config.server_error {
        send_error(
            &mut stream,
            500,
            "API_ERROR",
            "INTERNAL_SERVER_ERROR",
            "an unexpected error occurred",
        );
        return;
    }

    let has_keys = request.header("plaid-client-id").is_some_and(|v| !v.is_empty())
        && request.header("plaid-secret").is_some_and(|v| !v.is_empty());
    if !has_keys {
        send_error(
            &mut stream,
            400,
            "INVALID_INPUT",
            "INVALID_API_KEYS",
            "invalid client_id or secret provided",
        );
        return;
    }

    match request.path.as_str() {
        "/link/token/create" => {
            let user = request
                .body
                .pointer("/user/client_user_id")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            if user.is_empty() {
                send_error(
                    &mut stream,
                    400,
                    "INVALID_REQUEST",
                    "MISSING_FIELDS",
                    "the following required fields are missing: user.client_user_id",
                );
                return;
            }
            let body = json!({
                "link_token": format!("link-sandbox-{}", user),
                "expiration": "2030-01-01T00:00:00Z",
                "request_id": "req_link"
            });
            send_json(&mut stream, &body);
        }
        "/item/public_token/exchange" => {
            if !request.str_field("public_token").starts_with("public-") {
                send_error(
                    &mut stream,
                    400,
                    "INVALID_INPUT",
                    "INVALID_PUBLIC_TOKEN",
                    "provided public token is in an invalid format",
                );
                return;
            }
            let body = json!({
                "access_token": MOCK_ACCESS_TOKEN,
                "item_id": "item_mock",
                "request_id": "req_exchange"
            });
            send_json(&mut stream, &body);
        }
        "/accounts/get" | "/transactions/get" => {
            if config.fail_auth {
                send_error(
                    &mut stream,
                    400,
                    "ITEM_ERROR",
                    "ITEM_LOGIN_REQUIRED",
                    "the login details of this item have changed",
                );
                return;
            }
            if !request.str_field("access_token").starts_with("access-") {
                send_error(
                    &mut stream,
                    400,
                    "INVALID_INPUT",
                    "INVALID_ACCESS_TOKEN",
                    "provided access token is in an invalid format",
                );
                return;
            }

            let accounts = generate_mock_accounts(config);
            if request.path == "/accounts/get" {
                send_json(&mut stream, &json!({ "accounts": accounts, "request_id": "req_accounts" }));
                return;
            }

            counter.fetch_add(1, Ordering::SeqCst);
            let options = request.body.get("options");
            let count = options
                .and_then(|o| o.get("count"))
                .and_then(|v| v.as_u64())
                .unwrap_or(100) as usize;
            let offset = options
                .and_then(|o| o.get("offset"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as usize;
            let count = config.page_limit.map_or(count, |limit| count.min(limit));

            let all = generate_mock_transactions(config);
            let page: Vec<JsonValue> = all.iter().skip(offset).take(count).cloned().collect();
            let body = json!({
                "accounts": accounts,
                "transactions": page,
                "total_transactions": all.len(),
                "request_id": "req_transactions"
            });
            send_json(&mut stream, &body);
        }
        _ => send_error(
            &mut stream,
            404,
            "INVALID_REQUEST",
            "NOT_FOUND",
            "endpoint not found",
        ),
    }
}

fn send_json(stream: &mut TcpStream, body: &JsonValue) {
    send_response(stream, 200, "OK", &body.to_string());
}

fn send_error(stream: &mut TcpStream, status: u16, error_type: &str, code: &str, message: &str) {
    let body = json!({
        "error_type": error_type,
        "error_code": code,
        "error_message": message,
        "display_message": null,
        "request_id": "req_error"
    });
    let text = if status == 500 {
        "Internal Server Error"
    } else {
        "Bad Request"
    };
    send_response(stream, status, text, &body.to_string());
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn generate_mock_accounts(config: &MockConfig) -> Vec<JsonValue> {
    let kinds = [
        ("Plaid Checking", "depository", "checking"),
        ("Plaid Saving", "depository", "savings"),
        ("Plaid Credit Card", "credit", "credit card"),
    ];

    (0..config.num_accounts)
        .map(|i| {
            let (name, account_type, subtype) = kinds[i % kinds.len()];
            let missing = config.missing_current_balance && i + 1 == config.num_accounts;
            let current = if missing {
                JsonValue::Null
            } else {
                json!(100.0 + i as f64 * 110.5)
            };
            let available = if account_type == "credit" {
                JsonValue::Null
            } else {
                json!(90.0 + i as f64 * 100.0)
            };

            json!({
                "account_id": format!("acc_{}", i + 1),
                "name": name,
                "official_name": null,
                "type": account_type,
                "subtype": subtype,
                "mask": format!("{:04}", i),
                "balances": {
                    "current": current,
                    "available": available,
                    "iso_currency_code": "USD",
                    "limit": null
                }
            })
        })
        .collect()
}

fn generate_mock_transactions(config: &MockConfig) -> Vec<JsonValue> {
    let merchants = [
        ("Starbucks", -4.33, Some(vec!["Food and Drink", "Restaurants", "Coffee Shop"])),
        ("United Airlines", -500.0, Some(vec!["Travel", "Airlines and Aviation Services"])),
        ("Uber", -6.33, Some(vec!["Travel", "Taxi"])),
        ("INTRST PYMNT", 4.22, None),
        ("CD DEPOSIT", 1000.0, Some(vec!["Transfer", "Deposit"])),
    ];

    let (y, m, d) = ANCHOR_DATE;
    let anchor = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let accounts = config.num_accounts.max(1);

    (0..config.num_transactions)
        .map(|i| {
            let (merchant, amount, category) = &merchants[i % merchants.len()];
            let date = anchor - Duration::days((i % 30) as i64);
            let merchant_name = if category.is_some() {
                json!(merchant)
            } else {
                JsonValue::Null
            };

            json!({
                "transaction_id": format!("tx_{}", i + 1),
                "account_id": format!("acc_{}", (i % accounts) + 1),
                "amount": amount,
                "date": date.format("%Y-%m-%d").to_string(),
                "name": merchant,
                "category": category,
                "merchant_name": merchant_name,
                "pending": i < 2,
                "iso_currency_code": "USD"
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use rust_decimal::Decimal;

    use super::*;
    use crate::adapters::plaid::PlaidClient;
    use crate::domain::result::Error;
    use crate::ports::ProviderGateway;

    fn client_for(server: &MockPlaidServer) -> PlaidClient {
        PlaidClient::new_with_base_url(
            "client_id",
            "secret",
            &server.base_url(),
            StdDuration::from_secs(10),
        )
        .unwrap()
    }

    fn window() -> (Option<NaiveDate>, Option<NaiveDate>) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        )
    }

    #[test]
    fn test_mock_server_starts() {
        let server = MockPlaidServer::start(MockConfig::default()).unwrap();
        assert!(server.port() > 0);
    }

    #[test]
    fn test_create_link_token() {
        let server = MockPlaidServer::start(MockConfig::default()).unwrap();

        let token = client_for(&server).create_link_token("user_123").unwrap();
        assert_eq!(token, "link-sandbox-user_123");
    }

    #[test]
    fn test_exchange_public_token() {
        let server = MockPlaidServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server);

        let access = client.exchange_public_token("public-sandbox-abc").unwrap();
        assert_eq!(access, MOCK_ACCESS_TOKEN);

        let err = client.exchange_public_token("garbage").unwrap_err();
        assert!(err.is_auth(), "got: {}", err);
    }

    #[test]
    fn test_accounts_decode() {
        let server = MockPlaidServer::start(MockConfig {
            num_accounts: 3,
            ..Default::default()
        })
        .unwrap();

        let accounts = client_for(&server).get_accounts(MOCK_ACCESS_TOKEN).unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].account_id, "acc_1");
        assert_eq!(accounts[0].account_type, "depository");
        assert_eq!(accounts[0].balances.current, Some(Decimal::new(100, 0)));
        assert_eq!(accounts[1].balances.current, Some(Decimal::new(2105, 1)));
        assert_eq!(accounts[2].account_type, "credit");
        assert_eq!(accounts[2].balances.available, None);
    }

    #[test]
    fn test_transactions_decode() {
        let server = MockPlaidServer::start(MockConfig::default()).unwrap();
        let (start, end) = window();

        let txs = client_for(&server)
            .get_transactions(MOCK_ACCESS_TOKEN, start, end)
            .unwrap();

        assert_eq!(txs.len(), 10);
        assert_eq!(txs[0].transaction_id, "tx_1");
        assert_eq!(txs[0].amount, Decimal::new(-433, 2));
        assert_eq!(txs[0].category[0], "Food and Drink");
        assert!(txs[3].category.is_empty());
        assert_eq!(txs[3].merchant_name, None);
        assert_eq!(server.transaction_requests(), 1);
    }

    #[test]
    fn test_pagination_collects_all_pages() {
        let server = MockPlaidServer::start(MockConfig {
            num_transactions: 23,
            page_limit: Some(10),
            ..Default::default()
        })
        .unwrap();
        let (start, end) = window();

        let txs = client_for(&server)
            .get_transactions(MOCK_ACCESS_TOKEN, start, end)
            .unwrap();

        assert_eq!(txs.len(), 23);
        assert_eq!(txs[22].transaction_id, "tx_23");
        assert_eq!(server.transaction_requests(), 3);
    }

    #[test]
    fn test_no_transactions() {
        let server = MockPlaidServer::start(MockConfig {
            num_transactions: 0,
            ..Default::default()
        })
        .unwrap();
        let (start, end) = window();

        let txs = client_for(&server)
            .get_transactions(MOCK_ACCESS_TOKEN, start, end)
            .unwrap();
        assert!(txs.is_empty());
        assert_eq!(server.transaction_requests(), 1);
    }

    #[test]
    fn test_invalid_access_token_is_auth() {
        let server = MockPlaidServer::start(MockConfig::default()).unwrap();

        let err = client_for(&server).get_accounts("bogus").unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("INVALID_ACCESS_TOKEN"));
    }

    #[test]
    fn test_item_login_required_is_auth() {
        let server = MockPlaidServer::start(MockConfig {
            fail_auth: true,
            ..Default::default()
        })
        .unwrap();
        let (start, end) = window();

        let err = client_for(&server)
            .get_transactions(MOCK_ACCESS_TOKEN, start, end)
            .unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn test_server_error_is_remote() {
        let server = MockPlaidServer::start(MockConfig {
            server_error: true,
            ..Default::default()
        })
        .unwrap();

        let err = client_for(&server).get_accounts(MOCK_ACCESS_TOKEN).unwrap_err();
        assert!(matches!(err, Error::RemoteService(_)), "got: {}", err);
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_connection_refused_is_remote() {
        let port = {
            let server = MockPlaidServer::start(MockConfig::default()).unwrap();
            server.port()
        };
        let client = PlaidClient::new_with_base_url(
            "client_id",
            "secret",
            &format!("http://127.0.0.1:{}", port),
            StdDuration::from_secs(5),
        )
        .unwrap();

        let err = client.get_accounts(MOCK_ACCESS_TOKEN).unwrap_err();
        assert!(matches!(err, Error::RemoteService(_)));
    }

    #[test]
    fn test_missing_current_balance_passes_through() {
        let server = MockPlaidServer::start(MockConfig {
            num_accounts: 2,
            missing_current_balance: true,
            ..Default::default()
        })
        .unwrap();

        let accounts = client_for(&server).get_accounts(MOCK_ACCESS_TOKEN).unwrap();
        assert!(accounts[0].balances.current.is_some());
        assert!(accounts[1].balances.current.is_none());
    }
}
