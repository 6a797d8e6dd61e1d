//! Tab-separated ledger tables
//!
//! Two flat files in the data directory: `transactions.tsv` grows by
//! deduplicated appends, `balances.tsv` is replaced wholesale on every save.
//! Each mutation rewrites the whole file through a temp file in the same
//! directory that is renamed over the target.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, BalanceRow, LedgerTransaction, ProviderTransaction};
use crate::ports::LedgerStore;

/// File name of the transactions table
pub const TRANSACTIONS_FILE: &str = "transactions.tsv";

/// File name of the balances table
pub const BALANCES_FILE: &str = "balances.tsv";

const DELIMITER: u8 = b'\t';

/// Ledger store backed by two TSV files
#[derive(Debug, Clone)]
pub struct TsvLedgerStore {
    data_dir: PathBuf,
}

impl TsvLedgerStore {
    /// Create a store rooted at `data_dir` (nothing is touched until used)
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.data_dir.join(TRANSACTIONS_FILE)
    }

    pub fn balances_path(&self) -> PathBuf {
        self.data_dir.join(BALANCES_FILE)
    }

    /// Replace the balances table, stamping every row with `now`
    ///
    /// All rows are built before the file is touched, so an account without
    /// a current balance leaves the previous table intact.
    pub fn replace_balances_at(&self, accounts: &[Account], now: NaiveDateTime) -> Result<usize> {
        let rows = accounts
            .iter()
            .map(|account| BalanceRow::from_account(account, now))
            .collect::<Result<Vec<_>>>()?;

        let path = self.balances_path();
        self.write_table(&path, &BalanceRow::COLUMNS, &rows)?;

        info!(rows = rows.len(), "Replaced balance snapshot");
        Ok(rows.len())
    }

    fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| Error::storage(&self.data_dir, e))
    }

    /// Create `path` with only the header row unless it already exists
    fn create_if_missing(&self, path: &Path, columns: &[&str]) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        debug!(path = %path.display(), "Creating empty table");
        self.write_table::<LedgerTransaction>(path, columns, &[])
    }

    /// Load every row of a table; a missing or zero-byte file is an empty table
    fn read_table<T: DeserializeOwned>(&self, path: &Path, columns: &[&str]) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .from_path(path)
            .map_err(|e| Error::storage(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| Error::storage(path, e))?
            .clone();

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        if !headers.iter().eq(columns.iter().copied()) {
            return Err(Error::storage(
                path,
                format!(
                    "line 1: unexpected header '{}', expected '{}'",
                    headers.iter().collect::<Vec<_>>().join("\t"),
                    columns.join("\t")
                ),
            ));
        }

        let mut rows = Vec::new();
        for record in reader.deserialize::<T>() {
            let row = record.map_err(|e| match e.position() {
                Some(pos) => Error::storage(path, format!("line {}: {}", pos.line(), e)),
                None => Error::storage(path, e),
            })?;
            rows.push(row);
        }

        Ok(rows)
    }

    /// Temp file next to `path` carrying the mode the table has (or would get)
    fn temp_file_for(&self, path: &Path) -> std::io::Result<NamedTempFile> {
        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut builder = tempfile::Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // umask applies, as for a plain create
            builder.permissions(fs::Permissions::from_mode(0o644));
        }
        let tmp = builder.tempfile_in(&self.data_dir)?;

        if let Ok(metadata) = fs::metadata(path) {
            tmp.as_file().set_permissions(metadata.permissions())?;
        }
        Ok(tmp)
    }

    /// Write header plus rows to a temp file, then rename it over `path`
    fn write_table<T: Serialize>(&self, path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
        self.ensure_data_dir()?;

        let mut tmp = self.temp_file_for(path).map_err(|e| Error::storage(path, e))?;

        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(DELIMITER)
                .has_headers(false)
                .from_writer(&mut tmp);

            writer
                .write_record(columns)
                .map_err(|e| Error::storage(path, e))?;
            for row in rows {
                writer.serialize(row).map_err(|e| Error::storage(path, e))?;
            }
            writer.flush().map_err(|e| Error::storage(path, e))?;
        }

        tmp.as_file_mut()
            .sync_all()
            .map_err(|e| Error::storage(path, e))?;
        tmp.persist(path).map_err(|e| Error::storage(path, e.error))?;

        debug!(path = %path.display(), rows = rows.len(), "Wrote table");
        Ok(())
    }
}

impl LedgerStore for TsvLedgerStore {
    fn initialize(&self) -> Result<()> {
        self.ensure_data_dir()?;
        self.create_if_missing(&self.transactions_path(), &LedgerTransaction::COLUMNS)?;
        self.create_if_missing(&self.balances_path(), &BalanceRow::COLUMNS)?;
        Ok(())
    }

    fn append_transactions(
        &self,
        transactions: &[ProviderTransaction],
        known_accounts: &[Account],
    ) -> Result<usize> {
        if transactions.is_empty() {
            debug!("No transactions to append");
            return Ok(0);
        }

        if let Some(tx) = transactions.iter().find(|tx| tx.transaction_id.is_empty()) {
            return Err(Error::validation(format!(
                "transaction on account {} has an empty transaction_id",
                tx.account_id
            )));
        }

        let path = self.transactions_path();
        let mut rows: Vec<LedgerTransaction> =
            self.read_table(&path, &LedgerTransaction::COLUMNS)?;
        let existing = rows.len();

        let mut seen: HashSet<String> = rows.iter().map(|r| r.transaction_id.clone()).collect();

        // Last account listed under an id names it
        let names: HashMap<&str, &str> = known_accounts
            .iter()
            .map(|a| (a.account_id.as_str(), a.name.as_str()))
            .collect();

        for tx in transactions {
            if !seen.insert(tx.transaction_id.clone()) {
                continue;
            }
            let account_name = names.get(tx.account_id.as_str()).copied();
            rows.push(LedgerTransaction::from_provider(tx, account_name));
        }

        let inserted = rows.len() - existing;
        if inserted > 0 {
            self.write_table(&path, &LedgerTransaction::COLUMNS, &rows)?;
        }

        info!(
            inserted,
            skipped = transactions.len() - inserted,
            total = rows.len(),
            "Appended transactions"
        );
        Ok(inserted)
    }

    fn replace_balances(&self, accounts: &[Account]) -> Result<usize> {
        self.replace_balances_at(accounts, Local::now().naive_local())
    }

    fn latest_balances(&self) -> Result<Vec<BalanceRow>> {
        self.read_table(&self.balances_path(), &BalanceRow::COLUMNS)
    }

    fn transactions(&self) -> Result<Vec<LedgerTransaction>> {
        self.read_table(&self.transactions_path(), &LedgerTransaction::COLUMNS)
    }
}
