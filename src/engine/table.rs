//! Durable `accounts` table.
//!
//! The table has three columns, `account_number` (primary key), `name` and
//! `balance`. [`CsvTable`] keeps it on disk as a CSV file with a header row;
//! [`MemoryTable`] keeps it in memory for tests.

use csv::Trim;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::AccountRecord;

const HEADER: [&str; 3] = ["account_number", "name", "balance"];

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("table I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("table file is malformed: {0}")]
    Csv(#[from] csv::Error),

    #[error("account number {0} is already stored")]
    DuplicateKey(String),

    #[error("table is closed")]
    Closed,
}

/// Storage seam for the accounts table.
///
/// Every mutating call is one statement: it either commits entirely or leaves
/// the table as it was.
pub trait AccountTable {
    /// Adds a row. Fails with [`StorageError::DuplicateKey`] if the key is taken.
    fn insert(&mut self, row: &AccountRecord) -> Result<(), StorageError>;

    fn select(&self, account_number: &str) -> Result<Option<AccountRecord>, StorageError>;

    /// Removes the row for `account_number`, returning whether one existed.
    fn delete(&mut self, account_number: &str) -> Result<bool, StorageError>;

    /// Releases the table. Later calls fail with [`StorageError::Closed`].
    fn close(&mut self) -> Result<(), StorageError>;
}

/// Accounts table stored in a CSV file.
///
/// No file handle is held between statements: each statement opens, reads
/// and (for writes) replaces the file. `open` only marks the table usable and
/// `close` marks it unusable.
#[derive(Debug)]
pub struct CsvTable {
    path: PathBuf,
    open: bool,
}

impl CsvTable {
    /// Opens the table at `path`, creating an empty one if the file is missing.
    /// An existing file is read once so a corrupt table is reported up front.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let table = CsvTable {
            path: path.as_ref().to_path_buf(),
            open: true,
        };

        if table.path.exists() {
            let rows = table.read_rows()?;
            log::info!("Table {:?} opened with {} account(s)", table.path, rows.len());
        } else {
            table.write_rows(&[])?;
            log::info!("Table {:?} created", table.path);
        }

        Ok(table)
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.open {
            Ok(())
        } else {
            Err(StorageError::Closed)
        }
    }

    fn read_rows(&self) -> Result<Vec<AccountRecord>, StorageError> {
        // Field values are kept byte for byte; only header cells are trimmed.
        let mut rdr = csv::ReaderBuilder::new()
            .trim(Trim::Headers)
            .from_path(&self.path)?;

        let rows = rdr.deserialize().collect::<Result<Vec<AccountRecord>, _>>()?;
        Ok(rows)
    }

    /// Writes the full table next to the real file, then renames it into place.
    fn write_rows(&self, rows: &[AccountRecord]) -> Result<(), StorageError> {
        let tmp_path = self.tmp_path();

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp_path)?;
        wtr.write_record(HEADER)?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;

        let file = wtr.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        log::debug!("Table {:?} written with {} row(s)", self.path, rows.len());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl AccountTable for CsvTable {
    fn insert(&mut self, row: &AccountRecord) -> Result<(), StorageError> {
        self.ensure_open()?;

        let mut rows = self.read_rows()?;
        if rows.iter().any(|r| r.account_number == row.account_number) {
            return Err(StorageError::DuplicateKey(row.account_number.clone()));
        }
        rows.push(row.clone());

        self.write_rows(&rows)
    }

    fn select(&self, account_number: &str) -> Result<Option<AccountRecord>, StorageError> {
        self.ensure_open()?;

        let row = self
            .read_rows()?
            .into_iter()
            .find(|r| r.account_number == account_number);
        Ok(row)
    }

    fn delete(&mut self, account_number: &str) -> Result<bool, StorageError> {
        self.ensure_open()?;

        let mut rows = self.read_rows()?;
        let before = rows.len();
        rows.retain(|r| r.account_number != account_number);
        if rows.len() == before {
            return Ok(false);
        }

        self.write_rows(&rows)?;
        Ok(true)
    }

    fn close(&mut self) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.open = false;
        log::info!("Table {:?} closed", self.path);
        Ok(())
    }
}

/// Accounts table kept in memory.
#[derive(Debug, Default)]
pub struct MemoryTable {
    rows: BTreeMap<String, AccountRecord>,
    closed: bool,
}

impl MemoryTable {
    pub fn new() -> Self {
        MemoryTable::default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }
}

impl AccountTable for MemoryTable {
    fn insert(&mut self, row: &AccountRecord) -> Result<(), StorageError> {
        self.ensure_open()?;
        if self.rows.contains_key(&row.account_number) {
            return Err(StorageError::DuplicateKey(row.account_number.clone()));
        }
        self.rows.insert(row.account_number.clone(), row.clone());
        Ok(())
    }

    fn select(&self, account_number: &str) -> Result<Option<AccountRecord>, StorageError> {
        self.ensure_open()?;
        Ok(self.rows.get(account_number).cloned())
    }

    fn delete(&mut self, account_number: &str) -> Result<bool, StorageError> {
        self.ensure_open()?;
        Ok(self.rows.remove(account_number).is_some())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}
