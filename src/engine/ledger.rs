use crate::engine::account::AccountOperationError;
use crate::engine::table::{AccountTable, CsvTable, StorageError};
use crate::engine::{Account, AccountRecord, Amount};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account number {0} already exists")]
    AccountAlreadyExists(String),

    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("Account operation failed: {0}")]
    Account(#[from] AccountOperationError),

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Owns the durable accounts table and the create/delete lifecycle.
///
/// `accounts` caches the accounts this session has created or worked on. It is
/// not authoritative: reads always go to the table through [`load_account`],
/// and balance changes made on a loaded account are never written back.
///
/// [`load_account`]: LedgerStore::load_account
pub struct LedgerStore<T: AccountTable> {
    accounts: HashMap<String, Account>,
    table: T,
}

impl LedgerStore<CsvTable> {
    /// Opens (or creates) the on-disk table at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        Ok(LedgerStore::with_table(CsvTable::open(path)?))
    }
}

impl<T: AccountTable> LedgerStore<T> {
    pub fn with_table(table: T) -> Self {
        LedgerStore {
            accounts: HashMap::new(),
            table,
        }
    }

    /// Creates an account and writes its row to the table.
    ///
    /// Only accounts known to this session count as duplicates. A number that
    /// is stored but was never loaded reaches the table, which rejects it as
    /// a [`StorageError::DuplicateKey`].
    pub fn create_account(
        &mut self,
        account_number: &str,
        name: &str,
        initial_balance: Amount,
    ) -> Result<&Account, LedgerError> {
        if self.accounts.contains_key(account_number) {
            log::warn!("Refusing to create account {account_number}: already exists");
            return Err(LedgerError::AccountAlreadyExists(account_number.to_owned()));
        }
        if initial_balance.is_negative() {
            return Err(AccountOperationError::InvalidAmount.into());
        }

        let account = Account::new(account_number, name, initial_balance);

        log::debug!("Inserting account {account_number} into table: Starting");
        self.table.insert(&AccountRecord::from(&account))?;
        log::debug!("Inserting account {account_number} into table: Done");

        Ok(self
            .accounts
            .entry(account_number.to_owned())
            .or_insert(account))
    }

    /// Removes an account known to this session from the cache and the table.
    pub fn delete_account(&mut self, account_number: &str) -> Result<(), LedgerError> {
        if !self.accounts.contains_key(account_number) {
            log::warn!("Refusing to delete account {account_number}: not found");
            return Err(LedgerError::AccountNotFound(account_number.to_owned()));
        }

        log::debug!("Deleting account {account_number} from table: Starting");
        let existed = self.table.delete(account_number)?;
        log::debug!("Deleting account {account_number} from table: Done (row existed: {existed})");

        self.accounts.remove(account_number);
        Ok(())
    }

    /// Reads a fresh snapshot of the account from the table. The snapshot
    /// carries the stored balance and an empty history.
    pub fn load_account(&self, account_number: &str) -> Result<Account, LedgerError> {
        log::debug!("Loading account {account_number} from table");
        match self.table.select(account_number)? {
            Some(row) => Ok(row.to_account()),
            None => Err(LedgerError::AccountNotFound(account_number.to_owned())),
        }
    }

    /// Replaces the cached copy of an account. The table is left untouched.
    pub fn cache_account(&mut self, account: Account) {
        log::debug!("Caching account {}", account.account_number());
        self.accounts
            .insert(account.account_number().to_owned(), account);
    }

    pub fn cached_account(&self, account_number: &str) -> Option<&Account> {
        self.accounts.get(account_number)
    }

    #[cfg(test)]
    pub(crate) fn table(&self) -> &T {
        &self.table
    }

    /// Closes the table; the store is consumed.
    pub fn close(mut self) -> Result<(), LedgerError> {
        self.table.close()?;
        Ok(())
    }
}
