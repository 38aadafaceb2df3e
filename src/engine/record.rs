use serde::{Deserialize, Serialize};

use crate::engine::{Account, Amount};

/// One row of the durable `accounts` table.
/// Column order matches the table header: `account_number,name,balance`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub account_number: String,
    pub name: String,
    pub balance: Amount,
}

impl AccountRecord {
    /// Builds a fresh account from the stored row. History starts empty.
    pub fn to_account(&self) -> Account {
        Account::new(self.account_number.clone(), self.name.clone(), self.balance)
    }
}

impl From<&Account> for AccountRecord {
    fn from(account: &Account) -> Self {
        AccountRecord {
            account_number: account.account_number().to_owned(),
            name: account.name.clone(),
            balance: account.check_balance(),
        }
    }
}
