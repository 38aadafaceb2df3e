use crate::engine::amount::{Amount, AmountError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountOperationError {
    #[error("Invalid deposit amount")]
    InvalidAmount,

    #[error("Insufficient balance or invalid amount")]
    InsufficientFundsOrInvalidAmount,

    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Bank account held in memory, with the history of operations applied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique key of the account; never changes after creation.
    account_number: String,
    pub name: String,
    balance: Amount,
    transaction_history: Vec<String>,
}

impl Account {
    pub fn new(account_number: impl Into<String>, name: impl Into<String>, balance: Amount) -> Self {
        Account {
            account_number: account_number.into(),
            name: name.into(),
            balance,
            transaction_history: Vec::new(),
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    /// Credits a strictly positive amount and returns the new balance.
    pub fn deposit(&mut self, amount: Amount) -> Result<Amount, AccountOperationError> {
        if !amount.is_positive() {
            return Err(AccountOperationError::InvalidAmount);
        }

        self.balance = self.balance.checked_add(amount)?;
        self.transaction_history.push(format!("Deposited: {amount}"));
        Ok(self.balance)
    }

    /// Debits an amount in `(0, balance]` and returns the new balance.
    /// A non-positive amount and an overdraft are reported with the same error.
    pub fn withdraw(&mut self, amount: Amount) -> Result<Amount, AccountOperationError> {
        if !amount.is_positive() || amount > self.balance {
            return Err(AccountOperationError::InsufficientFundsOrInvalidAmount);
        }

        self.balance = self.balance.checked_sub(amount)?;
        self.transaction_history.push(format!("Withdrew: {amount}"));
        Ok(self.balance)
    }

    pub fn check_balance(&self) -> Amount {
        self.balance
    }

    pub fn show_transaction_history(&self) -> &[String] {
        &self.transaction_history
    }
}
