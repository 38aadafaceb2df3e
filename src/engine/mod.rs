mod account;
mod amount;
mod ledger;
mod record;
pub mod table;

pub use account::{Account, AccountOperationError};
pub use amount::{Amount, AmountError};
pub use ledger::{LedgerError, LedgerStore};
pub use record::AccountRecord;
pub use table::{AccountTable, CsvTable, MemoryTable, StorageError};
