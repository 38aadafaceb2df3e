pub mod engine;
pub mod menu;

pub use engine::{Account, Amount, LedgerError, LedgerStore};
