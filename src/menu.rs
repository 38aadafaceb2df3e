use anyhow::Result;
use std::io::{BufRead, Write};

use crate::engine::{Account, AccountOperationError, AccountTable, Amount, LedgerError, LedgerStore};

const MENU: &str = "
--- Banking System ---
1. Create a new account
2. Deposit money
3. Withdraw money
4. Check balance
5. Show transaction history
6. Delete account
7. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Create,
    Deposit,
    Withdraw,
    CheckBalance,
    ShowHistory,
    Delete,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input {
            "1" => Some(MenuChoice::Create),
            "2" => Some(MenuChoice::Deposit),
            "3" => Some(MenuChoice::Withdraw),
            "4" => Some(MenuChoice::CheckBalance),
            "5" => Some(MenuChoice::ShowHistory),
            "6" => Some(MenuChoice::Delete),
            "7" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Line-oriented session over one ledger store.
struct Session<'a, T: AccountTable, R, W> {
    store: &'a mut LedgerStore<T>,
    input: R,
    output: W,
}

/// Runs the interactive menu until the user exits or input ends.
///
/// Validation and storage failures are printed and the menu is shown again;
/// only a failure to read the input or write the output is returned.
pub fn run<T, R, W>(store: &mut LedgerStore<T>, input: R, output: W) -> Result<()>
where
    T: AccountTable,
    R: BufRead,
    W: Write,
{
    let mut session = Session {
        store,
        input,
        output,
    };

    loop {
        writeln!(session.output, "{MENU}")?;
        let Some(choice) = session.prompt("Choose an option: ")? else {
            break;
        };

        log::debug!("Menu choice: {choice:?}");
        let keep_going = match MenuChoice::parse(&choice) {
            Some(MenuChoice::Exit) => {
                writeln!(session.output, "Exiting...")?;
                false
            }
            Some(choice) => session.handle(choice)?,
            None => {
                writeln!(session.output, "Invalid choice! Please try again.")?;
                true
            }
        };
        if !keep_going {
            break;
        }
    }

    session.output.flush()?;
    Ok(())
}

impl<T: AccountTable, R: BufRead, W: Write> Session<'_, T, R, W> {
    /// Prints `label` and reads one trimmed line. `None` means input is exhausted.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    /// Reads an amount. `Ok(None)` covers both end of input and a rejected value,
    /// the latter after telling the user.
    fn prompt_amount(&mut self, label: &str) -> Result<Option<Amount>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match raw.parse::<Amount>() {
            Ok(amount) => Ok(Some(amount)),
            Err(e) => {
                log::warn!("Rejected amount input {raw:?}: {e}");
                writeln!(self.output, "Invalid amount")?;
                Ok(None)
            }
        }
    }

    /// Handles one menu action. Returns `false` once input is exhausted.
    fn handle(&mut self, choice: MenuChoice) -> Result<bool> {
        let Some(account_number) = self.prompt("Enter account number: ")? else {
            return Ok(false);
        };

        match choice {
            MenuChoice::Create => return self.create(account_number),
            MenuChoice::Delete => match self.store.delete_account(&account_number) {
                Ok(()) => writeln!(
                    self.output,
                    "Account number {account_number} has been deleted."
                )?,
                Err(e) => self.report(&e)?,
            },
            MenuChoice::Deposit | MenuChoice::Withdraw => {
                return self.move_money(choice, &account_number);
            }
            MenuChoice::CheckBalance => {
                if let Some(account) = self.load(&account_number)? {
                    writeln!(self.output, "Account Balance: {}", account.check_balance())?;
                }
            }
            MenuChoice::ShowHistory => {
                if let Some(account) = self.load(&account_number)? {
                    writeln!(self.output, "Transaction History:")?;
                    for entry in account.show_transaction_history() {
                        writeln!(self.output, "{entry}")?;
                    }
                }
            }
            MenuChoice::Exit => return Ok(false),
        }

        Ok(true)
    }

    fn create(&mut self, account_number: String) -> Result<bool> {
        let Some(name) = self.prompt("Enter account holder's name: ")? else {
            return Ok(false);
        };
        let Some(initial_balance) = self.prompt_amount("Enter initial balance: ")? else {
            return Ok(true);
        };

        match self
            .store
            .create_account(&account_number, &name, initial_balance)
        {
            Ok(account) => {
                log::info!("Account {} created", account.account_number());
                writeln!(
                    self.output,
                    "Account for {name} created successfully with account number: {account_number}"
                )?;
            }
            Err(LedgerError::Account(AccountOperationError::InvalidAmount)) => {
                writeln!(self.output, "Invalid initial balance")?
            }
            Err(e) => self.report(&e)?,
        }
        Ok(true)
    }

    fn move_money(&mut self, choice: MenuChoice, account_number: &str) -> Result<bool> {
        let Some(mut account) = self.load(account_number)? else {
            return Ok(true);
        };

        let (label, verb) = match choice {
            MenuChoice::Deposit => ("Enter deposit amount: ", "deposited"),
            _ => ("Enter withdrawal amount: ", "withdrawn"),
        };
        let Some(amount) = self.prompt_amount(label)? else {
            return Ok(true);
        };

        let res = match choice {
            MenuChoice::Deposit => account.deposit(amount),
            _ => account.withdraw(amount),
        };
        match res {
            Ok(balance) => writeln!(
                self.output,
                "{amount} has been {verb}. New balance: {balance}"
            )?,
            Err(e) => self.report(&LedgerError::from(e))?,
        }

        // The snapshot replaces the cached copy; the table keeps its balance.
        self.store.cache_account(account);
        Ok(true)
    }

    fn load(&mut self, account_number: &str) -> Result<Option<Account>> {
        match self.store.load_account(account_number) {
            Ok(account) => Ok(Some(account)),
            Err(e) => {
                self.report(&e)?;
                Ok(None)
            }
        }
    }

    fn report(&mut self, err: &LedgerError) -> Result<()> {
        match err {
            LedgerError::AccountAlreadyExists(_) => {
                writeln!(self.output, "Account number already exists!")?
            }
            LedgerError::AccountNotFound(_) => writeln!(self.output, "Account not found!")?,
            LedgerError::Account(e) => writeln!(self.output, "{e}")?,
            LedgerError::Storage(e) => {
                log::warn!("Storage failure: {e}");
                writeln!(self.output, "Error: {e}")?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryTable;

    fn run_script(store: &mut LedgerStore<MemoryTable>, script: &str) -> String {
        let mut out = Vec::new();
        run(store, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_that_menu_choices_map_to_actions() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Create));
        assert_eq!(MenuChoice::parse("7"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("8"), None);
        assert_eq!(MenuChoice::parse("exit"), None);
    }

    #[test]
    fn test_create_and_check_balance() {
        let mut store = LedgerStore::with_table(MemoryTable::new());

        let out = run_script(&mut store, "1\n001\nAlice\n100\n4\n001\n7\n");

        assert!(out.contains("Account for Alice created successfully with account number: 001"));
        assert!(out.contains("Account Balance: 100.00"));
        assert!(out.ends_with("Exiting...\n"));
    }

    #[test]
    fn test_deposit_reports_new_balance_but_table_keeps_old_one() {
        let mut store = LedgerStore::with_table(MemoryTable::new());

        let out = run_script(&mut store, "1\n001\nAlice\n100\n2\n001\n50\n4\n001\n");

        assert!(out.contains("50.00 has been deposited. New balance: 150.00"));
        assert!(out.contains("Account Balance: 100.00"));
        assert_eq!(
            store.cached_account("001").unwrap().check_balance(),
            "150".parse::<Amount>().unwrap()
        );
    }

    #[test]
    fn test_rejected_operations_print_messages() {
        let mut store = LedgerStore::with_table(MemoryTable::new());

        let out = run_script(
            &mut store,
            "1\n001\nAlice\n50\n1\n001\nBob\n1\n3\n001\n100\n2\n001\n-5\n2\n001\nabc\n4\n999\n6\n999\n9\n7\n",
        );

        assert!(out.contains("Account number already exists!"));
        assert!(out.contains("Insufficient balance or invalid amount"));
        assert!(out.contains("Invalid deposit amount"));
        assert!(out.contains("Invalid amount\n"));
        assert_eq!(out.matches("Account not found!").count(), 2);
        assert!(out.contains("Invalid choice! Please try again."));
    }

    #[test]
    fn test_negative_initial_balance_is_refused() {
        let mut store = LedgerStore::with_table(MemoryTable::new());

        let out = run_script(&mut store, "1\n001\nAlice\n-10\n7\n");

        assert!(out.contains("Invalid initial balance"));
        assert!(store.table().is_empty());
    }

    #[test]
    fn test_history_of_fresh_snapshot_is_empty() {
        let mut store = LedgerStore::with_table(MemoryTable::new());

        let out = run_script(&mut store, "1\n001\nAlice\n10\n2\n001\n5\n5\n001\n7\n");

        let history = out.split("Transaction History:\n").nth(1).unwrap();
        assert!(history.starts_with('\n'), "history should list nothing: {history:?}");
    }

    #[test]
    fn test_delete_account() {
        let mut store = LedgerStore::with_table(MemoryTable::new());

        let out = run_script(&mut store, "1\n001\nAlice\n10\n6\n001\n4\n001\n7\n");

        assert!(out.contains("Account number 001 has been deleted."));
        assert!(out.contains("Account not found!"));
        assert!(store.table().is_empty());
    }

    #[test]
    fn test_end_of_input_stops_session() {
        let mut store = LedgerStore::with_table(MemoryTable::new());

        let out = run_script(&mut store, "1\n001\n");

        assert!(out.ends_with("Enter account holder's name: "));
        assert!(store.table().is_empty());
    }
}
