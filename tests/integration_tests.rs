use banking_system::engine::{AccountOperationError, StorageError};
use banking_system::{Amount, LedgerError, LedgerStore};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

fn scratch_table() -> PathBuf {
    let n = NEXT_FILE.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "banking_system_it_{}_{n}.csv",
        std::process::id()
    ));
    let _ = fs::remove_file(&path);
    path
}

fn amount(s: &str) -> Amount {
    s.parse().unwrap()
}

#[test]
fn test_durable_balance_is_not_updated_by_deposit() {
    let path = scratch_table();
    let mut store = LedgerStore::open(&path).unwrap();
    store.create_account("001", "Alice", amount("100.0")).unwrap();

    let mut loaded = store.load_account("001").unwrap();
    loaded.deposit(amount("50")).unwrap();
    assert_eq!(loaded.check_balance(), amount("150.0"));
    store.cache_account(loaded);

    assert_eq!(
        store.load_account("001").unwrap().check_balance(),
        amount("100.0")
    );
    store.close().unwrap();

    // Still true for a later session reading the same file.
    let store = LedgerStore::open(&path).unwrap();
    assert_eq!(
        store.load_account("001").unwrap().check_balance(),
        amount("100.0")
    );
    drop(store);
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_overdraft_keeps_balance() {
    let path = scratch_table();
    let mut store = LedgerStore::open(&path).unwrap();
    store.create_account("002", "Bob", amount("50")).unwrap();

    let mut loaded = store.load_account("002").unwrap();
    let res = loaded.withdraw(amount("100"));

    assert_eq!(
        res,
        Err(AccountOperationError::InsufficientFundsOrInvalidAmount)
    );
    assert_eq!(loaded.check_balance(), amount("50"));
    drop(store);
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_accounts_from_previous_session_are_not_in_memory() {
    let path = scratch_table();
    let mut store = LedgerStore::open(&path).unwrap();
    store.create_account("001", "Alice", amount("10")).unwrap();
    store.close().unwrap();

    let mut store = LedgerStore::open(&path).unwrap();
    assert!(matches!(
        store.delete_account("001"),
        Err(LedgerError::AccountNotFound(_))
    ));
    assert!(matches!(
        store.create_account("001", "Alice again", amount("1")),
        Err(LedgerError::Storage(StorageError::DuplicateKey(_)))
    ));
    assert_eq!(store.load_account("001").unwrap().name, "Alice");

    drop(store);
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_account_number_with_surrounding_spaces_round_trips() {
    let path = scratch_table();
    let mut store = LedgerStore::open(&path).unwrap();
    store.create_account(" 001", "  Alice ", amount("100")).unwrap();

    let loaded = store.load_account(" 001").unwrap();
    assert_eq!(loaded.account_number(), " 001");
    assert_eq!(loaded.name, "  Alice ");
    assert_eq!(loaded.check_balance(), amount("100"));

    store.delete_account(" 001").unwrap();
    assert!(matches!(
        store.load_account(" 001"),
        Err(LedgerError::AccountNotFound(_))
    ));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "account_number,name,balance\n"
    );

    drop(store);
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_binary_session_persists_created_accounts() {
    let path = scratch_table();

    let mut child = Command::new(env!("CARGO_BIN_EXE_banking_system"))
        .arg(&path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start banking_system");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"1\n001\nAlice\n100\n2\n001\n50\n4\n001\n7\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Account for Alice created successfully with account number: 001"));
    assert!(stdout.contains("50.00 has been deposited. New balance: 150.00"));
    assert!(stdout.contains("Account Balance: 100.00"));

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "account_number,name,balance\n001,Alice,100.00\n"
    );
    fs::remove_file(&path).unwrap();
}
