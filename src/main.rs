use anyhow::{Context, Result};
use banking_system::{LedgerStore, menu};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::env;
use std::io;
use std::path::PathBuf;

const DEFAULT_TABLE_PATH: &str = "banking_system.csv";

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    log::debug!("Application started");

    let path = table_path();
    log::debug!("Opening accounts table at {path:?}");
    let mut store = LedgerStore::open(&path)
        .with_context(|| format!("cannot open accounts table {path:?}"))?;

    let stdin = io::stdin();
    menu::run(&mut store, stdin.lock(), io::stdout())?;

    store.close()?;
    log::debug!("Application finished");

    Ok(())
}

fn table_path() -> PathBuf {
    match env::args_os().nth(1) {
        None => PathBuf::from(DEFAULT_TABLE_PATH),
        Some(path) => PathBuf::from(path),
    }
}
