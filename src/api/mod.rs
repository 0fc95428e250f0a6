//! Collaborator seams: the PHC ledger backend and spreadsheet workbooks.
//!
//! The reconciliation engine only ever talks to these traits. Production
//! wiring uses a SQLite mirror of the PHC movements and CSV workbook
//! directories; test mode swaps both for in-memory implementations without
//! touching the engine.

mod csv_book;
mod db;
mod test_client;

use crate::model::LedgerRow;
use crate::{Config, Result};

pub use csv_book::CsvWorkbook;
pub use db::SqliteLedger;
pub(crate) use test_client::{TestLedger, TestWorkbook};

/// Environment variable that switches the program into in-memory test mode.
pub const IN_TEST_MODE: &str = "RECON_IN_TEST_MODE";

/// The PHC ledger: month-bounded movement queries per account.
#[async_trait::async_trait]
pub trait Ledger {
    /// Fetches all movements for `account` in the given month and year.
    async fn fetch_rows(&self, account: &str, month: u32, year: i32) -> Result<Vec<LedgerRow>>;
}

/// A workbook of named sheets holding raw string grids.
#[async_trait::async_trait]
pub trait Workbook {
    /// Reads a sheet as a row-major grid. `Ok(None)` means the sheet does
    /// not exist, which callers treat as degradable, not fatal.
    async fn read_grid(&self, sheet: &str) -> Result<Option<Vec<Vec<String>>>>;

    /// Writes a sheet, replacing any existing content.
    async fn write_grid(&mut self, sheet: &str, grid: &[Vec<String>]) -> Result<()>;
}

/// Selects between the production collaborators and the in-memory ones.
///
/// This allows running the whole program, top-to-bottom, without a ledger
/// database or any workbook files on disk.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    Production,
    Test,
}

impl Mode {
    /// `Test` when [`IN_TEST_MODE`] is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(IN_TEST_MODE) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Production,
        }
    }
}

/// Opens the ledger collaborator for `mode`.
pub async fn ledger(config: &Config, mode: Mode) -> Result<Box<dyn Ledger + Send + Sync>> {
    match mode {
        Mode::Production => Ok(Box::new(SqliteLedger::open(config.sqlite_path()).await?)),
        Mode::Test => Ok(Box::new(TestLedger::default())),
    }
}

/// Opens the month's bank-sheet workbook for `mode`.
pub fn bank_workbook(config: &Config, month: u32, mode: Mode) -> Box<dyn Workbook + Send + Sync> {
    match mode {
        Mode::Production => Box::new(CsvWorkbook::new(config.banks_dir(month))),
        Mode::Test => Box::new(TestWorkbook::default()),
    }
}

/// Opens the report destination workbook for `mode`.
pub fn report_workbook(
    config: &Config,
    month: u32,
    mode: Mode,
) -> Result<Box<dyn Workbook + Send + Sync>> {
    match mode {
        Mode::Production => Ok(Box::new(CsvWorkbook::new(config.report_dir(month)?))),
        Mode::Test => Ok(Box::new(TestWorkbook::empty())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_env() {
        // Serialized through a single test to avoid env races.
        std::env::remove_var(IN_TEST_MODE);
        assert_eq!(Mode::from_env(), Mode::Production);
        std::env::set_var(IN_TEST_MODE, "1");
        assert_eq!(Mode::from_env(), Mode::Test);
        std::env::set_var(IN_TEST_MODE, "");
        assert_eq!(Mode::from_env(), Mode::Production);
        std::env::remove_var(IN_TEST_MODE);
    }
}
