//! In-memory `Ledger` and `Workbook` implementations.
//!
//! Note: these are compiled even in the "production" build so that the whole
//! program can run, top-to-bottom, without a ledger database or workbook
//! files. Set `RECON_IN_TEST_MODE` to select them.

use crate::api::csv_book::parse_csv;
use crate::api::{Ledger, Workbook};
use crate::model::{Amount, LedgerRow};
use crate::Result;
use anyhow::bail;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// A `Ledger` holding rows in memory, keyed by account code.
///
/// Seed rows are returned for any requested month; accounts with no entry
/// yield an empty result. Accounts listed in `fail_accounts` make the fetch
/// fail, for exercising the degrade-to-empty path.
pub(crate) struct TestLedger {
    pub(crate) rows: HashMap<String, Vec<LedgerRow>>,
    pub(crate) fail_accounts: HashSet<String>,
}

impl TestLedger {
    pub(crate) fn new(rows: HashMap<String, Vec<LedgerRow>>) -> Self {
        Self {
            rows,
            fail_accounts: HashSet::new(),
        }
    }
}

#[async_trait::async_trait]
impl Ledger for TestLedger {
    async fn fetch_rows(&self, account: &str, _month: u32, _year: i32) -> Result<Vec<LedgerRow>> {
        if self.fail_accounts.contains(account) {
            bail!("Simulated ledger backend failure for account {account}");
        }
        Ok(self.rows.get(account).cloned().unwrap_or_default())
    }
}

impl Default for TestLedger {
    /// Seed movements for the BIC and CGD accounts, May 2024. One BIC row
    /// carries a document with the wrong bank code so a default run shows
    /// an invalid-document entry.
    fn default() -> Self {
        let mut rows = HashMap::new();
        rows.insert(
            "120501".to_string(),
            vec![
                seed_row("02/05/2024", "120501", "1", "B2405090001", "100", "0"),
                seed_row("10/05/2024", "120501", "2", "B2405090002", "0", "50"),
                seed_row("17/05/2024", "120501", "3", "B2405080003", "25", "0"),
            ],
        );
        rows.insert(
            "120601".to_string(),
            vec![seed_row(
                "21/05/2024",
                "120601",
                "1",
                "B2405080001",
                "200",
                "0",
            )],
        );
        Self::new(rows)
    }
}

fn seed_row(
    date: &str,
    account: &str,
    number: &str,
    document: &str,
    debit: &str,
    credit: &str,
) -> LedgerRow {
    LedgerRow {
        date: date.to_string(),
        diary: "Banco".to_string(),
        number: Some(number.to_string()),
        document: document.to_string(),
        description: "Seed movement".to_string(),
        debit: Amount::from_str(debit).unwrap_or_default(),
        credit: Amount::from_str(credit).unwrap_or_default(),
        account: account.to_string(),
        account_name: format!("Conta {account}"),
        ..LedgerRow::default()
    }
    .with_derived_values()
}

/// A `Workbook` holding sheets in memory. The map key is the sheet name and
/// the value is the sheet's grid.
pub(crate) struct TestWorkbook {
    pub(crate) sheets: HashMap<String, Vec<Vec<String>>>,
    pub(crate) fail_writes: bool,
}

impl TestWorkbook {
    pub(crate) fn new(sheets: HashMap<String, Vec<Vec<String>>>) -> Self {
        Self {
            sheets,
            fail_writes: false,
        }
    }

    /// A workbook with no sheets, for collecting written output.
    pub(crate) fn empty() -> Self {
        Self::new(HashMap::new())
    }
}

#[async_trait::async_trait]
impl Workbook for TestWorkbook {
    async fn read_grid(&self, sheet: &str) -> Result<Option<Vec<Vec<String>>>> {
        Ok(self.sheets.get(sheet).cloned())
    }

    async fn write_grid(&mut self, sheet: &str, grid: &[Vec<String>]) -> Result<()> {
        if self.fail_writes {
            bail!("Simulated workbook write failure for sheet '{sheet}'");
        }
        self.sheets.insert(sheet.to_string(), grid.to_vec());
        Ok(())
    }
}

impl Default for TestWorkbook {
    /// Loads the seed bank sheets from this module.
    fn default() -> Self {
        let mut sheets = HashMap::new();
        sheets.insert("BIC".to_string(), parse_csv(BIC_DATA).unwrap_or_default());
        sheets.insert("CGD".to_string(), parse_csv(CGD_DATA).unwrap_or_default());
        Self::new(sheets)
    }
}

/// Seed BIC sheet. Sums to 75 in the "Valor" column.
const BIC_DATA: &str = "Data,Descrição,Valor
02/05/2024,Transferência recebida,100
10/05/2024,Pagamento,-50
17/05/2024,Depósito,25
";

/// Seed CGD sheet. The value column header really is \"Montante \" with a
/// trailing space, matching the bank's export.
const CGD_DATA: &str = "Data,Descrição,\"Montante \"
21/05/2024,Transferência recebida,200
";

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ledger_unknown_account_is_empty() {
        let ledger = TestLedger::default();
        assert!(ledger.fetch_rows("999999", 5, 2024).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ledger_failure_injection() {
        let mut ledger = TestLedger::default();
        ledger.fail_accounts.insert("120501".to_string());
        assert!(ledger.fetch_rows("120501", 5, 2024).await.is_err());
    }

    #[tokio::test]
    async fn test_workbook_seed_sheets() {
        let book = TestWorkbook::default();
        let bic = book.read_grid("BIC").await.unwrap().unwrap();
        assert_eq!(bic[0], vec!["Data", "Descrição", "Valor"]);
        assert_eq!(bic.len(), 4);
        let cgd = book.read_grid("CGD").await.unwrap().unwrap();
        assert_eq!(cgd[0][2], "Montante ");
        assert!(book.read_grid("BCP DO").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_workbook_write_failure_injection() {
        let mut book = TestWorkbook::empty();
        book.fail_writes = true;
        assert!(book.write_grid("Resumo", &[]).await.is_err());
    }
}
