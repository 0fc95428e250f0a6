//! The reconciliation pipeline: fetch, aggregate, validate, assemble.

mod invalid;
mod summary;

use crate::api::{Ledger, Workbook};
use crate::model::{LedgerRow, ReconciliationReport};
use crate::{Config, Result};
use anyhow::bail;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Drives one monthly reconciliation run over the configured accounts.
///
/// Each run operates on its own freshly-fetched snapshot; nothing is shared
/// across runs. Per-account failures degrade to safe defaults so one bad
/// account or sheet never aborts the month.
pub struct Reconciler {
    config: Config,
    ledger: Box<dyn Ledger + Send + Sync>,
    banks: Box<dyn Workbook + Send + Sync>,
}

impl Reconciler {
    pub fn new(
        config: Config,
        ledger: Box<dyn Ledger + Send + Sync>,
        banks: Box<dyn Workbook + Send + Sync>,
    ) -> Self {
        Self {
            config,
            ledger,
            banks,
        }
    }

    /// Produces the combined report for one month.
    ///
    /// # Errors
    /// Only a month outside 1-12 is an error. A failed ledger fetch is
    /// treated as an account with no rows and a missing bank sheet as a
    /// zero total; both are logged at WARN so backend outages remain
    /// visible in the operations log.
    pub async fn run(&self, month: u32, year: i32) -> Result<ReconciliationReport> {
        if !(1..=12).contains(&month) {
            bail!("The month must be between 1 and 12, got {month}");
        }
        debug!(
            "Reconciling {} accounts for {month:02}/{year}",
            self.config.bindings().len()
        );

        let rows_by_account = self.fetch_ledger_rows(month, year).await;

        let mut summary = Vec::with_capacity(self.config.bindings().len());
        for binding in self.config.bindings() {
            let grid = match self.banks.read_grid(binding.nickname()).await {
                Ok(grid) => grid,
                Err(e) => {
                    warn!(
                        "Failed to read sheet '{}', treating it as absent: {e:#}",
                        binding.nickname()
                    );
                    None
                }
            };
            let rows = rows_by_account
                .get(binding.account())
                .map(Vec::as_slice)
                .unwrap_or_default();
            summary.push(summary::aggregate(
                binding,
                self.config.value_column(binding.nickname()),
                grid.as_deref(),
                rows,
            ));
        }

        let invalid_docs = invalid::collect_invalid(
            self.config.bank_codes(),
            self.config.document_policy(),
            &rows_by_account,
            month,
            year,
        );

        Ok(ReconciliationReport {
            month,
            year,
            summary,
            invalid_docs,
        })
    }

    /// Fetches the month's movements for every bound account. A failed
    /// fetch leaves the account without rows rather than aborting the run.
    async fn fetch_ledger_rows(&self, month: u32, year: i32) -> HashMap<String, Vec<LedgerRow>> {
        let mut rows_by_account = HashMap::new();
        for binding in self.config.bindings() {
            match self.ledger.fetch_rows(binding.account(), month, year).await {
                Ok(rows) => {
                    rows_by_account.insert(binding.account().to_string(), rows);
                }
                Err(e) => {
                    warn!(
                        "Ledger fetch failed for account {}, treating it as empty: {e:#}",
                        binding.account()
                    );
                }
            }
        }
        rows_by_account
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestLedger, TestWorkbook};
    use crate::config::{AccountBinding, BankCode, ConfigFile};
    use crate::document::DocumentPolicy;
    use crate::model::{Amount, LedgerRow};
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn config() -> Config {
        let bindings = vec![
            AccountBinding::new("BIC", "120501"),
            AccountBinding::new("CGD", "120601"),
        ];
        let value_columns: BTreeMap<String, String> = [
            ("BIC".to_string(), "Valor".to_string()),
            ("CGD".to_string(), "Montante ".to_string()),
        ]
        .into_iter()
        .collect();
        let bank_codes = vec![
            BankCode::new("120501", "09"),
            BankCode::new("120601", "08"),
        ];
        Config::in_memory(
            "/tmp/recon-test",
            ConfigFile::new(
                bindings,
                value_columns,
                bank_codes,
                DocumentPolicy::default(),
            ),
        )
    }

    fn ledger_row(account: &str, document: &str, value: &str) -> LedgerRow {
        LedgerRow {
            account: account.to_string(),
            number: Some("1".to_string()),
            document: document.to_string(),
            value: Amount::from_str(value).unwrap(),
            ..LedgerRow::default()
        }
    }

    fn bank_grid(column: &str, values: &[&str]) -> Vec<Vec<String>> {
        let mut grid = vec![vec!["Data".to_string(), column.to_string()]];
        for v in values {
            grid.push(vec!["02/05/2024".to_string(), v.to_string()]);
        }
        grid
    }

    fn reconciler(ledger: TestLedger, banks: TestWorkbook) -> Reconciler {
        Reconciler::new(config(), Box::new(ledger), Box::new(banks))
    }

    #[tokio::test]
    async fn test_invalid_month_is_an_error() {
        let r = reconciler(TestLedger::new(HashMap::new()), TestWorkbook::empty());
        assert!(r.run(0, 2024).await.is_err());
        assert!(r.run(13, 2024).await.is_err());
    }

    #[tokio::test]
    async fn test_balanced_end_to_end() {
        let mut rows = HashMap::new();
        rows.insert(
            "120501".to_string(),
            vec![
                ledger_row("120501", "B2405090001", "100"),
                ledger_row("120501", "B2405090002", "-50"),
                ledger_row("120501", "B2405090003", "25"),
            ],
        );
        let mut sheets = HashMap::new();
        sheets.insert("BIC".to_string(), bank_grid("Valor", &["100", "-50", "25"]));
        let r = reconciler(TestLedger::new(rows), TestWorkbook::new(sheets));

        let report = r.run(5, 2024).await.unwrap();
        assert_eq!(report.summary.len(), 2);
        let bic = &report.summary[0];
        assert_eq!(bic.account, "120501");
        assert_eq!(bic.bank_total.to_cell(), "75.00");
        assert_eq!(bic.ledger_total.to_cell(), "75.00");
        assert_eq!(bic.difference.to_cell(), "0.00");
        assert!(report.invalid_docs.is_empty());
        // CGD has no sheet and no rows: all-zero row, run still completes
        let cgd = &report.summary[1];
        assert_eq!(cgd.bank_total.to_cell(), "0.00");
        assert_eq!(cgd.ledger_total.to_cell(), "0.00");
    }

    #[tokio::test]
    async fn test_wrong_bank_code_appears_in_invalid_docs() {
        let mut rows = HashMap::new();
        // the code table expects 09 for this account, the document says 01
        rows.insert(
            "120501".to_string(),
            vec![ledger_row("120501", "B2412010042", "10")],
        );
        let r = reconciler(TestLedger::new(rows), TestWorkbook::empty());

        let report = r.run(12, 2024).await.unwrap();
        assert_eq!(report.invalid_docs.len(), 1);
        assert_eq!(report.invalid_docs[0].document, "B2412010042");
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty() {
        let mut rows = HashMap::new();
        rows.insert(
            "120601".to_string(),
            vec![ledger_row("120601", "B2405080001", "200")],
        );
        let mut ledger = TestLedger::new(rows);
        ledger.fail_accounts.insert("120501".to_string());
        let mut sheets = HashMap::new();
        sheets.insert("BIC".to_string(), bank_grid("Valor", &["30"]));
        let r = reconciler(ledger, TestWorkbook::new(sheets));

        let report = r.run(5, 2024).await.unwrap();
        let bic = &report.summary[0];
        assert_eq!(bic.bank_total.to_cell(), "30.00");
        assert_eq!(bic.ledger_total.to_cell(), "0.00");
        assert_eq!(bic.difference.to_cell(), "30.00");
        // the failing account contributes nothing to the invalid list
        assert!(report.invalid_docs.is_empty());
    }

    #[tokio::test]
    async fn test_unbound_sheet_contributes_nothing() {
        let mut sheets = HashMap::new();
        sheets.insert("Desconhecido".to_string(), bank_grid("Valor", &["999"]));
        let r = reconciler(TestLedger::new(HashMap::new()), TestWorkbook::new(sheets));

        let report = r.run(5, 2024).await.unwrap();
        assert_eq!(report.summary.len(), 2);
        assert!(report.summary.iter().all(|s| s.bank_total.is_zero()));
    }

    #[tokio::test]
    async fn test_report_rows_follow_binding_order() {
        let r = reconciler(TestLedger::new(HashMap::new()), TestWorkbook::empty());
        let report = r.run(5, 2024).await.unwrap();
        let names: Vec<&str> = report.summary.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["BIC", "CGD"]);
    }

    #[tokio::test]
    async fn test_default_seed_data_reconciles() {
        let r = Reconciler::new(
            config(),
            Box::new(TestLedger::default()),
            Box::new(TestWorkbook::default()),
        );

        let report = r.run(5, 2024).await.unwrap();
        let bic = &report.summary[0];
        assert_eq!(bic.bank_total.to_cell(), "75.00");
        assert_eq!(bic.ledger_total.to_cell(), "75.00");
        // the seed contains one document with the wrong bank code
        assert_eq!(report.invalid_docs.len(), 1);
        assert_eq!(report.invalid_docs[0].document, "B2405080003");
    }
}
