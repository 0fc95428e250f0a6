//! The terminal artifact of a reconciliation run: the summary and
//! invalid-document sheets.

use crate::model::Amount;
use crate::sanitize::sanitize;
use serde::{Deserialize, Serialize};

/// Name of the per-account summary sheet.
pub const SUMMARY_SHEET: &str = "Resumo";

/// Name of the malformed-document sheet.
pub const INVALID_DOCS_SHEET: &str = "Docs Inválidos";

const SUMMARY_HEADERS: [&str; 5] = ["Conta", "Nome", "Banco", "PHC", "Diferença"];
const INVALID_DOC_HEADERS: [&str; 3] = ["Conta", "Nº", "Documento"];

/// One reconciliation line per account: the two independently-sourced
/// totals and their difference, all rounded to two decimal places.
/// Produced fresh per run, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SummaryRow {
    /// Account code, e.g. `120501`.
    pub account: String,
    /// Bank-sheet nickname, e.g. `BIC`.
    pub name: String,
    /// Sum of the bank sheet's value column.
    pub bank_total: Amount,
    /// Sum of the signed PHC movement values.
    pub ledger_total: Amount,
    /// `bank_total - ledger_total`.
    pub difference: Amount,
}

/// One row per ledger movement whose document reference failed validation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InvalidDocRow {
    /// Account code, sanitized.
    pub account: String,
    /// Sequence number, sanitized; empty when the row has none.
    pub number: String,
    /// The sanitized document reference that failed validation.
    pub document: String,
}

/// The combined output of one monthly run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconciliationReport {
    pub month: u32,
    pub year: i32,
    /// One row per configured account, in configuration order.
    pub summary: Vec<SummaryRow>,
    /// Malformed documents, in collection order.
    pub invalid_docs: Vec<InvalidDocRow>,
}

impl ReconciliationReport {
    /// Renders the "Resumo" sheet: a header row followed by one row per
    /// account with totals in plain two-decimal form.
    pub fn summary_grid(&self) -> Vec<Vec<String>> {
        let mut grid = vec![SUMMARY_HEADERS.iter().map(|s| s.to_string()).collect()];
        for row in &self.summary {
            grid.push(vec![
                sanitize(&row.account),
                sanitize(&row.name),
                row.bank_total.to_cell(),
                row.ledger_total.to_cell(),
                row.difference.to_cell(),
            ]);
        }
        grid
    }

    /// Renders the "Docs Inválidos" sheet.
    pub fn invalid_docs_grid(&self) -> Vec<Vec<String>> {
        let mut grid = vec![INVALID_DOC_HEADERS.iter().map(|s| s.to_string()).collect()];
        for row in &self.invalid_docs {
            grid.push(vec![
                sanitize(&row.account),
                sanitize(&row.number),
                sanitize(&row.document),
            ]);
        }
        grid
    }
}
