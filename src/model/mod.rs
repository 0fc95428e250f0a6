//! Data model for the reconciliation pipeline.

mod amount;
mod ledger;
mod report;

pub use amount::{Amount, AmountError};
pub use ledger::LedgerRow;
pub use report::{
    InvalidDocRow, ReconciliationReport, SummaryRow, INVALID_DOCS_SHEET, SUMMARY_SHEET,
};
