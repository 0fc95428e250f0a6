//! The PHC side of a reconciliation: one ledger movement per row.

use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// One movement from the PHC ledger, as returned by the ledger query for a
/// single account and month. Immutable once fetched.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LedgerRow {
    /// Movement date as PHC renders it, e.g. `17/05/2024`.
    pub date: String,
    /// Diary name ("Diário").
    pub diary: String,
    /// Sequence number within the diary ("Nº"). Absent for some rows.
    pub number: Option<String>,
    /// Document reference ("Documento").
    pub document: String,
    /// Free-text description ("Descrição").
    pub description: String,
    /// Debit amount ("Débito").
    pub debit: Amount,
    /// Credit amount ("Crédito").
    pub credit: Amount,
    /// Cost center ("Centro Custo").
    pub cost_center: String,
    /// Account code ("Conta"), e.g. `120501`.
    pub account: String,
    /// Account display name ("Nome Conta").
    pub account_name: String,
    /// Signed value: debit minus credit ("Valor").
    pub value: Amount,
    /// Absolute value of `value` ("ABS").
    pub abs_value: Amount,
    /// PHC internal row id ("Id Interna").
    pub internal_id: String,
}

impl LedgerRow {
    /// Recomputes the derived `value` and `abs_value` fields from debit and
    /// credit. Used when constructing rows by hand rather than from a query
    /// that already computes them.
    pub fn with_derived_values(mut self) -> Self {
        self.value = self.debit - self.credit;
        self.abs_value = if self.value.value().is_sign_negative() {
            Amount::ZERO - self.value
        } else {
            self.value
        };
        self
    }
}
