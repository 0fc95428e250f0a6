//! Scans fetched ledger rows for malformed document references.

use crate::config::BankCode;
use crate::document::DocumentPolicy;
use crate::model::{InvalidDocRow, LedgerRow};
use crate::sanitize::sanitize;
use std::collections::HashMap;
use tracing::debug;

/// Emits one [`InvalidDocRow`] for every ledger row whose sanitized
/// document reference fails validation.
///
/// Accounts are visited in the bank-code table's order; accounts absent
/// from the table (or with no fetched rows) are skipped silently. Within an
/// account, input row order is preserved. Rows whose document sanitizes to
/// an empty string have nothing to validate and are skipped.
pub(crate) fn collect_invalid(
    bank_codes: &[BankCode],
    policy: DocumentPolicy,
    rows_by_account: &HashMap<String, Vec<LedgerRow>>,
    month: u32,
    year: i32,
) -> Vec<InvalidDocRow> {
    let mut invalid = Vec::new();
    for bank_code in bank_codes {
        let Some(rows) = rows_by_account.get(bank_code.account()) else {
            continue;
        };
        for row in rows {
            let document = sanitize(&row.document);
            if document.is_empty() {
                continue;
            }
            if !policy.is_valid(&document, year, month, bank_code.code()) {
                invalid.push(InvalidDocRow {
                    account: sanitize(bank_code.account()),
                    number: sanitize(row.number.as_deref().unwrap_or_default()),
                    document,
                });
            }
        }
    }
    debug!("Collected {} invalid documents", invalid.len());
    invalid
}
