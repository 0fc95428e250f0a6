//! Per-account totals: the bank-sheet side, the PHC side and their
//! difference.

use crate::config::AccountBinding;
use crate::model::{Amount, LedgerRow, SummaryRow};
use tracing::warn;

/// Finds the index of the column whose header matches `column_name`
/// exactly, case- and whitespace-sensitive. First match wins.
pub(crate) fn resolve_value_column(header_row: &[String], column_name: &str) -> Option<usize> {
    header_row.iter().position(|cell| cell == column_name)
}

/// Computes one summary row for a bound account.
///
/// The bank total is the sum of the resolved value column below the header,
/// with unparseable cells coerced to zero. A missing sheet, an unconfigured
/// nickname or an unmatched header all degrade to a zero bank total with a
/// logged omission; they never fail the run. The ledger total is the sum of
/// signed movement values, zero when the account produced no rows.
pub(crate) fn aggregate(
    binding: &AccountBinding,
    value_column: Option<&str>,
    grid: Option<&[Vec<String>]>,
    rows: &[LedgerRow],
) -> SummaryRow {
    let bank_total = bank_total(binding.nickname(), value_column, grid).round_2dp();
    let ledger_total: Amount = rows.iter().map(|row| row.value).sum();
    let ledger_total = ledger_total.round_2dp();
    let difference = (bank_total - ledger_total).round_2dp();

    SummaryRow {
        account: binding.account().to_string(),
        name: binding.nickname().to_string(),
        bank_total,
        ledger_total,
        difference,
    }
}

fn bank_total(nickname: &str, value_column: Option<&str>, grid: Option<&[Vec<String>]>) -> Amount {
    let Some(grid) = grid else {
        warn!("Sheet '{nickname}' not found, using 0 for the bank total");
        return Amount::ZERO;
    };
    let Some(column_name) = value_column else {
        warn!("No value column configured for '{nickname}', using 0 for the bank total");
        return Amount::ZERO;
    };
    let Some(index) = grid
        .first()
        .and_then(|header| resolve_value_column(header, column_name))
    else {
        warn!("Column '{column_name}' not found for '{nickname}', using 0 for the bank total");
        return Amount::ZERO;
    };

    grid.iter()
        .skip(1)
        .map(|row| {
            row.get(index)
                .map(|cell| Amount::parse_lenient(cell))
                .unwrap_or_default()
        })
        .sum()
}
