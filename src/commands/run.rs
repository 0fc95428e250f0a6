use crate::api::Mode;
use crate::commands::Out;
use crate::model::{ReconciliationReport, INVALID_DOCS_SHEET, SUMMARY_SHEET};
use crate::recon::Reconciler;
use crate::{api, utils, Config, Result};
use anyhow::Context;
use tracing::{error, info, warn};

/// Runs one monthly reconciliation and writes the report workbook.
pub async fn run(
    config: Config,
    mode: Mode,
    month: u32,
    year: i32,
) -> Result<Out<ReconciliationReport>> {
    let ledger = api::ledger(&config, mode).await?;
    let banks = api::bank_workbook(&config, month, mode);
    let reconciler = Reconciler::new(config.clone(), ledger, banks);
    let report = reconciler.run(month, year).await?;

    let mut destination = api::report_workbook(&config, month, mode)?;
    if let Err(e) = write_report(destination.as_mut(), &report).await {
        // The report is already computed; dump it to the log before
        // surfacing the write failure so the data is not lost.
        error!("Failed to write the report workbook: {e:#}");
        if let Ok(json) = serde_json::to_string_pretty(&report) {
            info!("Computed report for {month:02}/{year}:\n{json}");
        }
        if mode == Mode::Production {
            remove_partial_report(&config, month).await;
        }
        return Err(e);
    }

    let month_name = utils::month_name(month).unwrap_or_default();
    Ok(Out::new(
        format!(
            "Reconciliation for {month} - {month_name} {year} complete: {} accounts, \
             {} invalid documents",
            report.summary.len(),
            report.invalid_docs.len()
        ),
        report,
    ))
}

async fn write_report(
    destination: &mut (dyn crate::api::Workbook + Send + Sync),
    report: &ReconciliationReport,
) -> Result<()> {
    destination
        .write_grid(SUMMARY_SHEET, &report.summary_grid())
        .await
        .with_context(|| format!("Failed to write the '{SUMMARY_SHEET}' sheet"))?;
    destination
        .write_grid(INVALID_DOCS_SHEET, &report.invalid_docs_grid())
        .await
        .with_context(|| format!("Failed to write the '{INVALID_DOCS_SHEET}' sheet"))
}

/// Removes the report directory after a failed write so a half-written
/// workbook, e.g. "Resumo" without "Docs Inválidos", is never left in the
/// month folder.
async fn remove_partial_report(config: &Config, month: u32) {
    let Ok(dir) = config.report_dir(month) else {
        return;
    };
    if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
        warn!(
            "Failed to remove the partial report at '{}': {e:#}",
            dir.display()
        );
    }
}
