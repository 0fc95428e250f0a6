//! CSV-directory workbook.
//!
//! A workbook is a directory; each sheet is a `<name>.csv` file inside it.
//! This stands in for the xlsx workbooks of the legacy process, which are
//! out of scope here.

use crate::api::Workbook;
use crate::{utils, Result};
use anyhow::Context;
use std::io::Cursor;
use std::path::PathBuf;

pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{sheet}.csv"))
    }
}

#[async_trait::async_trait]
impl Workbook for CsvWorkbook {
    async fn read_grid(&self, sheet: &str) -> Result<Option<Vec<Vec<String>>>> {
        let path = self.sheet_path(sheet);
        if !path.is_file() {
            return Ok(None);
        }
        let content = utils::read(&path).await?;
        let grid = parse_csv(&content)
            .with_context(|| format!("Failed to parse sheet file {}", path.display()))?;
        Ok(Some(grid))
    }

    async fn write_grid(&mut self, sheet: &str, grid: &[Vec<String>]) -> Result<()> {
        utils::make_dir(&self.dir).await?;
        let data = render_csv(grid).with_context(|| format!("Failed to render sheet {sheet}"))?;
        utils::write(self.sheet_path(sheet), data).await
    }
}

/// Parses CSV content into a grid. Rows may have differing lengths; the
/// header row is treated as data like any other row.
pub(crate) fn parse_csv(content: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(content.as_bytes()));
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

fn render_csv(grid: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in grid {
        writer.write_record(row)?;
    }
    writer.into_inner().context("Failed to flush CSV writer")
}
