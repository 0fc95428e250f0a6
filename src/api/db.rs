//! SQLite-backed ledger store.
//!
//! Stands in for the PHC backend: a local `movements` table mirrors the
//! columns of the PHC `ml` query, with dates stored in the `dd/mm/yyyy`
//! form PHC renders. The signed and absolute values are derived on read
//! rather than stored.

use crate::api::Ledger;
use crate::model::{Amount, LedgerRow};
use crate::Result;
use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS movements (
    date TEXT NOT NULL,
    diary TEXT NOT NULL DEFAULT '',
    number TEXT,
    document TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    debit TEXT NOT NULL DEFAULT '0',
    credit TEXT NOT NULL DEFAULT '0',
    cost_center TEXT NOT NULL DEFAULT '',
    account TEXT NOT NULL,
    account_name TEXT NOT NULL DEFAULT '',
    internal_id TEXT NOT NULL DEFAULT ''
)";

const SELECT_MONTH: &str = "SELECT date, diary, number, document, description, debit, credit, \
     cost_center, account, account_name, internal_id \
     FROM movements \
     WHERE account = ?1 AND substr(date, 7, 4) = ?2 AND substr(date, 4, 2) = ?3 \
     ORDER BY rowid";

const INSERT: &str = "INSERT INTO movements \
     (date, diary, number, document, description, debit, credit, cost_center, account, \
      account_name, internal_id) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

/// Implements the `Ledger` trait over a local SQLite file.
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Creates the SQLite file if needed and ensures the schema exists.
    pub async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connect(path.as_ref(), true).await?;
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .context("Failed to create the movements table")?;
        Ok(Self { pool })
    }

    /// Opens an existing SQLite file; errors if it does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!(
                "The ledger database is missing at '{}', run 'recon init' first",
                path.display()
            );
        }
        let pool = connect(path, false).await?;
        Ok(Self { pool })
    }

    /// Inserts one movement. `row.value` and `row.abs_value` are not
    /// stored; they are derived again on read.
    pub async fn insert(&self, row: &LedgerRow) -> Result<()> {
        sqlx::query(INSERT)
            .bind(&row.date)
            .bind(&row.diary)
            .bind(&row.number)
            .bind(&row.document)
            .bind(&row.description)
            .bind(row.debit.value().to_string())
            .bind(row.credit.value().to_string())
            .bind(&row.cost_center)
            .bind(&row.account)
            .bind(&row.account_name)
            .bind(&row.internal_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert movement for account {}", row.account))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Ledger for SqliteLedger {
    async fn fetch_rows(&self, account: &str, month: u32, year: i32) -> Result<Vec<LedgerRow>> {
        let rows = sqlx::query(SELECT_MONTH)
            .bind(account)
            .bind(format!("{year:04}"))
            .bind(format!("{month:02}"))
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch movements for account {account}"))?;
        debug!(
            "Fetched {} movements for account {account}, {month:02}/{year}",
            rows.len()
        );

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(map_row(&row)?);
        }
        Ok(result)
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerRow> {
    let debit: String = row.try_get("debit")?;
    let credit: String = row.try_get("credit")?;
    let ledger_row = LedgerRow {
        date: row.try_get("date")?,
        diary: row.try_get("diary")?,
        number: row.try_get("number")?,
        document: row.try_get("document")?,
        description: row.try_get("description")?,
        debit: parse_amount(&debit)?,
        credit: parse_amount(&credit)?,
        cost_center: row.try_get("cost_center")?,
        account: row.try_get("account")?,
        account_name: row.try_get("account_name")?,
        value: Amount::ZERO,
        abs_value: Amount::ZERO,
        internal_id: row.try_get("internal_id")?,
    };
    Ok(ledger_row.with_derived_values())
}

fn parse_amount(s: &str) -> Result<Amount> {
    Amount::from_str(s).with_context(|| format!("Malformed stored amount '{s}'"))
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .context("Failed to parse SQLite connection string")?
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
}
