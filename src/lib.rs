mod api;
pub mod args;
pub mod commands;
mod config;
mod document;
mod error;
pub mod model;
mod recon;
mod sanitize;
mod utils;

pub use api::{CsvWorkbook, Ledger, Mode, SqliteLedger, Workbook};
pub use config::{AccountBinding, BankCode, Config, ConfigFile};
pub use document::{DocumentPolicy, DOCUMENT_LEN};
pub use error::Error;
pub use error::Result;
pub use recon::Reconciler;
pub use sanitize::sanitize;
pub use utils::month_name;
