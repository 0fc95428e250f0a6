use crate::api::SqliteLedger;
use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the recon home directory: default `config.json`, the `Bancos`
/// input directory and an empty ledger database.
pub async fn init(home: &Path) -> Result<Out<()>> {
    let config = Config::create(home).await?;
    let _ = SqliteLedger::init(config.sqlite_path()).await?;
    Ok(Out::new_message(format!(
        "Initialized recon home at '{}'. Edit '{}' to adjust the account bindings, \
         then place bank exports under '{}'.",
        config.root().display(),
        config.config_path().display(),
        config.banks_root().display(),
    )))
}
