//! Configuration file handling.
//!
//! The configuration file is stored at `$RECON_HOME/config.json`. It carries
//! the ordered account bindings, the per-bank value-column names, the
//! account-to-bank-code table used for document validation, and the document
//! validation policy. The defaults reproduce the nine production bank
//! accounts; tests and other deployments can load an alternate set.

use crate::document::DocumentPolicy;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "phc-recon";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const LEDGER_SQLITE: &str = "ledger.sqlite";
const BANKS_DIR: &str = "Bancos";

/// Associates a bank-sheet nickname with a PHC account code.
///
/// The order of bindings in the configuration is the order of rows in the
/// summary report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccountBinding {
    /// Bank-sheet tab nickname, e.g. `BIC`.
    nickname: String,
    /// PHC account code, e.g. `120501`.
    account: String,
}

impl AccountBinding {
    pub fn new(nickname: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            account: account.into(),
        }
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

/// Associates a PHC account code with the two-digit bank code embedded in
/// its document references. Distinct from the account code itself, and the
/// table covers accounts that have no sheet binding.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BankCode {
    account: String,
    code: String,
}

impl BankCode {
    pub fn new(account: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            code: code.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Runtime configuration: the home directory layout plus the loaded
/// `config.json` contents.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    sqlite_path: PathBuf,
    banks_root: PathBuf,
}

impl Config {
    /// Creates the home directory with a default `config.json` and the
    /// `Bancos` input directory.
    ///
    /// # Errors
    /// Returns an error if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the recon home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let banks_root = root.join(BANKS_DIR);
        utils::make_dir(&banks_root).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            sqlite_path: root.join(LEDGER_SQLITE),
            root,
            config_path,
            config_file,
            banks_root,
        })
    }

    /// Validates the home directory layout and loads `config.json`.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Recon home is missing, run 'recon init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display());
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let banks_root = root.join(BANKS_DIR);
        if !banks_root.is_dir() {
            bail!(
                "The banks directory is missing '{}'",
                banks_root.display()
            );
        }

        Ok(Self {
            sqlite_path: root.join(LEDGER_SQLITE),
            root,
            config_path,
            config_file,
            banks_root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// The ordered account bindings; binding order is report order.
    pub fn bindings(&self) -> &[AccountBinding] {
        &self.config_file.bindings
    }

    /// The header of the column holding monetary values in `nickname`'s
    /// sheet, if that nickname is known.
    pub fn value_column(&self, nickname: &str) -> Option<&str> {
        self.config_file
            .value_columns
            .get(nickname)
            .map(String::as_str)
    }

    /// The account-to-bank-code table, in its declared order.
    pub fn bank_codes(&self) -> &[BankCode] {
        &self.config_file.bank_codes
    }

    pub fn document_policy(&self) -> DocumentPolicy {
        self.config_file.document_policy
    }

    /// The root directory for bank sheet exports.
    pub fn banks_root(&self) -> &Path {
        &self.banks_root
    }

    /// The directory holding the month's bank sheet exports, one file per
    /// bank tab, e.g. `$RECON_HOME/Bancos/05 - Bancos/`.
    pub fn banks_dir(&self, month: u32) -> PathBuf {
        self.banks_root.join(format!("{month:02} - Bancos"))
    }

    /// The directory where the month's reconciliation report workbook is
    /// written, e.g. `$RECON_HOME/5 - Maio/Resumo Conciliação - 5 - Maio/`.
    pub fn report_dir(&self, month: u32) -> Result<PathBuf> {
        let name = utils::month_name(month)
            .with_context(|| format!("No month name for month number {month}"))?;
        Ok(self
            .root
            .join(format!("{month} - {name}"))
            .join(format!("Resumo Conciliação - {month} - {name}")))
    }

    /// Builds a config that does not touch the filesystem. Used by tests
    /// and by the in-memory mode.
    pub fn in_memory(root: impl Into<PathBuf>, config_file: ConfigFile) -> Self {
        let root = root.into();
        Self {
            config_path: root.join(CONFIG_JSON),
            sqlite_path: root.join(LEDGER_SQLITE),
            banks_root: root.join(BANKS_DIR),
            root,
            config_file,
        }
    }
}

/// The serialization format of `config.json`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfigFile {
    /// Application name, should always be "phc-recon".
    app_name: String,

    /// Configuration file version.
    config_version: u8,

    /// Ordered nickname-to-account bindings.
    bindings: Vec<AccountBinding>,

    /// Nickname to value-column header, per bank sheet layout.
    value_columns: BTreeMap<String, String>,

    /// Ordered account-to-bank-code table for document validation.
    bank_codes: Vec<BankCode>,

    /// Document reference validation policy.
    #[serde(default)]
    document_policy: DocumentPolicy,
}

impl Default for ConfigFile {
    /// The nine production accounts and the document-format code table.
    fn default() -> Self {
        let bindings = vec![
            AccountBinding::new("STD DO", "120101"),
            AccountBinding::new("STD CR", "120102"),
            AccountBinding::new("BCP DO", "120301"),
            AccountBinding::new("BCP 2", "120302"),
            AccountBinding::new("BCP 3", "120303"),
            AccountBinding::new("BCP 4", "120304"),
            AccountBinding::new("Montepio", "120401"),
            AccountBinding::new("BIC", "120501"),
            AccountBinding::new("CGD", "120601"),
        ];
        let value_columns: BTreeMap<String, String> = [
            ("STD DO", "Montante"),
            ("STD CR", "Montante"),
            ("BCP DO", "Valor"),
            ("BCP 2", "Valor"),
            ("BCP 3", "Valor"),
            ("BCP 4", "Valor"),
            ("Montepio", "IMPORTÂNCIA"),
            ("BIC", "Valor"),
            // The CGD export really does have a trailing space in its header.
            ("CGD", "Montante "),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let bank_codes = vec![
            BankCode::new("120101", "01"),
            BankCode::new("120102", "02"),
            BankCode::new("120103", "03"),
            BankCode::new("120301", "04"),
            BankCode::new("120302", "05"),
            BankCode::new("120401", "06"),
            BankCode::new("120201", "07"),
            BankCode::new("120601", "08"),
            BankCode::new("120501", "09"),
            BankCode::new("120303", "12"),
            BankCode::new("120304", "13"),
        ];
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            bindings,
            value_columns,
            bank_codes,
            document_policy: DocumentPolicy::default(),
        }
    }
}

impl ConfigFile {
    /// Builds a ConfigFile with alternate tables. Binding order is
    /// preserved as given.
    pub fn new(
        bindings: Vec<AccountBinding>,
        value_columns: BTreeMap<String, String>,
        bank_codes: Vec<BankCode>,
        document_policy: DocumentPolicy,
    ) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            bindings,
            value_columns,
            bank_codes,
            document_policy,
        }
    }

    /// Loads a ConfigFile from `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it was
    /// not written by this application.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    /// Saves the ConfigFile to `path`.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_tables() {
        let file = ConfigFile::default();
        assert_eq!(file.bindings.len(), 9);
        assert_eq!(file.bindings[0].nickname(), "STD DO");
        assert_eq!(file.bindings[8].account(), "120601");
        assert_eq!(file.bank_codes.len(), 11);
        assert_eq!(file.value_columns.get("CGD").unwrap(), "Montante ");
        assert!(!file.document_policy.enforce_length);
    }

    #[test]
    fn test_every_binding_has_a_bank_code() {
        let file = ConfigFile::default();
        for binding in &file.bindings {
            assert!(
                file.bank_codes
                    .iter()
                    .any(|bc| bc.account() == binding.account()),
                "binding {} has no bank code",
                binding.nickname()
            );
        }
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("recon_home");
        let created = Config::create(&home).await.unwrap();
        assert!(created.config_path().is_file());
        assert!(created.banks_dir(5).starts_with(created.root()));

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.bindings().len(), 9);
        assert_eq!(loaded.value_column("BIC"), Some("Valor"));
        assert_eq!(loaded.value_column("Unknown"), None);
    }

    #[tokio::test]
    async fn test_create_refuses_existing_config() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("recon_home");
        Config::create(&home).await.unwrap();
        assert!(Config::create(&home).await.is_err());
    }

    #[tokio::test]
    async fn test_load_rejects_foreign_config() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        Config::create(&home).await.unwrap();
        let mut file = ConfigFile::default();
        file.app_name = "something-else".to_string();
        file.save(home.join(CONFIG_JSON)).await.unwrap();
        let result = Config::load(&home).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid app_name"));
    }

    #[test]
    fn test_report_dir_uses_month_name() {
        let config = Config::in_memory("/tmp/recon", ConfigFile::default());
        let dir = config.report_dir(5).unwrap();
        assert!(dir.ends_with("5 - Maio/Resumo Conciliação - 5 - Maio"));
        assert!(config.report_dir(13).is_err());
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let original = ConfigFile::default();
        original.save(&path).await.unwrap();
        let loaded = ConfigFile::load(&path).await.unwrap();
        assert_eq!(original, loaded);
    }
}
