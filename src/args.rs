//! These structs provide the CLI interface for the recon CLI.

use chrono::Datelike;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// recon: reconciles monthly PHC ledger movements against bank exports.
///
/// For each configured bank account the program sums the month's movements
/// on both sides, reports the difference per account, and flags ledger rows
/// whose document references do not match the expected year/month/bank
/// encoding. The report is written as a workbook with "Resumo" and
/// "Docs Inválidos" sheets inside the month's folder.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the recon home directory with a default configuration.
    ///
    /// The generated config.json carries the nine production account
    /// bindings; edit it to adjust nicknames, value columns or the
    /// document policy before running a reconciliation.
    Init(InitArgs),
    /// Reconcile one month: compute totals, flag malformed documents and
    /// write the report workbook.
    Run(RunArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where recon data and configuration is held.
    /// Defaults to ~/phc-recon
    #[arg(long, env = "RECON_HOME", default_value_t = default_recon_home())]
    recon_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, recon_home: PathBuf) -> Self {
        Self {
            log_level,
            recon_home: recon_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn recon_home(&self) -> &DisplayPath {
        &self.recon_home
    }
}

/// Args for the `recon init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {}

/// Args for the `recon run` command.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// The month to reconcile, 1-12.
    month: u32,

    /// The fiscal year. Defaults to the current year.
    #[arg(long, default_value_t = default_year())]
    year: i32,
}

impl RunArgs {
    pub fn new(month: u32, year: i32) -> Self {
        Self { month, year }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

fn default_year() -> i32 {
    chrono::Local::now().year()
}

fn default_recon_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("phc-recon"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --recon-home or RECON_HOME instead of relying on the default \
                recon home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("phc-recon")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
