use clap::Parser;
use phc_recon::args::{Args, Command};
use phc_recon::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().recon_home().path();

    // This allows for testing the program without a ledger database or any
    // workbook files. When RECON_IN_TEST_MODE is set and non-zero in
    // length, the mode will be Mode::Test, otherwise Mode::Production.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(_) => commands::init(home).await?.print(),

        Command::Run(run_args) => {
            let config = Config::load(home).await?;
            commands::run(config, mode, run_args.month(), run_args.year())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(default_directives(level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Filter directives covering both the library targets (`phc_recon::*`,
/// where all the command and engine events originate) and the binary
/// target.
fn default_directives(level: LevelFilter) -> String {
    format!("phc_recon={level},{}={level}", env!("CARGO_BIN_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_library_and_binary_targets() {
        let directives = default_directives(LevelFilter::INFO);
        assert!(directives.contains(&format!("phc_recon={}", LevelFilter::INFO)));
        assert!(directives.contains(&format!("{}={}", env!("CARGO_BIN_NAME"), LevelFilter::INFO)));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
