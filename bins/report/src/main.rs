//! Tally balance report.
//!
//! Loads a group ledger file, records every transaction through the core
//! allocator and prints who owes whom.
//!
//! Usage: tally --file group.json [--config DIR] [--history]

mod ledger_file;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::ledger::LedgerError;
use tally_core::split::SplitError;
use tally_shared::{AppConfig, AppError, LogConfig};

use crate::ledger_file::LedgerFile;

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Compute balances for a shared-expense group")]
struct Cli {
    /// Ledger file (JSON).
    #[arg(long, short)]
    file: PathBuf,

    /// Directory holding `default` and `{RUN_MODE}` configuration files.
    #[arg(long, default_value = "config")]
    config: PathBuf,

    /// Also list each member's transactions, newest first.
    #[arg(long)]
    history: bool,
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (code, status) = failure(&err);
            eprintln!("error [{code}]: {err:#}");
            ExitCode::from(status)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = AppConfig::load_from(&cli.config)
        .map_err(AppError::from)
        .context("failed to load configuration")?;
    init_tracing(&config.log);

    let ledger = LedgerFile::read(&cli.file)?.into_ledger(&config.split)?;
    info!(
        group = %ledger.group().name,
        parties = ledger.parties().len(),
        transactions = ledger.transactions().len(),
        policy = ?config.split.remainder_policy,
        "ledger loaded"
    );

    print!("{}", report::balance_table(&ledger));
    if cli.history {
        print!("{}", report::history(&ledger));
    }

    Ok(())
}

/// The error code and exit status reported for a failed run.
///
/// Domain errors keep their own code; the exit status follows the
/// [`AppError`] category they convert into.
fn failure(err: &anyhow::Error) -> (&'static str, u8) {
    for cause in err.chain() {
        if let Some(ledger) = cause.downcast_ref::<LedgerError>() {
            return (ledger.error_code(), AppError::from(ledger.clone()).exit_code());
        }
        if let Some(split) = cause.downcast_ref::<SplitError>() {
            return (split.error_code(), AppError::from(split.clone()).exit_code());
        }
        if let Some(app) = cause.downcast_ref::<AppError>() {
            return (app.error_code(), app.exit_code());
        }
        if cause.is::<serde_json::Error>() {
            let invalid = AppError::Validation(cause.to_string());
            return (invalid.error_code(), invalid.exit_code());
        }
    }
    let internal = AppError::Internal(err.to_string());
    (internal.error_code(), internal.exit_code())
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if log.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
