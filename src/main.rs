//! dvc-lsp binary.
//!
//! Runs the language server over stdio by default. The remaining subcommands
//! run a single DVC CLI query and print its result as JSON.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use dvc_lsp::cli::reader::DvcReader;
use dvc_lsp::cli::version::{CollectedWarnings, is_version_compatible};
use dvc_lsp::lsp::server::run_server;

#[derive(Parser, Debug)]
#[command(name = "dvc-lsp", version)]
#[command(about = "Language server for DVC pipeline files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the language server over stdio
    Serve,
    /// Check that the installed DVC CLI is supported
    CheckVersion(CliArgs),
    /// Print `dvc data status` for a project
    DataStatus(CliArgs),
    /// Print `dvc exp show` for a project
    ExpShow(CliArgs),
    /// Print every DVC-tracked path of a project
    List(CliArgs),
}

#[derive(Args, Debug)]
struct CliArgs {
    /// Project directory
    #[arg(long, value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Python interpreter to run `-m dvc` with
    #[arg(long, value_name = "PATH")]
    python_bin_path: Option<PathBuf>,

    /// dvc executable, takes precedence over the interpreter
    #[arg(long, value_name = "PATH")]
    cli_path: Option<PathBuf>,
}

impl CliArgs {
    fn reader(&self) -> DvcReader {
        DvcReader::new(self.python_bin_path.clone(), self.cli_path.clone())
    }

    fn cwd(&self) -> anyhow::Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().context("Failed to read current directory"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server().await,
        Command::CheckVersion(args) => {
            let (_guard, cancel) = start_query()?;
            check_version(&args, &cancel).await
        }
        Command::DataStatus(args) => {
            let (_guard, cancel) = start_query()?;
            let output = args.reader().data_status(&args.cwd()?, &cancel).await?;
            print_json(&output)
        }
        Command::ExpShow(args) => {
            let (_guard, cancel) = start_query()?;
            let output = args.reader().exp_show(&args.cwd()?, &cancel).await?;
            print_json(&output)
        }
        Command::List(args) => {
            let (_guard, cancel) = start_query()?;
            let output = args
                .reader()
                .list_dvc_only_recursive(&args.cwd()?, &cancel)
                .await?;
            print_json(&output)
        }
    }
}

/// Installs the file logger and a token cancelled on Ctrl-C.
fn start_query() -> anyhow::Result<(WorkerGuard, CancellationToken)> {
    let guard = dvc_lsp::log::init()?;
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    Ok((guard, cancel))
}

async fn check_version(args: &CliArgs, cancel: &CancellationToken) -> anyhow::Result<()> {
    let version = match args.reader().version(&args.cwd()?, cancel).await {
        Ok(version) => Some(version),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e).context("Failed to read the DVC CLI version"),
    };

    let warnings = CollectedWarnings::default();
    let compatible = is_version_compatible(version.as_deref(), &warnings);
    for message in warnings.into_messages() {
        eprintln!("{}", message);
    }

    info!("DVC CLI version {:?} is {:?}", version, compatible);
    if !compatible.is_compatible() {
        bail!("DVC CLI is not usable: {:?}", compatible);
    }

    println!("{}", version.unwrap_or_default());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
