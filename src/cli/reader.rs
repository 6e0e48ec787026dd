//! Typed wrappers around read-only dvc commands

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::constants::{CURRENT_DIRECTORY, Command, Flag, SubCommand};
use crate::cli::contract::{DataStatusResponse, ExpState};
use crate::cli::error::CliError;
use crate::cli::options::{CliOptions, get_options};
use crate::cli::process::execute_process;
use crate::config::ServerSettings;

#[derive(Debug, Clone, Default)]
pub struct DvcReader {
    python_bin_path: Option<PathBuf>,
    cli_path: Option<PathBuf>,
}

impl DvcReader {
    pub fn new(python_bin_path: Option<PathBuf>, cli_path: Option<PathBuf>) -> Self {
        Self {
            python_bin_path,
            cli_path,
        }
    }

    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self::new(settings.python_bin_path.clone(), settings.cli_path.clone())
    }

    pub fn options(&self, cwd: &Path, args: &[&str]) -> CliOptions {
        get_options(
            self.python_bin_path.as_deref(),
            self.cli_path.as_deref(),
            cwd,
            args,
        )
    }

    /// `dvc --version`
    pub async fn version(
        &self,
        cwd: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, CliError> {
        execute_process(&self.options(cwd, &[Flag::Version.as_str()]), cancel).await
    }

    /// `dvc data status --granular --unchanged --json`
    pub async fn data_status(
        &self,
        cwd: &Path,
        cancel: &CancellationToken,
    ) -> Result<DataStatusResponse, CliError> {
        self.read_json(
            cwd,
            &[
                Command::Data.as_str(),
                SubCommand::Status.as_str(),
                Flag::Granular.as_str(),
                Flag::Unchanged.as_str(),
                Flag::Json.as_str(),
            ],
            cancel,
        )
        .await
    }

    /// `dvc exp show --json`
    pub async fn exp_show(
        &self,
        cwd: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExpState>, CliError> {
        self.read_json(
            cwd,
            &[
                Command::Experiment.as_str(),
                SubCommand::Show.as_str(),
                Flag::Json.as_str(),
            ],
            cancel,
        )
        .await
    }

    /// `dvc list . --dvc-only -R`, one tracked path per line.
    pub async fn list_dvc_only_recursive(
        &self,
        cwd: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, CliError> {
        let options = self.options(
            cwd,
            &[
                Command::List.as_str(),
                CURRENT_DIRECTORY,
                Flag::DvcOnly.as_str(),
                Flag::Recursive.as_str(),
            ],
        );
        let output = execute_process(&options, cancel).await?;

        Ok(split_lines(&output))
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        cwd: &Path,
        args: &[&str],
        cancel: &CancellationToken,
    ) -> Result<T, CliError> {
        let options = self.options(cwd, args);
        let output = execute_process(&options, cancel).await?;
        debug!("Parsing {} bytes of JSON", output.len());

        parse_json(&options.command_line(), &output)
    }
}

pub fn parse_json<T: DeserializeOwned>(command: &str, output: &str) -> Result<T, CliError> {
    serde_json::from_str(output).map_err(|source| CliError::InvalidOutput {
        command: command.to_string(),
        source,
    })
}

fn split_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
