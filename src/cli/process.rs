//! Running shaped dvc invocations

use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::error::CliError;
use crate::cli::options::CliOptions;

/// Runs the command and returns its trimmed stdout.
///
/// The child is killed if `cancel` fires before it exits.
pub async fn execute_process(
    options: &CliOptions,
    cancel: &CancellationToken,
) -> Result<String, CliError> {
    let command = options.command_line();
    let started = Instant::now();
    debug!("Running `{}` in {}", command, options.cwd.display());

    let child = Command::new(&options.executable)
        .args(&options.args)
        .current_dir(&options.cwd)
        .envs(&options.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CliError::Spawn {
            command: command.clone(),
            source,
        })?;

    let output = tokio::select! {
        output = child.wait_with_output() => output.map_err(|source| CliError::Spawn {
            command: command.clone(),
            source,
        })?,
        _ = cancel.cancelled() => {
            warn!("Cancelled `{}`", command);
            return Err(CliError::Cancelled(command));
        }
    };

    debug!(
        "`{}` finished in {}ms with {}",
        command,
        started.elapsed().as_millis(),
        output.status
    );

    if !output.status.success() {
        return Err(CliError::Failed {
            command,
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn shell(script: &str, cwd: &std::path::Path) -> CliOptions {
        CliOptions {
            executable: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            cwd: cwd.to_path_buf(),
            env: BTreeMap::from([("DVC_NO_ANALYTICS".to_string(), "true".to_string())]),
        }
    }

    #[tokio::test]
    async fn returns_trimmed_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let options = shell("echo '  2.11.1  '", dir.path());

        let output = execute_process(&options, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output, "2.11.1");
    }

    #[tokio::test]
    async fn passes_environment_and_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let options = shell("echo $DVC_NO_ANALYTICS; ls", dir.path());

        let output = execute_process(&options, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output, "true\nmarker.txt");
    }

    #[tokio::test]
    async fn non_zero_exit_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let options = shell("echo 'ERROR: not a dvc repository' >&2; exit 255", dir.path());

        let error = execute_process(&options, &CancellationToken::new())
            .await
            .unwrap_err();

        match error {
            CliError::Failed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(255));
                assert_eq!(stderr, "ERROR: not a dvc repository");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_executable_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let options = CliOptions {
            executable: "definitely-not-a-dvc-binary".to_string(),
            args: Vec::new(),
            cwd: dir.path().to_path_buf(),
            env: BTreeMap::new(),
        };

        let error = execute_process(&options, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(error, CliError::Spawn { .. }));
    }

    #[tokio::test]
    async fn cancellation_stops_long_running_command() {
        let dir = tempfile::tempdir().unwrap();
        let options = shell("sleep 30", dir.path());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let error = execute_process(&options, &cancel).await.unwrap_err();

        assert!(matches!(error, CliError::Cancelled(command) if command == "sh -c sleep 30"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
