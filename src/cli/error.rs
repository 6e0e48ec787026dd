use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {exit_code:?}: {stderr}")]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("`{0}` was cancelled")]
    Cancelled(String),

    #[error("Unexpected output from `{command}`: {source}")]
    InvalidOutput {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CliError {
    /// True when the executable itself could not be located.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CliError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
