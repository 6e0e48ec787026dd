//! Shaping of dvc invocations
//!
//! Decides which executable to run and with which arguments and environment:
//! - a direct CLI path wins and is run as-is,
//! - otherwise an interpreter runs `python -m dvc ...`,
//! - otherwise the bare `dvc` on PATH is used.
//!
//! An interpreter always has its directory prepended to PATH, even when a
//! direct CLI path decides the executable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::constants::DVC_EXECUTABLE;

pub const DVC_NO_ANALYTICS: &str = "DVC_NO_ANALYTICS";
pub const DVCLIVE_OPEN: &str = "DVCLIVE_OPEN";

const PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub executable: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
}

impl CliOptions {
    /// The invocation as it would be typed into a shell.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builds options on top of the current process environment.
pub fn get_options(
    python_bin_path: Option<&Path>,
    cli_path: Option<&Path>,
    cwd: &Path,
    args: &[&str],
) -> CliOptions {
    get_options_with_env(std::env::vars().collect(), python_bin_path, cli_path, cwd, args)
}

pub fn get_options_with_env(
    base_env: BTreeMap<String, String>,
    python_bin_path: Option<&Path>,
    cli_path: Option<&Path>,
    cwd: &Path,
    args: &[&str],
) -> CliOptions {
    let python_bin_path = non_empty(python_bin_path);
    let cli_path = non_empty(cli_path);

    let (executable, args) = match (cli_path, python_bin_path) {
        (Some(cli_path), _) => (path_string(cli_path), owned(args)),
        (None, Some(python_bin_path)) => {
            let mut module_args = vec!["-m".to_string(), DVC_EXECUTABLE.to_string()];
            module_args.extend(owned(args));
            (path_string(python_bin_path), module_args)
        }
        (None, None) => (DVC_EXECUTABLE.to_string(), owned(args)),
    };

    CliOptions {
        executable,
        args,
        cwd: cwd.to_path_buf(),
        env: get_env(base_env, python_bin_path),
    }
}

/// Renders a display string for a command, prefixing `<python_bin_path>/python`
/// when an interpreter is in use.
pub fn command_string(python_bin_path: Option<&str>, executable: &str, args: &[&str]) -> String {
    let interpreter = python_bin_path
        .filter(|path| !path.is_empty())
        .map(|path| format!("{}/python ", path.trim_end_matches('/')))
        .unwrap_or_default();

    format!("{}{} {}", interpreter, executable, args.join(" "))
        .trim_end()
        .to_string()
}

/// Prepends `dir` to a PATH-style list.
pub fn join_env_path(dir: &Path, existing: Option<&str>) -> String {
    match existing.filter(|path| !path.is_empty()) {
        Some(existing) => format!("{}{}{}", dir.display(), PATH_SEPARATOR, existing),
        None => dir.display().to_string(),
    }
}

fn get_env(
    mut env: BTreeMap<String, String>,
    python_bin_path: Option<&Path>,
) -> BTreeMap<String, String> {
    if let Some(bin_dir) = python_bin_path
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        let path = join_env_path(bin_dir, env.get("PATH").map(String::as_str));
        env.insert("PATH".to_string(), path);
    }

    env.insert(DVC_NO_ANALYTICS.to_string(), "true".to_string());
    env.insert(DVCLIVE_OPEN.to_string(), "false".to_string());
    env
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|path| !path.as_os_str().is_empty())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}
