//! Filtering of file system events inside a DVC project

use std::sync::LazyLock;

use regex::Regex;

const EXPERIMENTS_GIT_REFS: &str = ".git/refs/exps";
const EXPERIMENTS_GIT_LOGS_REFS: &str = ".git/logs/refs/exps";

static IGNORED_DOT_DIRECTORIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\.(?:dvc|v?env)/").expect("valid ignored directories regex")
});

/// Returns true when a change to `path` is irrelevant to the project rooted at
/// `dvc_root`.
///
/// Paths outside the root are excluded unless they are git `HEAD` or `index`
/// files, which a nested project still depends on. Experiment refs and the
/// `.dvc`, `.env` and `.venv` directories are always excluded.
pub fn is_excluded(dvc_root: &str, path: &str) -> bool {
    if path.is_empty() {
        return true;
    }

    let root = normalize(dvc_root);
    let path = normalize(path);

    let in_project = path.contains(&root);
    let is_git_state = path.contains(".git") && (path.contains("HEAD") || path.contains("index"));

    !(in_project || is_git_state)
        || path.contains(EXPERIMENTS_GIT_REFS)
        || path.contains(EXPERIMENTS_GIT_LOGS_REFS)
        || IGNORED_DOT_DIRECTORIES.is_match(&path)
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}
