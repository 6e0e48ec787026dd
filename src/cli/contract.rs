//! JSON shapes printed by `dvc ... --json`

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorContents {
    #[serde(rename = "type")]
    pub error_type: String,
    pub msg: String,
}

/// Error object printed instead of the regular output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DvcError {
    pub error: ErrorContents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Renamed {
    pub new: String,
    pub old: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Changes {
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub modified: Vec<String>,
    pub renamed: Vec<Renamed>,
    pub unknown: Vec<String>,
}

/// Output of `dvc data status --granular --unchanged --json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStatusOutput {
    pub committed: Changes,
    pub uncommitted: Changes,
    pub not_in_cache: Vec<String>,
    pub unchanged: Vec<String>,
    pub untracked: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataStatusResponse {
    Error(DvcError),
    Status(DataStatusOutput),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpData {
    pub rev: Option<String>,
    pub timestamp: Option<String>,
    pub params: Value,
    pub metrics: Value,
    pub deps: Value,
    pub outs: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executor {
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// A set of revisions sharing an executor, typically one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpRange {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub executor: Option<Executor>,
    #[serde(default)]
    pub revs: Vec<ExpState>,
}

/// One entry of `dvc exp show --json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpState {
    pub rev: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<ExpData>,
    #[serde(default)]
    pub error: Option<ErrorContents>,
    #[serde(default)]
    pub experiments: Option<Vec<ExpRange>>,
}
