//! Messages exchanged with the experiments and plots webviews
//!
//! Every message is a JSON object tagged by `type`. Messages sent by a
//! webview carry their argument under `payload`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnResizePayload {
    pub id: String,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortDefinition {
    pub path: String,
    pub descending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotsSection {
    TemplatePlots,
    ComparisonTable,
    CustomPlots,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotsResizedPayload {
    pub section: PlotsSection,
    pub nb_items_per_row: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMultiPlotValue {
    pub path: String,
    pub revision: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothPlotValue {
    pub id: String,
    pub value: f64,
}

/// Either a single experiment id or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }
}

/// Messages a webview posts to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum MessageFromWebview {
    Initialized,
    AddPlot,
    AddStarredExperimentFilter,
    ApplyExperimentToWorkspace(String),
    CheckCliCompatible,
    CopyToClipboard(String),
    CreateBranchFromExperiment(String),
    ExperimentsTableHideColumnPath(String),
    ExperimentsTableMoveToStart(String),
    FilterColumn(String),
    FocusFiltersTree,
    FocusSortsTree,
    InitializeDvc,
    InitializeGit,
    InstallDvc,
    OpenExperimentsWebview,
    OpenParamsFileToTheSide(String),
    OpenPlotsWebview,
    PushExperiment(Vec<String>),
    RefreshExpData,
    RefreshPlots(PlotsSection),
    RefreshRevisions,
    RemoveColumnFilters(String),
    RemoveColumnSort(String),
    RemoveExperiment(OneOrMany),
    RenameExperiment(String),
    ReorderColumns(Vec<String>),
    ReorderPlotsComparison(Vec<String>),
    ResetCommits(String),
    ResizeColumn(ColumnResizePayload),
    ResizePlots(PlotsResizedPayload),
    SelectColumns,
    SelectExperiments,
    SelectPlots,
    SetExperimentsForPlots(Vec<String>),
    SetupWorkspace,
    ShowExperimentLogs(String),
    ShowLessCommits(String),
    ShowMoreCommits(String),
    SortColumn(SortDefinition),
    StopExperiments(Vec<String>),
    ToggleExperiment(String),
    ToggleExperimentStar(Vec<String>),
    ToggleShowOnlyChanged,
    #[serde(rename = "update-comparison-multi-plot-value")]
    SetComparisonMultiPlotValue(ComparisonMultiPlotValue),
    #[serde(rename = "update-smooth-plot-value")]
    SetSmoothPlotValue(SmoothPlotValue),
    UpdatePythonEnvironment,
    UpgradeDvc,
    ZoomPlot(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    Light,
    Dark,
    HighContrast,
}

/// Messages the server posts to a webview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageToWebview {
    SetData { data: Value },
    SetTheme { theme: Theme },
    ShowExperiments { data: Value },
}
