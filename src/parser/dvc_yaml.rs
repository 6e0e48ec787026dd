//! dvc.yaml pipeline model
//!
//! Built leniently from a parsed value tree: entries with an unexpected shape
//! are dropped instead of failing the whole document.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::parser::document::{DocumentLanguage, parse_structured};

/// A metric, plot, output or dependency entry.
///
/// Either a bare path or a single-key mapping whose key is the path and whose
/// value holds per-entry options.
#[derive(Debug, Clone, PartialEq)]
pub enum PathEntry {
    Path(String),
    WithOptions { path: String, options: Value },
}

impl PathEntry {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(path) => Some(Self::Path(path.clone())),
            Value::Object(map) if map.len() == 1 => {
                let (path, options) = map.iter().next()?;
                Some(Self::WithOptions {
                    path: path.clone(),
                    options: options.clone(),
                })
            }
            _ => None,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) | Self::WithOptions { path, .. } => path,
        }
    }
}

/// One entry of a `vars` list.
#[derive(Debug, Clone, PartialEq)]
pub enum VarEntry {
    /// A file to load variables from, optionally followed by `:key1,key2`
    File(String),
    /// Variables declared in place
    Inline(Map<String, Value>),
}

impl VarEntry {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(reference) => Some(Self::File(reference.clone())),
            Value::Object(map) => Some(Self::Inline(map.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stage {
    pub cmd: Option<Value>,
    pub deps: Vec<PathEntry>,
    pub outs: Vec<PathEntry>,
    pub metrics: Vec<PathEntry>,
    pub plots: Vec<PathEntry>,
    pub vars: Vec<VarEntry>,
}

impl Stage {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            cmd: map.get("cmd").cloned(),
            deps: path_entries(map.get("deps")),
            outs: path_entries(map.get("outs")),
            metrics: path_entries(map.get("metrics")),
            plots: path_entries(map.get("plots")),
            vars: var_entries(map.get("vars")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineDefinition {
    pub stages: IndexMap<String, Stage>,
    pub vars: Vec<VarEntry>,
}

impl PipelineDefinition {
    /// Parses dvc.yaml text. Invalid YAML yields an empty pipeline.
    pub fn parse(text: &str) -> Self {
        match parse_structured(text, DocumentLanguage::Yaml) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                debug!("dvc.yaml is not parseable, using an empty pipeline: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Value::Object(root) = value else {
            return Self::default();
        };

        let stages = match root.get("stages") {
            Some(Value::Object(stages)) => stages
                .iter()
                .filter_map(|(name, stage)| match stage {
                    Value::Object(stage) => Some((name.clone(), Stage::from_map(stage))),
                    _ => None,
                })
                .collect(),
            _ => IndexMap::new(),
        };

        Self {
            stages,
            vars: var_entries(root.get("vars")),
        }
    }

    /// Every inline `vars` mapping: document-level blocks first, then the
    /// blocks of each stage in declaration order.
    pub fn variable_blocks(&self) -> Vec<&Map<String, Value>> {
        let stage_vars = self.stages.values().flat_map(|stage| stage.vars.iter());

        self.vars
            .iter()
            .chain(stage_vars)
            .filter_map(|entry| match entry {
                VarEntry::Inline(block) => Some(block),
                VarEntry::File(_) => None,
            })
            .collect()
    }
}

fn path_entries(value: Option<&Value>) -> Vec<PathEntry> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(PathEntry::from_value).collect(),
        _ => Vec::new(),
    }
}

fn var_entries(value: Option<&Value>) -> Vec<VarEntry> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(VarEntry::from_value).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PIPELINE: &str = r#"
vars:
  - custom_params.yaml:train
  - seed: 42
    featurize:
      max_features: 100
stages:
  prepare:
    cmd: python src/prepare.py data/data.xml
    deps:
      - data/data.xml
    outs:
      - data/prepared
  train:
    vars:
      - model:
          depth: 3
    cmd: python src/train.py
    metrics:
      - scores.json:
          cache: false
      - summary.json
    plots:
      - prc.json
"#;

    #[test]
    fn parse_reads_stages_in_order() {
        let pipeline = PipelineDefinition::parse(PIPELINE);

        let names: Vec<&str> = pipeline.stages.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["prepare", "train"]);
        assert_eq!(
            pipeline.stages["prepare"].deps,
            vec![PathEntry::Path("data/data.xml".to_string())]
        );
        assert_eq!(
            pipeline.stages["prepare"].cmd,
            Some(json!("python src/prepare.py data/data.xml"))
        );
    }

    #[test]
    fn parse_reads_both_metric_shapes() {
        let pipeline = PipelineDefinition::parse(PIPELINE);

        let metrics: Vec<&str> = pipeline.stages["train"]
            .metrics
            .iter()
            .map(PathEntry::path)
            .collect();
        assert_eq!(metrics, vec!["scores.json", "summary.json"]);
        assert_eq!(
            pipeline.stages["train"].metrics[0],
            PathEntry::WithOptions {
                path: "scores.json".to_string(),
                options: json!({ "cache": false }),
            }
        );
    }

    #[test]
    fn parse_reads_file_and_inline_vars() {
        let pipeline = PipelineDefinition::parse(PIPELINE);

        assert_eq!(pipeline.vars.len(), 2);
        assert_eq!(
            pipeline.vars[0],
            VarEntry::File("custom_params.yaml:train".to_string())
        );
        assert!(matches!(&pipeline.vars[1], VarEntry::Inline(block) if block.contains_key("seed")));
    }

    #[test]
    fn variable_blocks_lists_document_blocks_before_stage_blocks() {
        let pipeline = PipelineDefinition::parse(PIPELINE);

        let blocks = pipeline.variable_blocks();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains_key("featurize"));
        assert!(blocks[1].contains_key("model"));
    }

    #[test]
    fn parse_skips_malformed_shapes() {
        let pipeline = PipelineDefinition::parse(
            r#"
vars: not-a-list
stages:
  broken: just a string
  odd:
    metrics:
      - 12
      - { a.json: {}, b.json: {} }
      - ok.json
"#,
        );

        assert!(pipeline.vars.is_empty());
        assert_eq!(pipeline.stages.len(), 1);
        assert_eq!(
            pipeline.stages["odd"].metrics,
            vec![PathEntry::Path("ok.json".to_string())]
        );
    }

    #[test]
    fn parse_returns_empty_pipeline_for_invalid_yaml() {
        let pipeline = PipelineDefinition::parse("stages: [unclosed");

        assert_eq!(pipeline, PipelineDefinition::default());
    }

    #[test]
    fn parse_returns_empty_pipeline_for_empty_text() {
        assert_eq!(PipelineDefinition::parse(""), PipelineDefinition::default());
    }
}
