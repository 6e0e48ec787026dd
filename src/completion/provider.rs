//! Variable completion sources
//!
//! Both sources answer the same two questions over different data: which
//! top-level keys start with a fragment, and which children of a known path
//! start with the last, incomplete segment.

use serde_json::{Map, Value};

use crate::parser::dvc_yaml::PipelineDefinition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DvcYamlCompletionItem {
    pub label: String,
    /// Full dotted path to insert
    pub completion: String,
}

impl DvcYamlCompletionItem {
    fn top_level(key: &str) -> Self {
        Self {
            label: key.to_string(),
            completion: key.to_string(),
        }
    }

    fn child(parent_path: &[&str], key: &str) -> Self {
        Self {
            label: key.to_string(),
            completion: format!("{}.{}", parent_path.join("."), key),
        }
    }
}

pub trait SymbolSource {
    fn top_level_symbols(&self, fragment: &str) -> Vec<DvcYamlCompletionItem>;

    /// `path` holds the complete parent segments followed by the incomplete tail.
    fn closest_complete_paths(&self, path: &[&str]) -> Vec<DvcYamlCompletionItem>;
}

/// Variables declared inside the pipeline itself.
#[derive(Debug, Clone, Default)]
pub struct InternalSymbols {
    blocks: Vec<Value>,
}

impl InternalSymbols {
    pub fn new(pipeline: &PipelineDefinition) -> Self {
        Self {
            blocks: pipeline
                .variable_blocks()
                .into_iter()
                .map(|block| Value::Object(block.clone()))
                .collect(),
        }
    }
}

impl SymbolSource for InternalSymbols {
    fn top_level_symbols(&self, fragment: &str) -> Vec<DvcYamlCompletionItem> {
        matching_top_level_keys(&self.blocks, fragment)
    }

    fn closest_complete_paths(&self, path: &[&str]) -> Vec<DvcYamlCompletionItem> {
        matching_child_keys(&self.blocks, path)
    }
}

/// Variables loaded from the files a pipeline refers to.
#[derive(Debug, Clone, Default)]
pub struct ExternalSymbols {
    files: Vec<Value>,
}

impl ExternalSymbols {
    pub fn new(files: Vec<Value>) -> Self {
        Self { files }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SymbolSource for ExternalSymbols {
    fn top_level_symbols(&self, fragment: &str) -> Vec<DvcYamlCompletionItem> {
        matching_top_level_keys(&self.files, fragment)
    }

    fn closest_complete_paths(&self, path: &[&str]) -> Vec<DvcYamlCompletionItem> {
        matching_child_keys(&self.files, path)
    }
}

/// Splits a dotted fragment and dispatches on the number of segments.
pub fn provide_completions_for_symbols(
    source: &dyn SymbolSource,
    fragment: &str,
) -> Vec<DvcYamlCompletionItem> {
    if fragment.is_empty() {
        return Vec::new();
    }

    let segments: Vec<&str> = fragment.split('.').collect();

    match segments.as_slice() {
        [] => Vec::new(),
        [single] => source.top_level_symbols(single),
        _ => source.closest_complete_paths(&segments),
    }
}

fn matching_top_level_keys(values: &[Value], fragment: &str) -> Vec<DvcYamlCompletionItem> {
    values
        .iter()
        .flat_map(child_keys)
        .filter(|key| key.starts_with(fragment))
        .map(|key| DvcYamlCompletionItem::top_level(&key))
        .collect()
}

fn matching_child_keys(values: &[Value], path: &[&str]) -> Vec<DvcYamlCompletionItem> {
    let Some((tail, parent_path)) = path.split_last() else {
        return Vec::new();
    };

    values
        .iter()
        .filter_map(|value| lookup(value, parent_path))
        .flat_map(child_keys)
        .filter(|key| key.starts_with(*tail))
        .map(|key| DvcYamlCompletionItem::child(parent_path, &key))
        .collect()
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Object keys, or indices for arrays. Scalars have no children.
fn child_keys(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => object_keys(map),
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

fn object_keys(map: &Map<String, Value>) -> Vec<String> {
    map.keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(label: &str, completion: &str) -> DvcYamlCompletionItem {
        DvcYamlCompletionItem {
            label: label.to_string(),
            completion: completion.to_string(),
        }
    }

    fn external() -> ExternalSymbols {
        ExternalSymbols::new(vec![
            json!({
                "featurize": { "max_features": 200, "ngrams": 2 },
                "train": { "epochs": 10, "layers": [{ "units": 64 }] }
            }),
            json!({ "feature_set": "v2" }),
        ])
    }

    #[test]
    fn empty_fragment_has_no_suggestions() {
        assert!(provide_completions_for_symbols(&external(), "").is_empty());
    }

    #[test]
    fn single_segment_filters_top_level_keys_of_every_file() {
        let items = provide_completions_for_symbols(&external(), "feat");

        assert_eq!(
            items,
            vec![
                item("featurize", "featurize"),
                item("feature_set", "feature_set"),
            ]
        );
    }

    #[test]
    fn trailing_dot_lists_every_child() {
        let items = provide_completions_for_symbols(&external(), "featurize.");

        assert_eq!(
            items,
            vec![
                item("max_features", "featurize.max_features"),
                item("ngrams", "featurize.ngrams"),
            ]
        );
    }

    #[test]
    fn last_segment_filters_children() {
        let items = provide_completions_for_symbols(&external(), "featurize.ng");

        assert_eq!(items, vec![item("ngrams", "featurize.ngrams")]);
    }

    #[test]
    fn deep_paths_walk_arrays_by_index() {
        let items = provide_completions_for_symbols(&external(), "train.layers.0.u");

        assert_eq!(items, vec![item("units", "train.layers.0.units")]);
    }

    #[test]
    fn scalar_and_missing_parents_have_no_children() {
        assert!(provide_completions_for_symbols(&external(), "feature_set.").is_empty());
        assert!(provide_completions_for_symbols(&external(), "unknown.a").is_empty());
    }

    #[test]
    fn internal_symbols_read_inline_variable_blocks() {
        let pipeline = PipelineDefinition::parse(
            r#"
vars:
  - params.yaml
  - seed: 42
    featurize:
      ngrams: 3
stages:
  train:
    vars:
      - model:
          depth: 4
    cmd: python train.py
"#,
        );
        let internal = InternalSymbols::new(&pipeline);

        assert_eq!(
            provide_completions_for_symbols(&internal, "m"),
            vec![item("model", "model")]
        );
        assert_eq!(
            provide_completions_for_symbols(&internal, "featurize."),
            vec![item("ngrams", "featurize.ngrams")]
        );
        assert_eq!(
            provide_completions_for_symbols(&internal, "model.d"),
            vec![item("depth", "model.depth")]
        );
    }
}
