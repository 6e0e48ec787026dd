//! Discovery of the files that hold variables for a pipeline

use indexmap::IndexSet;

use crate::parser::dvc_yaml::{PathEntry, PipelineDefinition, VarEntry};

/// Variables are always read from this file when it exists.
pub const DEFAULT_PARAMS_FILE: &str = "params.yaml";

/// Collects the relative paths whose contents are needed to complete variables.
///
/// Looks at every stage's metrics and every top-level `vars` file reference.
/// Anything mentioning `.yaml` or `.json` counts; a `path:selector` reference
/// contributes only its path.
#[derive(Debug, Default)]
pub struct SymbolFileChecker;

impl SymbolFileChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, pipeline: &PipelineDefinition) -> Vec<String> {
        let mut files = IndexSet::new();
        files.insert(DEFAULT_PARAMS_FILE.to_string());

        let metrics = pipeline
            .stages
            .values()
            .flat_map(|stage| stage.metrics.iter())
            .map(PathEntry::path);

        let var_files = pipeline.vars.iter().filter_map(|entry| match entry {
            VarEntry::File(reference) => Some(reference.as_str()),
            VarEntry::Inline(_) => None,
        });

        for candidate in metrics.chain(var_files) {
            if let Some(path) = symbol_file(candidate) {
                files.insert(path.to_string());
            }
        }

        files.into_iter().collect()
    }
}

fn symbol_file(candidate: &str) -> Option<&str> {
    if !(candidate.contains(".yaml") || candidate.contains(".json")) {
        return None;
    }

    candidate.split(':').next()
}
