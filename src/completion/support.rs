//! Completion facade for one dvc.yaml document

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::completion::provider::{
    DvcYamlCompletionItem, ExternalSymbols, InternalSymbols, provide_completions_for_symbols,
};
use crate::completion::symbol_files::SymbolFileChecker;
use crate::completion::workspace::SupportWorkspace;
use crate::parser::document::parse_structured;
use crate::parser::dvc_yaml::PipelineDefinition;

static TRAILING_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.]+$").expect("valid trailing path regex"));

/// A snippet offered when there is no variable fragment to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetTemplate {
    pub label: String,
    /// YAML text with `$1`-style tab stops
    pub body: String,
}

/// Owns one pipeline document, the files it refers to, and the variable
/// sources built from both.
pub struct DvcYamlSupport<W> {
    workspace: W,
    pipeline: PipelineDefinition,
    internal: InternalSymbols,
    external: ExternalSymbols,
    loaded: bool,
}

impl<W: SupportWorkspace> DvcYamlSupport<W> {
    pub fn new(workspace: W, dvc_yaml: &str) -> Self {
        let pipeline = PipelineDefinition::parse(dvc_yaml);
        let internal = InternalSymbols::new(&pipeline);

        Self {
            workspace,
            pipeline,
            internal,
            external: ExternalSymbols::default(),
            loaded: false,
        }
    }

    pub fn pipeline(&self) -> &PipelineDefinition {
        &self.pipeline
    }

    /// Loads and parses the referenced files. Does nothing once they are loaded.
    pub async fn init(&mut self) {
        if self.loaded {
            return;
        }

        let paths = SymbolFileChecker::new().check(&self.pipeline);
        debug!("Looking up variable files: {:?}", paths);

        let Some(files) = self.workspace.find_files(&paths).await else {
            return;
        };

        let parsed = files
            .into_iter()
            .filter_map(|file| {
                parse_structured(&file.contents, file.file_type.language())
                    .inspect_err(|e| warn!("Skipping variables from {}: {}", file.path, e))
                    .ok()
            })
            .collect();

        self.external = ExternalSymbols::new(parsed);
        self.loaded = true;
    }

    /// Completes the dotted path at the end of `current_line`.
    ///
    /// Results from referenced files come before variables declared in the
    /// pipeline itself; duplicates are kept.
    pub fn provide_completions(&self, current_line: &str) -> Vec<DvcYamlCompletionItem> {
        let Some(fragment) = trailing_fragment(current_line) else {
            return Vec::new();
        };

        let mut completions = provide_completions_for_symbols(&self.external, fragment);
        completions.extend(provide_completions_for_symbols(&self.internal, fragment));
        completions
    }
}

/// Returns the trailing run of word characters and dots, if any.
pub fn trailing_fragment(line: &str) -> Option<&str> {
    TRAILING_PATH.find(line).map(|m| m.as_str())
}

/// Stage scaffolding snippets, plus one `cmd` template per Python script.
pub fn snippet_templates(python_file_paths: &[String]) -> Vec<SnippetTemplate> {
    let mut templates = vec![
        SnippetTemplate {
            label: "stages".to_string(),
            body: render_snippet(object([(
                "stages",
                object([("$1", object([("cmd", Value::from("$2"))]))]),
            )])),
        },
        SnippetTemplate {
            label: "Add stage".to_string(),
            body: render_snippet(object([("$1", object([("cmd", Value::from("$2"))]))])),
        },
    ];

    for path in python_file_paths {
        templates.push(SnippetTemplate {
            label: format!("cmd: {}", path),
            body: render_snippet(object([(
                "cmd",
                Value::from(format!("python {} $1", path)),
            )])),
        });
    }

    templates
}

fn object<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<Map<String, Value>>(),
    )
}

fn render_snippet(body: Value) -> String {
    serde_yaml::to_string(&body)
        .inspect_err(|e| warn!("Failed to render snippet: {}", e))
        .unwrap_or_default()
}
