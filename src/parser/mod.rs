//! Parser layer
//! - document.rs: Workspace documents, language detection, position helpers
//! - dvc_yaml.rs: dvc.yaml pipeline model
//! - yaml.rs: tree-sitter symbol lookup for YAML
//! - json.rs: tree-sitter key path lookup for JSON

pub mod document;
pub mod dvc_yaml;
pub mod json;
pub mod yaml;

pub use document::{DocumentLanguage, WorkspaceDocument};
pub use dvc_yaml::{PathEntry, PipelineDefinition, Stage, VarEntry};
pub use yaml::{SymbolKind, YamlSymbol};
