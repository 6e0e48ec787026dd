//! Variable completion for dvc.yaml
//! - symbol_files.rs: Which files hold variables for a pipeline
//! - workspace.rs: SupportWorkspace trait used to load those files
//! - provider.rs: Internal and external symbol sources
//! - support.rs: Per-document completion facade and snippet templates

pub mod provider;
pub mod support;
pub mod symbol_files;
pub mod workspace;

pub use provider::{DvcYamlCompletionItem, ExternalSymbols, InternalSymbols, SymbolSource};
pub use support::{DvcYamlSupport, SnippetTemplate, snippet_templates, trailing_fragment};
pub use symbol_files::SymbolFileChecker;
pub use workspace::{NoWorkspace, SupportFile, SupportFileType, SupportWorkspace};
