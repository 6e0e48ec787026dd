//! Workspace documents and text position helpers

use std::sync::OnceLock;

use serde_json::Value;
use thiserror::Error;
use tower_lsp::lsp_types::{Position, Url};
use tracing::warn;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} documents have no structured form")]
    Unstructured(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentLanguage {
    Yaml,
    Json,
    Python,
    Other,
}

impl DocumentLanguage {
    /// Detects the language from the editor's language id, falling back to the
    /// file extension for ids the server does not know.
    pub fn detect(language_id: &str, uri: &str) -> Self {
        match language_id {
            "yaml" | "dvc" => Self::Yaml,
            "json" | "jsonc" => Self::Json,
            "python" => Self::Python,
            _ => Self::from_path(uri),
        }
    }

    pub fn from_path(path: &str) -> Self {
        let path = path.to_ascii_lowercase();
        if path.ends_with(".yaml")
            || path.ends_with(".yml")
            || path.ends_with(".dvc")
            || path.ends_with("dvc.lock")
        {
            Self::Yaml
        } else if path.ends_with(".json") {
            Self::Json
        } else if path.ends_with(".py") {
            Self::Python
        } else {
            Self::Other
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Python => "Python",
            Self::Other => "Plain text",
        }
    }
}

/// Parses YAML or JSON text into a generic value tree.
pub fn parse_structured(text: &str, language: DocumentLanguage) -> Result<Value, ParseError> {
    match language {
        DocumentLanguage::Yaml => Ok(serde_yaml::from_str(text)?),
        DocumentLanguage::Json => Ok(serde_json::from_str(text)?),
        other => Err(ParseError::Unstructured(other.name())),
    }
}

/// A document the editor has opened.
///
/// The structured value is parsed on first access. Documents are immutable;
/// a change notification replaces the whole document.
#[derive(Debug)]
pub struct WorkspaceDocument {
    pub uri: Url,
    pub language: DocumentLanguage,
    pub text: String,
    parsed: OnceLock<Option<Value>>,
}

impl WorkspaceDocument {
    pub fn new(uri: Url, language: DocumentLanguage, text: String) -> Self {
        Self {
            uri,
            language,
            text,
            parsed: OnceLock::new(),
        }
    }

    /// Returns the parsed value, or `None` for unstructured or broken documents.
    pub fn parsed(&self) -> Option<&Value> {
        self.parsed
            .get_or_init(|| match self.language {
                DocumentLanguage::Yaml | DocumentLanguage::Json => {
                    parse_structured(&self.text, self.language)
                        .inspect_err(|e| warn!("Failed to parse {}: {}", self.uri, e))
                        .ok()
                }
                DocumentLanguage::Python | DocumentLanguage::Other => None,
            })
            .as_ref()
    }

    pub fn is_dvc_yaml(&self) -> bool {
        is_dvc_yaml_uri(&self.uri)
    }
}

pub fn is_dvc_yaml_uri(uri: &Url) -> bool {
    uri.path().ends_with("dvc.yaml")
}

/// Converts an LSP position (UTF-16 columns) into a byte offset into `text`.
/// Positions past the end of a line clamp to the line end.
pub fn offset_at(text: &str, position: Position) -> usize {
    let mut offset = 0;

    for (row, line) in text.split_inclusive('\n').enumerate() {
        if row == position.line as usize {
            return offset + byte_column(line, position.character);
        }
        offset += line.len();
    }

    text.len()
}

/// Converts a byte offset into an LSP position.
pub fn position_at(text: &str, offset: usize) -> Position {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &text[..offset];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let character = text[line_start..offset].encode_utf16().count();

    Position::new(line as u32, character as u32)
}

/// Returns the text of the position's line up to the position itself.
pub fn line_prefix(text: &str, position: Position) -> &str {
    let start = offset_at(text, Position::new(position.line, 0));
    let end = offset_at(text, position);
    &text[start..end]
}

fn byte_column(line: &str, character: u32) -> usize {
    let mut units = 0u32;

    for (index, ch) in line.char_indices() {
        if units >= character || ch == '\n' || ch == '\r' {
            return index;
        }
        units += ch.len_utf16() as u32;
    }

    line.len()
}
