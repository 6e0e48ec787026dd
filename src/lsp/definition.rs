//! Go-to-definition for symbols inside dvc.yaml

use std::ops::Range as ByteRange;
use std::path::Path;

use tower_lsp::lsp_types::{Location, Position, Range, Url};
use tracing::debug;

use crate::completion::symbol_files::SymbolFileChecker;
use crate::lsp::workspace::{DocumentStore, document_dir, uri_ends_with};
use crate::parser::document::{DocumentLanguage, WorkspaceDocument, offset_at, position_at};
use crate::parser::dvc_yaml::PipelineDefinition;
use crate::parser::yaml::{self, SymbolKind, YamlSymbol};
use crate::parser::json;

/// A structured file that may define a property.
struct Candidate {
    uri: Url,
    language: DocumentLanguage,
    text: String,
}

/// Resolves the symbol under `position` in a dvc.yaml document.
///
/// Candidates are tried in order (file path, then property path) and the
/// first one with any location wins.
pub async fn find_definitions(
    store: &DocumentStore,
    document: &WorkspaceDocument,
    position: Position,
) -> Vec<Location> {
    let offset = offset_at(&document.text, position);

    for symbol in yaml::symbol_at(&document.text, offset) {
        let locations = match symbol.kind {
            SymbolKind::File => file_locations(store, document, &symbol).await,
            SymbolKind::Property => property_locations(store, document, &symbol).await,
        };

        if !locations.is_empty() {
            return locations;
        }
    }

    Vec::new()
}

async fn file_locations(
    store: &DocumentStore,
    document: &WorkspaceDocument,
    symbol: &YamlSymbol,
) -> Vec<Location> {
    let open: Vec<Location> = store
        .documents()
        .await
        .iter()
        .filter(|open| uri_ends_with(&open.uri, &symbol.name))
        .map(|open| file_start(open.uri.clone()))
        .collect();

    if !open.is_empty() {
        return open;
    }

    let Some(path) = document_dir(&document.uri).map(|dir| dir.join(&symbol.name)) else {
        return Vec::new();
    };

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        debug!("No file found for {}", symbol.name);
        return Vec::new();
    }

    Url::from_file_path(&path)
        .map(|uri| vec![file_start(uri)])
        .unwrap_or_default()
}

async fn property_locations(
    store: &DocumentStore,
    document: &WorkspaceDocument,
    symbol: &YamlSymbol,
) -> Vec<Location> {
    let path: Vec<&str> = symbol.name.split('.').collect();

    candidates(store, document)
        .await
        .into_iter()
        .filter_map(|candidate| {
            let range = match candidate.language {
                DocumentLanguage::Yaml => yaml::property_range(&candidate.text, &path),
                DocumentLanguage::Json => json::property_range(&candidate.text, &path),
                DocumentLanguage::Python | DocumentLanguage::Other => None,
            }?;

            Some(Location::new(
                candidate.uri,
                to_lsp_range(&candidate.text, range),
            ))
        })
        .collect()
}

/// Other open YAML and JSON documents, then the referenced variable files
/// that are only on disk.
async fn candidates(store: &DocumentStore, document: &WorkspaceDocument) -> Vec<Candidate> {
    let open = store.documents().await;

    let mut candidates: Vec<Candidate> = open
        .iter()
        .filter(|open| open.uri != document.uri)
        .filter(|open| matches!(open.language, DocumentLanguage::Yaml | DocumentLanguage::Json))
        .map(|open| Candidate {
            uri: open.uri.clone(),
            language: open.language,
            text: open.text.clone(),
        })
        .collect();

    let Some(base_dir) = document_dir(&document.uri) else {
        return candidates;
    };

    let pipeline = PipelineDefinition::parse(&document.text);
    for relative_path in SymbolFileChecker::new().check(&pipeline) {
        if open.iter().any(|open| uri_ends_with(&open.uri, &relative_path)) {
            continue;
        }
        if let Some(candidate) = read_candidate(&base_dir, &relative_path).await {
            candidates.push(candidate);
        }
    }

    candidates
}

async fn read_candidate(base_dir: &Path, relative_path: &str) -> Option<Candidate> {
    let path = base_dir.join(relative_path);
    let text = tokio::fs::read_to_string(&path).await.ok()?;
    let uri = Url::from_file_path(&path).ok()?;

    Some(Candidate {
        uri,
        language: DocumentLanguage::from_path(relative_path),
        text,
    })
}

fn file_start(uri: Url) -> Location {
    Location::new(uri, Range::new(Position::new(0, 0), Position::new(0, 0)))
}

fn to_lsp_range(text: &str, range: ByteRange<usize>) -> Range {
    Range::new(position_at(text, range.start), position_at(text, range.end))
}
