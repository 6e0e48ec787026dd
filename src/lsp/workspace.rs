//! Open documents and the files next to a dvc.yaml

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tower_lsp::lsp_types::Url;
use tracing::debug;

use crate::completion::workspace::{SupportFile, SupportFileType, SupportWorkspace};
use crate::parser::document::{DocumentLanguage, WorkspaceDocument};
use crate::repository;

const PYTHON_SEARCH_DEPTH: usize = 4;

/// Documents the editor currently has open.
#[derive(Debug, Default)]
pub struct DocumentStore {
    roots: RwLock<Vec<PathBuf>>,
    documents: RwLock<HashMap<Url, Arc<WorkspaceDocument>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_roots(&self, roots: Vec<PathBuf>) {
        *self.roots.write().await = roots;
    }

    /// The first workspace folder, used as the working directory for the CLI.
    pub async fn root(&self) -> Option<PathBuf> {
        self.roots.read().await.first().cloned()
    }

    /// Stores `text` as the current content of `uri`, replacing any previous
    /// version. Returns `None` when the path is filtered out of the project.
    pub async fn upsert(
        &self,
        uri: Url,
        language: DocumentLanguage,
        text: String,
    ) -> Option<Arc<WorkspaceDocument>> {
        if self.is_excluded(&uri).await {
            debug!("Ignoring excluded document {}", uri);
            return None;
        }

        let document = Arc::new(WorkspaceDocument::new(uri.clone(), language, text));
        self.documents.write().await.insert(uri, document.clone());
        Some(document)
    }

    pub async fn remove(&self, uri: &Url) {
        self.documents.write().await.remove(uri);
    }

    pub async fn get(&self, uri: &Url) -> Option<Arc<WorkspaceDocument>> {
        self.documents.read().await.get(uri).cloned()
    }

    pub async fn language_of(&self, uri: &Url) -> Option<DocumentLanguage> {
        self.documents.read().await.get(uri).map(|document| document.language)
    }

    pub async fn documents(&self) -> Vec<Arc<WorkspaceDocument>> {
        self.documents.read().await.values().cloned().collect()
    }

    /// A document is kept when any workspace folder accepts it.
    async fn is_excluded(&self, uri: &Url) -> bool {
        let roots = self.roots.read().await;
        if roots.is_empty() {
            return false;
        }
        let Ok(path) = uri.to_file_path() else {
            return false;
        };
        let path = path.to_string_lossy();

        roots
            .iter()
            .all(|root| repository::is_excluded(&root.to_string_lossy(), &path))
    }
}

/// Looks files up among the open documents first, then on disk relative to
/// the directory of a dvc.yaml.
pub struct DocumentWorkspace {
    store: Arc<DocumentStore>,
    base_dir: Option<PathBuf>,
}

impl DocumentWorkspace {
    pub fn new(store: Arc<DocumentStore>, base_dir: Option<PathBuf>) -> Self {
        Self { store, base_dir }
    }

    pub fn for_document(store: Arc<DocumentStore>, uri: &Url) -> Self {
        Self::new(store, document_dir(uri))
    }

    async fn find_file(
        &self,
        documents: &[Arc<WorkspaceDocument>],
        relative_path: &str,
    ) -> Option<SupportFile> {
        let file_type = SupportFileType::from_path(relative_path)?;

        if let Some(document) = documents
            .iter()
            .find(|document| uri_ends_with(&document.uri, relative_path))
        {
            return Some(SupportFile {
                path: document.uri.to_string(),
                contents: document.text.clone(),
                file_type,
            });
        }

        let path = self.base_dir.as_ref()?.join(relative_path);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .inspect_err(|e| debug!("Cannot read {}: {}", path.display(), e))
            .ok()?;

        Some(SupportFile {
            path: path.display().to_string(),
            contents,
            file_type,
        })
    }
}

#[async_trait]
impl SupportWorkspace for DocumentWorkspace {
    async fn find_files(&self, relative_paths: &[String]) -> Option<Vec<SupportFile>> {
        let documents = self.store.documents().await;
        let lookups = relative_paths
            .iter()
            .map(|relative_path| self.find_file(&documents, relative_path));

        Some(
            futures::future::join_all(lookups)
                .await
                .into_iter()
                .flatten()
                .collect(),
        )
    }
}

/// Directory holding the document, when it lives on disk.
pub fn document_dir(uri: &Url) -> Option<PathBuf> {
    uri.to_file_path()
        .ok()
        .and_then(|path| path.parent().map(Path::to_path_buf))
}

/// Returns true when the URI path ends with `relative_path` on a path
/// component boundary.
pub fn uri_ends_with(uri: &Url, relative_path: &str) -> bool {
    let relative_path = relative_path.replace('\\', "/");
    let relative_path = relative_path.trim_start_matches("./");
    if relative_path.is_empty() {
        return false;
    }

    let path = match uri.to_file_path() {
        Ok(path) => path.to_string_lossy().replace('\\', "/"),
        Err(()) => uri.path().to_string(),
    };
    path == relative_path
        || path
            .strip_suffix(relative_path)
            .is_some_and(|prefix| prefix.ends_with('/'))
}

/// Python scripts below `base_dir`, relative to it, followed by open Python
/// documents under the same directory. Dot directories are skipped.
pub async fn python_file_paths(store: &DocumentStore, base_dir: &Path) -> Vec<String> {
    let mut paths = Vec::new();
    let mut pending = vec![(base_dir.to_path_buf(), 0)];

    while let Some((dir, depth)) = pending.pop() {
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
            continue;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };

            if file_type.is_dir() && !hidden && depth < PYTHON_SEARCH_DEPTH {
                pending.push((path, depth + 1));
            } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == "py") {
                paths.extend(relative_to(base_dir, &path));
            }
        }
    }

    for document in store.documents().await {
        if document.language != DocumentLanguage::Python {
            continue;
        }
        if let Some(relative) = document
            .uri
            .to_file_path()
            .ok()
            .and_then(|path| relative_to(base_dir, &path))
        {
            paths.push(relative);
        }
    }

    paths.sort();
    paths.dedup();
    paths
}

fn relative_to(base_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base_dir).ok()?;
    Some(
        relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}
