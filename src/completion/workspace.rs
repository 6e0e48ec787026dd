//! Workspace collaborator used to load the files a pipeline refers to

use async_trait::async_trait;

use crate::parser::document::DocumentLanguage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportFileType {
    Json,
    Yaml,
}

impl SupportFileType {
    /// Returns the type for a path, or `None` when the extension is neither
    /// YAML nor JSON.
    pub fn from_path(path: &str) -> Option<Self> {
        match DocumentLanguage::from_path(path) {
            DocumentLanguage::Yaml => Some(Self::Yaml),
            DocumentLanguage::Json => Some(Self::Json),
            DocumentLanguage::Python | DocumentLanguage::Other => None,
        }
    }

    pub fn language(self) -> DocumentLanguage {
        match self {
            Self::Json => DocumentLanguage::Json,
            Self::Yaml => DocumentLanguage::Yaml,
        }
    }
}

/// A file found by the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportFile {
    /// Where the file was found
    pub path: String,
    pub contents: String,
    pub file_type: SupportFileType,
}

/// Finds files by relative path.
///
/// `None` means the workspace cannot search at all; missing files are simply
/// left out of the result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SupportWorkspace: Send + Sync {
    async fn find_files(&self, relative_paths: &[String]) -> Option<Vec<SupportFile>>;
}

/// A workspace without any search capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWorkspace;

#[async_trait]
impl SupportWorkspace for NoWorkspace {
    async fn find_files(&self, _relative_paths: &[String]) -> Option<Vec<SupportFile>> {
        None
    }
}
