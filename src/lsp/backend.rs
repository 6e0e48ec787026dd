use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::request::{GotoDeclarationParams, GotoDeclarationResponse};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};

use crate::cli::error::CliError;
use crate::cli::reader::DvcReader;
use crate::cli::version::{CliCompatible, CollectedWarnings, is_version_compatible};
use crate::completion::provider::DvcYamlCompletionItem;
use crate::completion::support::{DvcYamlSupport, SnippetTemplate, snippet_templates, trailing_fragment};
use crate::config::{Preferences, ServerSettings, preferences_path};
use crate::lsp::definition::find_definitions;
use crate::lsp::workspace::{DocumentStore, DocumentWorkspace, document_dir, python_file_paths};
use crate::parser::document::{DocumentLanguage, is_dvc_yaml_uri, line_prefix};

pub const NEVER_SHOW_AGAIN: &str = "Never";

pub struct Backend {
    client: Client,
    documents: Arc<DocumentStore>,
    settings: RwLock<ServerSettings>,
    preferences_path: PathBuf,
    shutdown: CancellationToken,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self::build(client, preferences_path())
    }

    /// Creates a backend that persists user choices to `preferences_path`.
    pub fn build(client: Client, preferences_path: PathBuf) -> Self {
        Self {
            client,
            documents: Arc::new(DocumentStore::new()),
            settings: RwLock::new(ServerSettings::default()),
            preferences_path,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    ..Default::default()
                },
            )),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(vec![".".to_string()]),
                ..Default::default()
            }),
            definition_provider: Some(OneOf::Left(true)),
            declaration_provider: Some(DeclarationCapability::Simple(true)),
            ..Default::default()
        }
    }

    fn spawn_version_check(&self, settings: ServerSettings, cwd: PathBuf) {
        let client = self.client.clone();
        let preferences_path = self.preferences_path.clone();
        let cancel = self.shutdown.child_token();

        tokio::spawn(async move {
            if Preferences::load(&preferences_path).do_not_warn_cli_version {
                info!("CLI version warnings are disabled");
                return;
            }

            let version = match DvcReader::from_settings(&settings)
                .version(&cwd, &cancel)
                .await
            {
                Ok(version) => Some(version),
                Err(e) if e.is_not_found() => {
                    warn!("DVC CLI executable not found: {}", e);
                    None
                }
                Err(CliError::Cancelled(command)) => {
                    debug!("Version check cancelled: {}", command);
                    return;
                }
                Err(e) => {
                    error!("Failed to read DVC CLI version: {}", e);
                    client
                        .show_message(
                            MessageType::ERROR,
                            format!("Failed to read the DVC CLI version. {}", e),
                        )
                        .await;
                    return;
                }
            };

            let (compatible, messages) = {
                let warnings = CollectedWarnings::default();
                let compatible = is_version_compatible(version.as_deref(), &warnings);
                (compatible, warnings.into_messages())
            };
            info!("DVC CLI version {:?} is {:?}", version, compatible);

            if compatible == CliCompatible::NoNotFound {
                client
                    .log_message(MessageType::WARNING, "The DVC CLI could not be found")
                    .await;
            }

            for message in messages {
                let action = client
                    .show_message_request(
                        MessageType::WARNING,
                        message,
                        Some(vec![MessageActionItem {
                            title: NEVER_SHOW_AGAIN.to_string(),
                            properties: HashMap::new(),
                        }]),
                    )
                    .await;

                if matches!(action, Ok(Some(ref item)) if item.title == NEVER_SHOW_AGAIN) {
                    let preferences = Preferences {
                        do_not_warn_cli_version: true,
                    };
                    if let Err(e) = preferences.save(&preferences_path) {
                        error!("Failed to save preferences: {}", e);
                    }
                    break;
                }
            }
        });
    }

    async fn workspace_dir(&self) -> PathBuf {
        match self.documents.root().await {
            Some(root) => root,
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    async fn definitions(&self, params: TextDocumentPositionParams) -> Option<GotoDefinitionResponse> {
        let uri = params.text_document.uri;
        if !is_dvc_yaml_uri(&uri) {
            return None;
        }

        let document = self.documents.get(&uri).await?;
        let mut locations = find_definitions(&self.documents, &document, params.position).await;

        debug!("Found {} definitions in {}", locations.len(), uri);
        match locations.len() {
            0 => None,
            1 => locations.pop().map(GotoDefinitionResponse::Scalar),
            _ => Some(GotoDefinitionResponse::Array(locations)),
        }
    }
}

/// Every workspace folder on disk, falling back to the root URI.
fn workspace_roots(params: &InitializeParams) -> Vec<PathBuf> {
    let folders: Vec<PathBuf> = params
        .workspace_folders
        .iter()
        .flatten()
        .filter_map(|folder| folder.uri.to_file_path().ok())
        .collect();
    if !folders.is_empty() {
        return folders;
    }

    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();
    root_uri
        .and_then(|uri| uri.to_file_path().ok())
        .into_iter()
        .collect()
}

fn variable_item(item: DvcYamlCompletionItem, range: Range) -> CompletionItem {
    CompletionItem {
        label: item.label,
        kind: Some(CompletionItemKind::VARIABLE),
        filter_text: Some(item.completion.clone()),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(range, item.completion))),
        ..Default::default()
    }
}

fn snippet_item(template: SnippetTemplate) -> CompletionItem {
    CompletionItem {
        label: template.label,
        kind: Some(CompletionItemKind::SNIPPET),
        insert_text: Some(template.body),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        ..Default::default()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.client
            .log_message(MessageType::INFO, "LSP server initializing")
            .await;

        *self.settings.write().await =
            ServerSettings::from_initialization_options(params.initialization_options.clone());

        let roots = workspace_roots(&params);
        info!("Workspace roots: {:?}", roots);
        self.documents.set_roots(roots).await;

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "dvc-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "LSP server initialized")
            .await;

        let settings = self.settings.read().await.clone();
        if !settings.check_cli_version {
            info!("CLI version check disabled by settings");
            return;
        }

        let cwd = self.workspace_dir().await;
        self.spawn_version_check(settings, cwd);
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdown.cancel();
        self.client
            .log_message(MessageType::INFO, "LSP server shutting down")
            .await;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        let language = DocumentLanguage::detect(&document.language_id, document.uri.as_str());

        self.client
            .log_message(MessageType::LOG, format!("Document opened: {}", document.uri))
            .await;

        self.documents
            .upsert(document.uri, language, document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };

        let language = match self.documents.language_of(&uri).await {
            Some(language) => language,
            None => DocumentLanguage::from_path(uri.path()),
        };
        self.documents.upsert(uri, language, change.text).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        if !is_dvc_yaml_uri(&uri) {
            return Ok(None);
        }
        let Some(document) = self.documents.get(&uri).await else {
            warn!("Completion requested for unknown document {}", uri);
            return Ok(None);
        };

        let line = line_prefix(&document.text, position);

        let items: Vec<CompletionItem> = match trailing_fragment(line) {
            Some(fragment) => {
                let workspace = DocumentWorkspace::for_document(self.documents.clone(), &uri);
                let mut support = DvcYamlSupport::new(workspace, &document.text);
                support.init().await;

                let width = fragment.encode_utf16().count() as u32;
                let range = Range::new(
                    Position::new(position.line, position.character.saturating_sub(width)),
                    position,
                );

                support
                    .provide_completions(line)
                    .into_iter()
                    .map(|item| variable_item(item, range))
                    .collect()
            }
            None => {
                let python_files = match document_dir(&uri) {
                    Some(dir) => python_file_paths(&self.documents, &dir).await,
                    None => Vec::new(),
                };

                snippet_templates(&python_files)
                    .into_iter()
                    .map(snippet_item)
                    .collect()
            }
        };

        debug!("Returning {} completions for {}", items.len(), uri);
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        Ok(self.definitions(params.text_document_position_params).await)
    }

    async fn goto_declaration(
        &self,
        params: GotoDeclarationParams,
    ) -> Result<Option<GotoDeclarationResponse>> {
        Ok(self.definitions(params.text_document_position_params).await)
    }
}
