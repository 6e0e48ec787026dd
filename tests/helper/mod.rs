//! Shared helpers for driving the language server in e2e tests

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use futures::{Stream, StreamExt};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::Service;
use tower_lsp::jsonrpc::Request;
use tower_lsp::lsp_types::Url;
use tower_lsp::{ClientSocket, LspService};

use dvc_lsp::lsp::backend::Backend;

pub fn file_uri(path: &Path) -> Url {
    Url::from_file_path(path).unwrap()
}

/// Builds a service whose preferences live inside `data_dir`.
pub fn create_service(data_dir: &Path) -> (LspService<Backend>, ClientSocket) {
    let preferences_path = data_dir.join("preferences.json");
    LspService::build(|client| Backend::build(client, preferences_path)).finish()
}

pub fn create_initialize_request(id: i64, root: &Path) -> Request {
    create_initialize_request_with_options(id, root, json!({"checkCliVersion": false}))
}

pub fn create_initialize_request_with_options(id: i64, root: &Path, options: Value) -> Request {
    Request::build("initialize")
        .id(id)
        .params(json!({
            "processId": null,
            "rootUri": file_uri(root),
            "capabilities": {},
            "initializationOptions": options
        }))
        .finish()
}

/// Initialize request for a multi-root session with `roots` as workspace folders.
pub fn create_multi_root_initialize_request(id: i64, roots: &[&Path]) -> Request {
    let folders: Vec<Value> = roots
        .iter()
        .map(|root| json!({"uri": file_uri(root), "name": root.display().to_string()}))
        .collect();

    Request::build("initialize")
        .id(id)
        .params(json!({
            "processId": null,
            "rootUri": null,
            "workspaceFolders": folders,
            "capabilities": {},
            "initializationOptions": {"checkCliVersion": false}
        }))
        .finish()
}

pub fn create_initialized_notification() -> Request {
    Request::build("initialized").params(json!({})).finish()
}

pub fn create_did_open_notification(uri: &Url, language_id: &str, text: &str) -> Request {
    Request::build("textDocument/didOpen")
        .params(json!({
            "textDocument": {
                "uri": uri,
                "languageId": language_id,
                "version": 1,
                "text": text
            }
        }))
        .finish()
}

pub fn create_did_change_notification(uri: &Url, version: i32, text: &str) -> Request {
    Request::build("textDocument/didChange")
        .params(json!({
            "textDocument": {"uri": uri, "version": version},
            "contentChanges": [{"text": text}]
        }))
        .finish()
}

pub fn create_position_request(
    method: &'static str,
    id: i64,
    uri: &Url,
    line: u32,
    character: u32,
) -> Request {
    Request::build(method)
        .id(id)
        .params(json!({
            "textDocument": {"uri": uri},
            "position": {"line": line, "character": character}
        }))
        .finish()
}

/// Initializes the server rooted at `root`.
pub async fn initialize(service: &mut LspService<Backend>, root: &Path) {
    initialize_with(service, create_initialize_request(1, root)).await;
}

/// Sends `initialize_request` followed by the `initialized` notification.
pub async fn initialize_with(service: &mut LspService<Backend>, initialize_request: Request) {
    service.call(initialize_request).await.unwrap();
    service
        .call(create_initialized_notification())
        .await
        .unwrap();
}

/// Writes an executable `dvc` stand-in into `dir` that runs `body` with `sh`.
#[cfg(unix)]
pub fn fake_cli(dir: &Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("dvc");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Sends a request and returns the `result` of its response.
pub async fn call(service: &mut LspService<Backend>, request: Request) -> Value {
    let response = service
        .call(request)
        .await
        .unwrap()
        .expect("Expected a response");

    let (_, result) = response.into_parts();
    result.expect("Expected a successful response")
}

/// Forwards everything the server sends to the client into a channel.
pub fn spawn_notification_collector<S>(socket: S) -> mpsc::UnboundedReceiver<Request>
where
    S: Stream<Item = Request> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut socket = Box::pin(socket);
        while let Some(request) = socket.next().await {
            if tx.send(request).is_err() {
                break;
            }
        }
    });

    rx
}

pub async fn wait_for_notification(
    rx: &mut mpsc::UnboundedReceiver<Request>,
    method: &str,
) -> Option<Request> {
    wait_for_notification_within(rx, method, Duration::from_secs(5)).await
}

pub async fn wait_for_notification_within(
    rx: &mut mpsc::UnboundedReceiver<Request>,
    method: &str,
    timeout: Duration,
) -> Option<Request> {
    tokio::time::timeout(timeout, async {
        while let Some(request) = rx.recv().await {
            if request.method() == method {
                return Some(request);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}
