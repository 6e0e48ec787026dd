//! dvc.yaml completion E2E tests

mod helper;

use tower_lsp::lsp_types::*;

use helper::{
    call, create_did_change_notification, create_did_open_notification,
    create_multi_root_initialize_request, create_position_request, create_service, file_uri,
    initialize, initialize_with, spawn_notification_collector, wait_for_notification,
};
use tower::Service;

const PARAMS_YAML: &str = "featurize:\n  max_features: 200\n  ngrams: 2\ntrain:\n  seed: 20170428\n";

fn completion_items(result: serde_json::Value) -> Vec<CompletionItem> {
    match serde_json::from_value::<Option<CompletionResponse>>(result).unwrap() {
        Some(CompletionResponse::Array(items)) => items,
        Some(CompletionResponse::List(list)) => list.items,
        None => Vec::new(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn completes_variables_from_params_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("params.yaml"), PARAMS_YAML).unwrap();

    let (mut service, socket) = create_service(dir.path());
    let mut notification_rx = spawn_notification_collector(socket);
    initialize(&mut service, dir.path()).await;

    let dvc_yaml = file_uri(&dir.path().join("dvc.yaml"));
    let text = "stages:\n  featurize:\n    cmd: python featurize.py ${featurize.\n";
    service
        .call(create_did_open_notification(&dvc_yaml, "yaml", text))
        .await
        .unwrap();
    wait_for_notification(&mut notification_rx, "window/logMessage")
        .await
        .expect("Expected logMessage notification");

    let result = call(
        &mut service,
        create_position_request("textDocument/completion", 2, &dvc_yaml, 2, 41),
    )
    .await;
    let items = completion_items(result);

    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["max_features", "ngrams"]);

    let range = Range::new(Position::new(2, 31), Position::new(2, 41));
    assert_eq!(
        items[1].text_edit,
        Some(CompletionTextEdit::Edit(TextEdit::new(
            range,
            "featurize.ngrams".to_string()
        )))
    );
    assert_eq!(items[1].kind, Some(CompletionItemKind::VARIABLE));
}

#[tokio::test(flavor = "multi_thread")]
async fn open_documents_and_inline_vars_are_both_offered() {
    let dir = tempfile::tempdir().unwrap();

    let (mut service, socket) = create_service(dir.path());
    let _notification_rx = spawn_notification_collector(socket);
    initialize(&mut service, dir.path()).await;

    // params.yaml is only open in the editor, not saved to disk
    let params = file_uri(&dir.path().join("params.yaml"));
    service
        .call(create_did_open_notification(&params, "yaml", PARAMS_YAML))
        .await
        .unwrap();

    let dvc_yaml = file_uri(&dir.path().join("dvc.yaml"));
    let text = "vars:\n  - threshold: 0.5\nstages:\n  train:\n    cmd: python train.py ${t\n";
    service
        .call(create_did_open_notification(&dvc_yaml, "yaml", text))
        .await
        .unwrap();

    let result = call(
        &mut service,
        create_position_request("textDocument/completion", 2, &dvc_yaml, 4, 28),
    )
    .await;
    let items = completion_items(result);

    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["train", "threshold"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn completes_in_every_workspace_folder() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let (mut service, socket) = create_service(first.path());
    let _notification_rx = spawn_notification_collector(socket);
    initialize_with(
        &mut service,
        create_multi_root_initialize_request(1, &[first.path(), second.path()]),
    )
    .await;

    let dvc_yaml = file_uri(&second.path().join("dvc.yaml"));
    let text = "vars:\n  - seed: 1\nstages:\n  train:\n    cmd: python train.py ${se\n";
    service
        .call(create_did_open_notification(&dvc_yaml, "yaml", text))
        .await
        .unwrap();

    let result = call(
        &mut service,
        create_position_request("textDocument/completion", 2, &dvc_yaml, 4, 29),
    )
    .await;
    let items = completion_items(result);

    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["seed"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn changes_replace_the_document_text() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("params.yaml"), PARAMS_YAML).unwrap();

    let (mut service, socket) = create_service(dir.path());
    let _notification_rx = spawn_notification_collector(socket);
    initialize(&mut service, dir.path()).await;

    let dvc_yaml = file_uri(&dir.path().join("dvc.yaml"));
    service
        .call(create_did_open_notification(&dvc_yaml, "yaml", "stages:\n"))
        .await
        .unwrap();
    service
        .call(create_did_change_notification(
            &dvc_yaml,
            2,
            "stages:\n  train:\n    cmd: python train.py ${train.\n",
        ))
        .await
        .unwrap();

    let result = call(
        &mut service,
        create_position_request("textDocument/completion", 2, &dvc_yaml, 2, 33),
    )
    .await;
    let items = completion_items(result);

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "seed");
}

#[tokio::test(flavor = "multi_thread")]
async fn offers_snippets_without_a_fragment() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("train.py"), "").unwrap();

    let (mut service, socket) = create_service(dir.path());
    let _notification_rx = spawn_notification_collector(socket);
    initialize(&mut service, dir.path()).await;

    let dvc_yaml = file_uri(&dir.path().join("dvc.yaml"));
    service
        .call(create_did_open_notification(&dvc_yaml, "yaml", "stages:\n  \n"))
        .await
        .unwrap();

    let result = call(
        &mut service,
        create_position_request("textDocument/completion", 2, &dvc_yaml, 1, 2),
    )
    .await;
    let items = completion_items(result);

    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["stages", "Add stage", "cmd: train.py"]);
    assert!(
        items
            .iter()
            .all(|item| item.insert_text_format == Some(InsertTextFormat::SNIPPET))
    );
    assert_eq!(
        items[2].insert_text.as_deref(),
        Some("cmd: python train.py $1\n")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn other_documents_get_no_completions() {
    let dir = tempfile::tempdir().unwrap();

    let (mut service, socket) = create_service(dir.path());
    let _notification_rx = spawn_notification_collector(socket);
    initialize(&mut service, dir.path()).await;

    let params = file_uri(&dir.path().join("params.yaml"));
    service
        .call(create_did_open_notification(&params, "yaml", PARAMS_YAML))
        .await
        .unwrap();

    let result = call(
        &mut service,
        create_position_request("textDocument/completion", 2, &params, 1, 5),
    )
    .await;

    assert!(result.is_null());
}
