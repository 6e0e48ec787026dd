use crate::log::init;
use tower_lsp::{LspService, Server};
use tracing::info;

use crate::lsp::backend::Backend;

pub async fn run_server() -> anyhow::Result<()> {
    let _guard = init()?;

    info!("Starting dvc-lsp server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    info!("dvc-lsp server stopped");
    Ok(())
}
