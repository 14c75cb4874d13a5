use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_lsp_server::Client;
use tower_lsp_server::ls_types::*;

use crate::linter::DocumentSource;
use crate::lsp::DocumentState;

/// Reads files from open editor buffers, falling back to disk.
pub struct OpenDocuments {
    documents: Arc<Mutex<HashMap<String, DocumentState>>>,
}

impl OpenDocuments {
    pub fn new(documents: Arc<Mutex<HashMap<String, DocumentState>>>) -> Self {
        Self { documents }
    }

    async fn buffer(&self, path: &Path) -> Option<String> {
        let documents = self.documents.lock().await;
        documents
            .values()
            .find(|doc| doc.path.as_deref() == Some(path))
            .map(|doc| doc.text.clone())
    }
}

impl DocumentSource for OpenDocuments {
    async fn read(&self, path: &Path) -> io::Result<String> {
        if let Some(text) = self.buffer(path).await {
            return Ok(text);
        }
        tokio::fs::read_to_string(path).await
    }
}

/// Handle textDocument/didOpen notification
pub(crate) async fn did_open(
    client: &Client,
    document_map: &Arc<Mutex<HashMap<String, DocumentState>>>,
    params: &DidOpenTextDocumentParams,
) {
    let uri = params.text_document.uri.to_string();
    let path = params
        .text_document
        .uri
        .to_file_path()
        .map(|p| p.into_owned());

    document_map.lock().await.insert(
        uri.clone(),
        DocumentState {
            text: params.text_document.text.clone(),
            path,
        },
    );

    client
        .log_message(MessageType::INFO, format!("Opened document: {}", uri))
        .await;
}

/// Handle textDocument/didChange notification (full sync)
pub(crate) async fn did_change(
    document_map: &Arc<Mutex<HashMap<String, DocumentState>>>,
    params: DidChangeTextDocumentParams,
) {
    let uri = params.text_document.uri.to_string();
    let mut document_map = document_map.lock().await;
    if let Some(doc_state) = document_map.get_mut(&uri)
        && let Some(change) = params.content_changes.into_iter().last()
    {
        doc_state.text = change.text;
    }
}

/// Handle textDocument/didClose notification
pub(crate) async fn did_close(
    client: &Client,
    document_map: &Arc<Mutex<HashMap<String, DocumentState>>>,
    params: DidCloseTextDocumentParams,
) {
    let uri = params.text_document.uri.to_string();
    document_map.lock().await.remove(&uri);

    // Clear diagnostics
    client
        .publish_diagnostics(params.text_document.uri, vec![], None)
        .await;
}
