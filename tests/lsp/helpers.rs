//! Test helpers for LSP integration testing
//!
//! This module provides utilities to test LSP functionality in-memory
//! without spawning the binary or dealing with stdio protocol.

use std::sync::Arc;
use tower_lsp_server::ls_types::*;
use tower_lsp_server::{LanguageServer, LspService};

use apex_pmd::config::Config;
use apex_pmd::lsp::ApexPmdLsp;

/// Test harness for LSP integration tests.
///
/// Wraps an `ApexPmdLsp` instance created via `LspService::new`.
pub struct TestLspServer {
    lsp: Arc<ApexPmdLsp>,
}

impl TestLspServer {
    /// Create a new test LSP server.
    ///
    /// This creates a real `ApexPmdLsp` instance with a real `Client`,
    /// using the same `LspService::new` pattern as production code.
    pub fn new() -> Self {
        // Use Arc to share ownership between the closure and our return value
        let lsp_arc: Arc<std::sync::Mutex<Option<Arc<ApexPmdLsp>>>> =
            Arc::new(std::sync::Mutex::new(None));
        let lsp_arc_clone = Arc::clone(&lsp_arc);

        let (_service, _socket) = LspService::new(move |client| {
            let lsp = Arc::new(ApexPmdLsp::new(client));
            *lsp_arc_clone.lock().unwrap() = Some(Arc::clone(&lsp));

            LspWrapper { inner: lsp }
        });

        let lsp = lsp_arc
            .lock()
            .unwrap()
            .take()
            .expect("ApexPmdLsp should have been initialized");

        Self { lsp }
    }

    /// Simulates the `initialize` request.
    pub async fn initialize(&self, params: InitializeParams) -> InitializeResult {
        self.lsp.initialize(params).await.unwrap()
    }

    /// Open a document with the given URI and content.
    ///
    /// Simulates the `textDocument/didOpen` notification.
    pub async fn open_document(&self, uri: &str, content: &str) {
        let params = DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.parse().unwrap(),
                language_id: "apex".to_string(),
                version: 0,
                text: content.to_string(),
            },
        };

        self.lsp.did_open(params).await;
    }

    /// Replace the whole content of a document.
    ///
    /// Simulates the `textDocument/didChange` notification with FULL sync.
    pub async fn change_document(&self, uri: &str, content: &str) {
        let params = DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.parse().unwrap(),
                version: 1,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: content.to_string(),
            }],
        };

        self.lsp.did_change(params).await;
    }

    /// Simulates the `textDocument/didSave` notification.
    pub async fn save_document(&self, uri: &str) {
        let params = DidSaveTextDocumentParams {
            text_document: TextDocumentIdentifier {
                uri: uri.parse().unwrap(),
            },
            text: None,
        };

        self.lsp.did_save(params).await;
    }

    /// Close a document.
    ///
    /// Simulates the `textDocument/didClose` notification.
    pub async fn close_document(&self, uri: &str) {
        let params = DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier {
                uri: uri.parse().unwrap(),
            },
        };

        self.lsp.did_close(params).await;
    }

    /// Simulates the `workspace/executeCommand` request.
    pub async fn execute_command(
        &self,
        command: &str,
    ) -> tower_lsp_server::jsonrpc::Result<Option<LSPAny>> {
        let params = ExecuteCommandParams {
            command: command.to_string(),
            arguments: vec![],
            work_done_progress_params: WorkDoneProgressParams::default(),
        };

        self.lsp.execute_command(params).await
    }

    /// Get the current content of a document from the server's state.
    pub async fn get_document_content(&self, uri: &str) -> Option<String> {
        let doc_map = self.lsp.document_map();
        let docs = doc_map.lock().await;
        docs.get(uri).map(|state| state.text.clone())
    }

    /// Configuration the server would run PMD with.
    pub async fn config(&self) -> Config {
        self.lsp.load_config().await
    }
}

/// Wrapper that delegates all LanguageServer methods to the inner Arc<ApexPmdLsp>.
///
/// This is needed because LspService requires ownership of the LanguageServer impl,
/// but we also need to retain a reference for testing.
struct LspWrapper {
    inner: Arc<ApexPmdLsp>,
}

impl LanguageServer for LspWrapper {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> tower_lsp_server::jsonrpc::Result<InitializeResult> {
        self.inner.initialize(params).await
    }

    async fn initialized(&self, params: InitializedParams) {
        self.inner.initialized(params).await
    }

    async fn shutdown(&self) -> tower_lsp_server::jsonrpc::Result<()> {
        self.inner.shutdown().await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.inner.did_open(params).await
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.inner.did_change(params).await
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        self.inner.did_save(params).await
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.inner.did_close(params).await
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> tower_lsp_server::jsonrpc::Result<Option<LSPAny>> {
        self.inner.execute_command(params).await
    }
}

/// `file://` URI for a local path.
pub fn file_uri(path: &std::path::Path) -> String {
    format!("file://{}", path.display())
}
