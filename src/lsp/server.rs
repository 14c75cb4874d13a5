use tower_lsp_server::LanguageServer;
use tower_lsp_server::jsonrpc::{Error, Result};
use tower_lsp_server::ls_types::*;

use super::{ApexPmdLsp, RUN_WORKSPACE_COMMAND, documents};
use crate::config::ConfigOverrides;

impl LanguageServer for ApexPmdLsp {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Store workspace root for config discovery
        // Try workspace_folders first, fall back to deprecated root_uri
        if let Some(folders) = params.workspace_folders
            && let Some(folder) = folders.first()
            && let Some(path) = folder.uri.to_file_path()
        {
            *self.workspace_root.lock().await = Some(path.into_owned());
        } else {
            #[allow(deprecated)]
            if let Some(root_uri) = params.root_uri
                && let Some(path) = root_uri.to_file_path()
            {
                *self.workspace_root.lock().await = Some(path.into_owned());
            }
        }

        if let Some(options) = params.initialization_options {
            match serde_json::from_value::<ConfigOverrides>(options) {
                Ok(overrides) => *self.overrides.lock().await = overrides,
                Err(e) => {
                    self.client
                        .log_message(
                            MessageType::WARNING,
                            format!("Ignoring invalid initialization options: {}", e),
                        )
                        .await;
                }
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                        ..Default::default()
                    },
                )),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![RUN_WORKSPACE_COMMAND.to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "apex-pmd-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "apex-pmd LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        documents::did_open(&self.client, &self.document_map, &params).await;

        let config = self.load_config().await;
        if !config.run_on_open {
            return;
        }
        if let Some(path) = params.text_document.uri.to_file_path() {
            self.run_pmd(config, path.into_owned()).await;
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        documents::did_change(&self.document_map, params).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let config = self.load_config().await;
        if !config.run_on_save {
            return;
        }
        if let Some(path) = params.text_document.uri.to_file_path() {
            self.run_pmd(config, path.into_owned()).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        documents::did_close(&self.client, &self.document_map, params).await;
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<LSPAny>> {
        if params.command != RUN_WORKSPACE_COMMAND {
            return Err(Error::invalid_params(format!(
                "Unknown command: {}",
                params.command
            )));
        }

        let Some(root) = self.workspace_root().await else {
            self.client
                .show_message(MessageType::ERROR, "No workspace folder is open")
                .await;
            return Ok(None);
        };

        let config = self.load_config().await;
        self.run_pmd(config, root).await;
        Ok(None)
    }
}
