//! Language server that runs PMD when Apex files are opened or saved.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_lsp_server::ls_types::MessageType;
use tower_lsp_server::{Client, LspService, Server};

use crate::config::{self, Config, ConfigOverrides};
use crate::linter::{LintRunner, RunError, RunGeneration, RunState};

mod conversions;
mod documents;
mod server;
mod sink;

pub use documents::OpenDocuments;
pub use sink::{LspSink, StatusNotification, StatusParams};

/// Command that runs PMD on the whole workspace.
pub const RUN_WORKSPACE_COMMAND: &str = "apex-pmd.runWorkspace";

#[derive(Debug, Clone)]
pub struct DocumentState {
    pub text: String,
    /// Filesystem path of the document, when its URI has one
    pub path: Option<PathBuf>,
}

pub struct ApexPmdLsp {
    client: Client,
    // Keyed by URI string
    document_map: Arc<Mutex<HashMap<String, DocumentState>>>,
    workspace_root: Arc<Mutex<Option<PathBuf>>>,
    overrides: Arc<Mutex<ConfigOverrides>>,
    generation: RunGeneration,
}

impl ApexPmdLsp {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            document_map: Arc::new(Mutex::new(HashMap::new())),
            workspace_root: Arc::new(Mutex::new(None)),
            overrides: Arc::new(Mutex::new(ConfigOverrides::default())),
            generation: RunGeneration::new(),
        }
    }

    pub fn document_map(&self) -> Arc<Mutex<HashMap<String, DocumentState>>> {
        Arc::clone(&self.document_map)
    }

    pub async fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root.lock().await.clone()
    }

    /// Configuration from the workspace with initialization options applied.
    pub async fn load_config(&self) -> Config {
        let workspace_root = self.workspace_root.lock().await.clone();
        let mut config = match workspace_root {
            Some(root) => match config::load(None, &root) {
                Ok((config, path)) => {
                    if let Some(p) = path {
                        self.client
                            .log_message(
                                MessageType::INFO,
                                format!("Loaded config from {}", p.display()),
                            )
                            .await;
                    }
                    config
                }
                Err(e) => {
                    self.client
                        .log_message(
                            MessageType::WARNING,
                            format!("Failed to load config: {}", e),
                        )
                        .await;
                    Config::default()
                }
            },
            None => Config::default(),
        };

        self.overrides.lock().await.clone().apply(&mut config);
        config
    }

    /// Run PMD on `target` and publish the results to the client.
    pub(crate) async fn run_pmd(&self, config: Config, target: PathBuf) {
        let documents = Arc::new(OpenDocuments::new(Arc::clone(&self.document_map)));
        let runner = LintRunner::new(config)
            .with_documents(documents)
            .with_generation(self.generation.clone());
        let sink = LspSink::new(self.client.clone());

        match runner.run(&target, &sink, &sink).await {
            RunState::Completed(report) => {
                if let Some(command) = &report.command {
                    self.client
                        .log_message(MessageType::INFO, format!("PMD command: {}", command))
                        .await;
                }
                self.client
                    .log_message(MessageType::LOG, format!("stdout: {}", report.stdout))
                    .await;
                self.client
                    .log_message(MessageType::LOG, format!("stderr: {}", report.stderr))
                    .await;
                if let Some(e) = &report.process_error {
                    self.client
                        .log_message(MessageType::WARNING, format!("PMD reported an error: {}", e))
                        .await;
                }
                for path in &report.unreadable {
                    self.client
                        .log_message(MessageType::WARNING, format!("Could not open {}", path))
                        .await;
                }
            }
            RunState::Failed(RunError::Config(e)) => {
                self.client.show_message(MessageType::ERROR, e.to_string()).await;
            }
            RunState::Failed(e) => {
                self.client.log_message(MessageType::ERROR, e.to_string()).await;
                self.client.show_message(MessageType::ERROR, e.to_string()).await;
            }
            state => {
                log::debug!("PMD run on {} ended {}", target.display(), state.name());
            }
        }
    }
}

pub async fn run() -> std::io::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(ApexPmdLsp::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
