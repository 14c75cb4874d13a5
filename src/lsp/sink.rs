use serde::{Deserialize, Serialize};
use tower_lsp_server::Client;
use tower_lsp_server::ls_types::MessageType;
use tower_lsp_server::ls_types::notification::Notification;

use crate::linter::{Diagnostic, DiagnosticsSink, StatusIndicator, status_text};

use super::conversions::{path_to_uri, to_lsp_diagnostic};

/// `apex-pmd/status`: issue count of the latest run, for a status bar item.
pub enum StatusNotification {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    pub count: usize,
    /// Text to show, or `None` to hide the item
    pub text: Option<String>,
}

impl Notification for StatusNotification {
    type Params = StatusParams;
    const METHOD: &'static str = "apex-pmd/status";
}

/// Publishes run results to the editor.
pub struct LspSink {
    client: Client,
}

impl LspSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DiagnosticsSink for LspSink {
    async fn replace(&self, path: &str, diagnostics: Vec<Diagnostic>) {
        let Some(uri) = path_to_uri(path) else {
            self.client
                .log_message(
                    MessageType::WARNING,
                    format!("Cannot publish diagnostics for {}: not a file path", path),
                )
                .await;
            return;
        };

        let diagnostics = diagnostics.iter().map(to_lsp_diagnostic).collect();
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}

impl StatusIndicator for LspSink {
    async fn update(&self, count: usize) {
        self.client
            .send_notification::<StatusNotification>(StatusParams {
                count,
                text: status_text(count),
            })
            .await;
    }
}
