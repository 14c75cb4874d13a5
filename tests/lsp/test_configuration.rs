//! Tests for configuration discovery and initialization options.

use super::helpers::*;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tower_lsp_server::ls_types::*;

#[tokio::test]
async fn test_initialization_options_override_defaults() {
    let server = TestLspServer::new();

    server
        .initialize(InitializeParams {
            initialization_options: Some(json!({
                "pmdPath": "/opt/pmd",
                "rulesetPath": "/opt/rules/apex.xml",
                "errorThreshold": 2,
                "warningThreshold": 4
            })),
            ..Default::default()
        })
        .await;

    let config = server.config().await;
    assert_eq!(config.pmd_path, Some(PathBuf::from("/opt/pmd")));
    assert_eq!(config.ruleset, Some(PathBuf::from("/opt/rules/apex.xml")));
    assert_eq!(config.error_threshold, 2);
    assert_eq!(config.warning_threshold, 4);
}

#[tokio::test]
async fn test_invalid_initialization_options_are_ignored() {
    let server = TestLspServer::new();

    server
        .initialize(InitializeParams {
            initialization_options: Some(json!({ "errorThreshold": "high" })),
            ..Default::default()
        })
        .await;

    let config = server.config().await;
    assert_eq!(config.error_threshold, 1);
    assert_eq!(config.warning_threshold, 3);
}

#[cfg(unix)]
#[tokio::test]
async fn test_workspace_config_is_discovered() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("apex-pmd.toml"),
        "pmd_path = \"tools/pmd\"\nwarning_threshold = 5\nrun_on_open = false\n",
    )
    .unwrap();

    let server = TestLspServer::new();
    server
        .initialize(InitializeParams {
            workspace_folders: Some(vec![WorkspaceFolder {
                uri: file_uri(root.path()).parse().unwrap(),
                name: "project".to_string(),
            }]),
            initialization_options: Some(json!({ "errorThreshold": 2 })),
            ..Default::default()
        })
        .await;

    let config = server.config().await;
    assert_eq!(config.pmd_path, Some(root.path().join("tools/pmd")));
    assert_eq!(config.error_threshold, 2);
    assert_eq!(config.warning_threshold, 5);
    assert!(!config.run_on_open);
}
