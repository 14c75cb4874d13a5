//! Seams between the run pipeline and whatever displays its results.

use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use crate::linter::diagnostics::Diagnostic;

/// Receives the diagnostics of one file, replacing whatever was published for
/// that file before.
pub trait DiagnosticsSink: Send + Sync {
    fn replace(&self, path: &str, diagnostics: Vec<Diagnostic>)
    -> impl Future<Output = ()> + Send;
}

/// Displays the number of issues found by the latest run.
pub trait StatusIndicator: Send + Sync {
    fn update(&self, count: usize) -> impl Future<Output = ()> + Send;
}

/// Provides the text of files named in PMD's report.
pub trait DocumentSource: Send + Sync + 'static {
    fn read(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;
}

/// Status bar text for `count` issues, or `None` when the indicator should be
/// hidden.
pub fn status_text(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("$(stop) 1 ISSUE".to_string()),
        n => Some(format!("$(stop) {} ISSUES", n)),
    }
}

/// Reads documents from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocuments;

impl DocumentSource for FsDocuments {
    async fn read(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

/// Keeps published diagnostics in memory, sorted by path.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<BTreeMap<String, Vec<Diagnostic>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<Diagnostic>> {
        match self.files.lock() {
            Ok(files) => files.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticsSink for MemorySink {
    async fn replace(&self, path: &str, diagnostics: Vec<Diagnostic>) {
        let mut files = match self.files.lock() {
            Ok(files) => files,
            Err(poisoned) => poisoned.into_inner(),
        };
        files.insert(path.to_string(), diagnostics);
    }
}

/// Remembers every count it was given.
#[derive(Debug, Default)]
pub struct MemoryStatus {
    counts: Mutex<Vec<usize>>,
}

impl MemoryStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<usize> {
        self.history().last().copied()
    }

    pub fn history(&self) -> Vec<usize> {
        match self.counts.lock() {
            Ok(counts) => counts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Text the status bar would show for the latest count.
    pub fn text(&self) -> Option<String> {
        self.last().and_then(status_text)
    }
}

impl StatusIndicator for MemoryStatus {
    async fn update(&self, count: usize) {
        match self.counts.lock() {
            Ok(mut counts) => counts.push(count),
            Err(poisoned) => poisoned.into_inner().push(count),
        }
    }
}
