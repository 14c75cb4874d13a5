//! One PMD run, from configuration checks to published diagnostics.

use std::fmt;
use std::path::{Path, PathBuf};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::command::CommandBuilder;
use crate::config::Config;
use crate::linter::aggregate::aggregate;
use crate::linter::diagnostics::build_diagnostic;
use crate::linter::ranges::{RangeError, narrow_to_line_content};
use crate::linter::sink::{DiagnosticsSink, DocumentSource, FsDocuments, StatusIndicator};
use crate::process::{ProcessError, ProcessExecutor, ProcessOutput, ShellExecutor};

/// Upper bound on files read at the same time.
const MAX_CONCURRENT_READS: usize = 16;

/// Target under which saved reports are tracked.
const SAVED_REPORT: &str = "-";

/// Problems with the configuration that prevent PMD from being started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    PmdPathNotSet,
    PmdPathNotDirectory(PathBuf),
    RulesetNotSet,
    RulesetNotFound(PathBuf),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PmdPathNotSet => {
                write!(f, "PMD path not set. Please see the installation instructions.")
            }
            Self::PmdPathNotDirectory(path) => write!(
                f,
                "PMD path {} is not a directory. Please see the installation instructions.",
                path.display()
            ),
            Self::RulesetNotSet => write!(f, "No ruleset configured."),
            Self::RulesetNotFound(path) => write!(
                f,
                "No ruleset found at {}. Ensure the configuration is correct or change back to the default.",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Why a run ended without publishing anything.
#[derive(Debug)]
pub enum RunError {
    Config(ConfigError),
    /// The process failed and produced no output to work with
    Process(ProcessError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{}", e),
            Self::Process(e) => write!(f, "PMD failed: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Process(e) => Some(e),
        }
    }
}

/// What happened during a completed run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Command line handed to the shell (absent when processing a saved report)
    pub command: Option<String>,
    pub stdout: String,
    pub stderr: String,
    /// Process failure that still left output behind
    pub process_error: Option<ProcessError>,
    /// Count shown on the status indicator: non-blank output lines minus the header row
    pub issue_count: usize,
    pub diagnostic_count: usize,
    pub skipped_lines: usize,
    pub range_errors: Vec<(String, RangeError)>,
    pub published: Vec<String>,
    pub unreadable: Vec<String>,
}

#[derive(Debug)]
pub enum RunState {
    Idle,
    CommandBuilt(String),
    Executing,
    Completed(RunReport),
    Failed(RunError),
    /// A newer run started before this one could publish
    Cancelled,
}

impl RunState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CommandBuilt(_) => "command-built",
            Self::Executing => "executing",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }

    pub fn into_report(self) -> Option<RunReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RunError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// One run against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId {
    target: PathBuf,
    seq: u64,
}

impl RunId {
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.seq, self.target.display())
    }
}

/// Latest run started for each target.
///
/// Runners that share a generation drop the results of a run once a newer
/// run on the same target has started. Runs on other targets never
/// supersede each other.
#[derive(Debug, Clone, Default)]
pub struct RunGeneration(Arc<Mutex<HashMap<PathBuf, u64>>>);

impl RunGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, target: &Path) -> RunId {
        let mut latest = self.latest();
        let seq = latest.entry(target.to_path_buf()).or_default();
        *seq += 1;
        RunId {
            target: target.to_path_buf(),
            seq: *seq,
        }
    }

    pub fn is_current(&self, run: &RunId) -> bool {
        self.latest().get(&run.target) == Some(&run.seq)
    }

    fn latest(&self) -> MutexGuard<'_, HashMap<PathBuf, u64>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Check that the PMD installation and the ruleset exist.
///
/// Returns the installation directory and the ruleset path.
pub async fn check_preconditions(config: &Config) -> Result<(PathBuf, PathBuf), ConfigError> {
    let pmd_path = config
        .pmd_path
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ConfigError::PmdPathNotSet)?;
    if !is_dir(pmd_path).await {
        return Err(ConfigError::PmdPathNotDirectory(pmd_path.clone()));
    }

    let ruleset = config
        .ruleset
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ConfigError::RulesetNotSet)?;
    if !is_file(ruleset).await {
        return Err(ConfigError::RulesetNotFound(ruleset.clone()));
    }

    Ok((pmd_path.clone(), ruleset.clone()))
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Non-blank lines of PMD's standard output.
pub fn non_blank_lines(stdout: &str) -> Vec<&str> {
    stdout
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect()
}

fn enter(run: &RunId, state: &RunState) {
    log::debug!("Run {}: {}", run, state.name());
}

pub struct LintRunner<E = ShellExecutor, D = FsDocuments> {
    config: Config,
    executor: E,
    documents: Arc<D>,
    generation: RunGeneration,
}

impl LintRunner {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            executor: ShellExecutor,
            documents: Arc::new(FsDocuments),
            generation: RunGeneration::new(),
        }
    }
}

impl<E: ProcessExecutor, D: DocumentSource> LintRunner<E, D> {
    pub fn with_executor<E2: ProcessExecutor>(self, executor: E2) -> LintRunner<E2, D> {
        LintRunner {
            config: self.config,
            executor,
            documents: self.documents,
            generation: self.generation,
        }
    }

    pub fn with_documents<D2: DocumentSource>(self, documents: Arc<D2>) -> LintRunner<E, D2> {
        LintRunner {
            config: self.config,
            executor: self.executor,
            documents,
            generation: self.generation,
        }
    }

    pub fn with_generation(mut self, generation: RunGeneration) -> Self {
        self.generation = generation;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn generation(&self) -> &RunGeneration {
        &self.generation
    }

    /// The command a run against `target` would execute.
    pub async fn command_for(&self, target: &Path) -> Result<String, ConfigError> {
        let (install_dir, ruleset) = check_preconditions(&self.config).await?;
        Ok(CommandBuilder::from_config(&self.config, &install_dir, &ruleset).build(target))
    }

    /// Run PMD against `target` and publish its findings.
    pub async fn run<S, I>(&self, target: &Path, sink: &S, status: &I) -> RunState
    where
        S: DiagnosticsSink,
        I: StatusIndicator,
    {
        let run = self.generation.begin(target);
        enter(&run, &RunState::Idle);

        let command = match self.command_for(target).await {
            Ok(command) => command,
            Err(e) => {
                log::error!("{}", e);
                return RunState::Failed(RunError::Config(e));
            }
        };
        log::info!("PMD command: {}", command);
        enter(&run, &RunState::CommandBuilt(command.clone()));

        enter(&run, &RunState::Executing);
        let ProcessOutput {
            stdout,
            stderr,
            error,
        } = self.executor.execute(&command, self.config.timeout()).await;

        log::debug!("stdout: {}", stdout);
        log::debug!("stderr: {}", stderr);

        let process_error = match error {
            Some(e) if stdout.trim().is_empty() => {
                log::error!("PMD failed without output: {}", e);
                if self.generation.is_current(&run) {
                    status.update(0).await;
                }
                return RunState::Failed(RunError::Process(e));
            }
            Some(e) => {
                log::warn!("PMD reported an error: {}", e);
                Some(e)
            }
            None => None,
        };

        let report = RunReport {
            command: Some(command),
            stderr,
            process_error,
            ..Default::default()
        };
        self.publish(run, stdout, report, sink, status).await
    }

    /// Process a PMD CSV report produced elsewhere as if a run had just
    /// captured it.
    pub async fn publish_output<S, I>(&self, stdout: String, sink: &S, status: &I) -> RunState
    where
        S: DiagnosticsSink,
        I: StatusIndicator,
    {
        let run = self.generation.begin(Path::new(SAVED_REPORT));
        enter(&run, &RunState::Idle);
        self.publish(run, stdout, RunReport::default(), sink, status)
            .await
    }

    async fn publish<S, I>(
        &self,
        run: RunId,
        stdout: String,
        mut report: RunReport,
        sink: &S,
        status: &I,
    ) -> RunState
    where
        S: DiagnosticsSink,
        I: StatusIndicator,
    {
        if !self.generation.is_current(&run) {
            return cancelled(&run);
        }

        let lines = non_blank_lines(&stdout);
        report.issue_count = lines.len().saturating_sub(1);
        status.update(report.issue_count).await;

        let thresholds = self.config.thresholds();
        let mut findings = Vec::with_capacity(lines.len());
        for line in &lines {
            match build_diagnostic(line, &thresholds) {
                Some(finding) => findings.push(finding),
                None => report.skipped_lines += 1,
            }
        }

        let groups = aggregate(findings);
        report.diagnostic_count = groups.total();
        report.stdout = stdout;

        let permits = Arc::new(Semaphore::new(MAX_CONCURRENT_READS));
        let mut reads = JoinSet::new();
        for (path, diagnostics) in groups {
            let documents = Arc::clone(&self.documents);
            let permits = Arc::clone(&permits);
            reads.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let content = documents.read(Path::new(&path)).await;
                (path, diagnostics, content)
            });
        }

        while let Some(joined) = reads.join_next().await {
            let (path, mut diagnostics, content) = match joined {
                Ok(read) => read,
                Err(e) => {
                    log::error!("Reading a reported file failed: {}", e);
                    continue;
                }
            };

            let text = match content {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Could not open {}: {}", path, e);
                    report.unreadable.push(path);
                    continue;
                }
            };

            for diagnostic in &mut diagnostics {
                if let Err(e) = narrow_to_line_content(diagnostic, &text) {
                    log::warn!("{}: {}", path, e);
                    report.range_errors.push((path.clone(), e));
                }
            }

            if !self.generation.is_current(&run) {
                reads.abort_all();
                return cancelled(&run);
            }

            sink.replace(&path, diagnostics).await;
            report.published.push(path);
        }

        log::info!(
            "PMD reported {} issue(s); published {} diagnostic(s) for {} file(s)",
            report.issue_count,
            report.diagnostic_count,
            report.published.len()
        );

        let state = RunState::Completed(report);
        enter(&run, &state);
        state
    }
}

fn cancelled(run: &RunId) -> RunState {
    let state = RunState::Cancelled;
    enter(run, &state);
    log::info!("Run {} was superseded, dropping its results", run);
    state
}
