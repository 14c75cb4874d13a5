//! Run the PMD static analyzer on Apex sources and turn its CSV report into
//! per-file diagnostics.

pub mod command;
pub mod config;
pub mod linter;
#[cfg(feature = "lsp")]
pub mod lsp;
pub mod process;

pub use apex_pmd_report::{ProblemRecord, Severity, Thresholds, classify, parse_line};
pub use command::{CommandBuilder, build_command};
pub use config::{Config, ConfigBuilder, ConfigOverrides};
pub use linter::{Diagnostic, FileDiagnostics, LintRunner, RunState};
pub use process::{ProcessError, ProcessExecutor, ProcessOutput, ShellExecutor};

#[cfg(test)]
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
