pub mod aggregate;
pub mod diagnostics;
pub mod ranges;
pub mod runner;
pub mod sink;

pub use aggregate::{FileDiagnostics, aggregate};
pub use diagnostics::{Diagnostic, Position, Range, Severity, build_diagnostic};
pub use ranges::{RangeError, line_content_range, narrow_to_line_content};
pub use runner::{
    ConfigError, LintRunner, RunError, RunGeneration, RunId, RunReport, RunState,
    check_preconditions,
};
pub use sink::{
    DiagnosticsSink, DocumentSource, FsDocuments, MemorySink, MemoryStatus, StatusIndicator,
    status_text,
};

use apex_pmd_report::Thresholds;

/// Turn PMD CSV output into per-file diagnostics, without touching any file.
///
/// Ranges keep their placeholder columns; use [`narrow_to_line_content`] once
/// the file text is available.
pub fn diagnostics_from_output(stdout: &str, thresholds: &Thresholds) -> FileDiagnostics {
    runner::non_blank_lines(stdout)
        .into_iter()
        .filter_map(|line| build_diagnostic(line, thresholds))
        .collect()
}
