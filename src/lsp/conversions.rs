use std::path::Path;

use tower_lsp_server::ls_types::*;

use crate::linter;
use crate::linter::Severity as PmdSeverity;

pub(crate) const SOURCE: &str = "apex-pmd";

pub(crate) fn to_lsp_position(position: linter::Position) -> Position {
    Position {
        line: position.line,
        character: position.character,
    }
}

pub(crate) fn to_lsp_range(range: linter::Range) -> Range {
    Range {
        start: to_lsp_position(range.start),
        end: to_lsp_position(range.end),
    }
}

pub(crate) fn to_lsp_severity(severity: PmdSeverity) -> DiagnosticSeverity {
    match severity {
        PmdSeverity::Error => DiagnosticSeverity::ERROR,
        PmdSeverity::Warning => DiagnosticSeverity::WARNING,
        PmdSeverity::Hint => DiagnosticSeverity::HINT,
    }
}

/// Convert a PMD diagnostic to an LSP diagnostic. The rule name becomes the code.
pub(crate) fn to_lsp_diagnostic(diag: &linter::Diagnostic) -> Diagnostic {
    Diagnostic {
        range: to_lsp_range(diag.range),
        severity: Some(to_lsp_severity(diag.severity)),
        code: (!diag.rule.is_empty()).then(|| NumberOrString::String(diag.rule.clone())),
        source: Some(SOURCE.to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

pub(crate) fn path_to_uri(path: &str) -> Option<Uri> {
    Uri::from_file_path(Path::new(path))
}
