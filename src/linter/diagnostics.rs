use apex_pmd_report::{ProblemRecord, Thresholds, parse_line};
use serde::Serialize;

pub use apex_pmd_report::Severity;

/// End column used before the real line length is known.
pub const PLACEHOLDER_END_COLUMN: u32 = 100;

/// Zero-based line and UTF-16 column, as editors count them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range covering `line` from column 0 to the placeholder end column.
    pub fn placeholder(line: u32) -> Self {
        Self::new(
            Position::new(line, 0),
            Position::new(line, PLACEHOLDER_END_COLUMN),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
    pub rule: String,
    pub ruleset: String,
    pub package: String,
    pub priority: Option<i64>,
}

impl Diagnostic {
    /// Convert a parsed record. Records without a line number yield `None`.
    pub fn from_record(record: &ProblemRecord, thresholds: &Thresholds) -> Option<Self> {
        let line = record.line_number?;

        Some(Self {
            range: Range::placeholder(line),
            message: record.message.clone(),
            severity: thresholds.classify(record.priority),
            rule: record.rule_name.clone(),
            ruleset: record.ruleset_name.clone(),
            package: record.package_name.clone(),
            priority: record.priority,
        })
    }

    pub fn line(&self) -> u32 {
        self.range.start.line
    }
}

/// Build a diagnostic from one line of PMD output, paired with the path of
/// the file it belongs to.
///
/// Returns `None` for lines that are not findings: malformed rows, the header
/// row, and rows whose line column is not a number. Each rejected line is
/// logged, the header row at debug level only.
pub fn build_diagnostic(line: &str, thresholds: &Thresholds) -> Option<(String, Diagnostic)> {
    let Some(record) = parse_line(line) else {
        log::warn!("Skipping unparseable line: {}", line);
        return None;
    };
    let Some(diagnostic) = Diagnostic::from_record(&record, thresholds) else {
        if record.is_header() {
            log::debug!("Skipping header row");
        } else {
            log::warn!("Skipping line without a line number: {}", line);
        }
        return None;
    };
    Some((record.file_path, diagnostic))
}
