//! Parsing of single rows from PMD's CSV report.
//!
//! PMD's `csv` renderer writes one finding per line, every field wrapped in
//! double quotes, in a fixed column order (see [`COLUMNS`]).

use std::sync::LazyLock;

use regex::Regex;

/// Column order of PMD's CSV renderer.
pub const COLUMNS: [&str; 8] = [
    "problem",
    "package",
    "file",
    "priority",
    "line",
    "description",
    "ruleset",
    "rule",
];

const PACKAGE: usize = 1;
const FILE: usize = 2;
const PRIORITY: usize = 3;
const LINE: usize = 4;
const DESCRIPTION: usize = 5;
const RULESET: usize = 6;
const RULE: usize = 7;

static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new("[ ]+").expect("valid regex"));

/// One finding reported by PMD.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProblemRecord {
    /// 0-based line of the finding. `None` when the column is not a positive integer.
    pub line_number: Option<u32>,
    pub message: String,
    /// PMD priority (1 is the most severe). `None` when the column is not numeric.
    pub priority: Option<i64>,
    pub file_path: String,
    pub package_name: String,
    pub ruleset_name: String,
    pub rule_name: String,
}

impl ProblemRecord {
    /// Whether this is PMD's header row rather than a finding.
    pub fn is_header(&self) -> bool {
        self.line_number.is_none()
            && self.file_path.eq_ignore_ascii_case("file")
            && self.rule_name.eq_ignore_ascii_case("rule")
    }
}

/// Parse one line of PMD CSV output.
///
/// Returns `None` when the line does not hold exactly eight double-quoted
/// fields. Callers are expected to skip such lines.
pub fn parse_line(line: &str) -> Option<ProblemRecord> {
    let line = line.trim();
    if !fields_are_quoted(line) {
        log::trace!("Rejecting line with unquoted fields: {}", line);
        return None;
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            log::debug!("CSV error in line {:?}: {}", line, e);
            return None;
        }
    }

    if record.len() != COLUMNS.len() {
        log::trace!(
            "Expected {} columns, found {} in line: {}",
            COLUMNS.len(),
            record.len(),
            line
        );
        return None;
    }

    let line_number = record[LINE]
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|line| line.checked_sub(1));

    Some(ProblemRecord {
        line_number,
        message: collapse_spaces(&record[DESCRIPTION]),
        priority: record[PRIORITY].trim().parse::<i64>().ok(),
        file_path: record[FILE].to_string(),
        package_name: record[PACKAGE].to_string(),
        ruleset_name: record[RULESET].to_string(),
        rule_name: record[RULE].to_string(),
    })
}

/// Collapse runs of spaces into a single space. Tabs and newlines are kept.
pub fn collapse_spaces(text: &str) -> String {
    SPACE_RUNS.replace_all(text, " ").into_owned()
}

/// Check that every comma-separated field of `line` is wrapped in double
/// quotes, with `""` as the only escape inside a field.
fn fields_are_quoted(line: &str) -> bool {
    let mut chars = line.chars().peekable();

    loop {
        if chars.next() != Some('"') {
            return false;
        }

        loop {
            match chars.next() {
                None => return false,
                Some('"') if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                Some('"') => break,
                Some(_) => {}
            }
        }

        match chars.next() {
            None => return true,
            Some(',') => continue,
            Some(_) => return false,
        }
    }
}
