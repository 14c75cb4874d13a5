//! Mapping from PMD priorities to diagnostic severities.

use std::fmt;

/// Severity of a diagnostic derived from a PMD priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Error,
    Warning,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Hint => write!(f, "hint"),
        }
    }
}

/// Priority cut-offs: `priority <= error` is an error, `priority <= warning`
/// a warning, anything else a hint.
///
/// `error < warning` is expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub error: i64,
    pub warning: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            error: 1,
            warning: 3,
        }
    }
}

impl Thresholds {
    pub fn new(error: i64, warning: i64) -> Self {
        Self { error, warning }
    }

    /// Classify a priority. A missing priority is a hint.
    pub fn classify(&self, priority: Option<i64>) -> Severity {
        match priority {
            Some(priority) => classify(priority, self.error, self.warning),
            None => Severity::Hint,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.error < self.warning
    }
}

pub fn classify(priority: i64, error_threshold: i64, warning_threshold: i64) -> Severity {
    if priority <= error_threshold {
        Severity::Error
    } else if priority <= warning_threshold {
        Severity::Warning
    } else {
        Severity::Hint
    }
}
