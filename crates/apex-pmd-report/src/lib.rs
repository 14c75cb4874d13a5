//! Reading PMD's CSV report format.
//!
//! [`parse_line`] turns one row of `pmd -f csv` output into a [`ProblemRecord`],
//! and [`Thresholds`] maps the record's priority to a [`Severity`].

pub mod record;
pub mod severity;

pub use record::{COLUMNS, ProblemRecord, parse_line};
pub use severity::{Severity, Thresholds, classify};
