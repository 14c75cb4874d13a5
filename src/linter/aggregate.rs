use std::collections::HashMap;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::linter::diagnostics::Diagnostic;

/// Diagnostics grouped by the path PMD reported them under.
///
/// Paths are compared as exact strings. Files keep the order in which they
/// first appeared and diagnostics keep the order they were produced in.
/// Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileDiagnostics {
    files: Vec<(String, Vec<Diagnostic>)>,
    index: HashMap<String, usize>,
}

impl FileDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, diagnostic: Diagnostic) {
        let path = path.into();
        match self.index.get(&path) {
            Some(&idx) => self.files[idx].1.push(diagnostic),
            None => {
                self.index.insert(path.clone(), self.files.len());
                self.files.push((path, vec![diagnostic]));
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&[Diagnostic]> {
        self.index
            .get(path)
            .map(|&idx| self.files[idx].1.as_slice())
    }

    /// Number of distinct files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of diagnostics across all files.
    pub fn total(&self) -> usize {
        self.files.iter().map(|(_, diags)| diags.len()).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(path, _)| path.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Diagnostic])> {
        self.files
            .iter()
            .map(|(path, diags)| (path.as_str(), diags.as_slice()))
    }
}

impl FromIterator<(String, Diagnostic)> for FileDiagnostics {
    fn from_iter<I: IntoIterator<Item = (String, Diagnostic)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (path, diagnostic) in iter {
            groups.push(path, diagnostic);
        }
        groups
    }
}

impl IntoIterator for FileDiagnostics {
    type Item = (String, Vec<Diagnostic>);
    type IntoIter = std::vec::IntoIter<(String, Vec<Diagnostic>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl Serialize for FileDiagnostics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.files.len()))?;
        for (path, diagnostics) in &self.files {
            map.serialize_entry(path, diagnostics)?;
        }
        map.end()
    }
}

/// Group `(path, diagnostic)` pairs by path.
pub fn aggregate(findings: impl IntoIterator<Item = (String, Diagnostic)>) -> FileDiagnostics {
    findings.into_iter().collect()
}
