//! Core identifiers as they appear in topology files.
//!
//! Example: `3` => CoreId::Index(3), `"node3"` => CoreId::Name("node3")
//!
//! Names carry no index of their own; they get one from their position under
//! [`NaturalSorter`] ordering (see `routing::index`).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CoreId {
    Index(u32),
    Name(String),
}

impl CoreId {
    pub fn is_index(&self) -> bool {
        matches!(self, CoreId::Index(_))
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreId::Index(i) => write!(f, "{}", i),
            CoreId::Name(n) => f.write_str(n),
        }
    }
}

impl From<u32> for CoreId {
    fn from(i: u32) -> Self {
        CoreId::Index(i)
    }
}

impl From<&str> for CoreId {
    fn from(s: &str) -> Self {
        CoreId::Name(s.to_string())
    }
}

/// One run of a name split at digit boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Run {
    /// Lowercased non-digit text (may be empty).
    Text(String),
    /// Digits with leading zeros stripped ("0" for all-zero runs).
    Number(String),
}

impl Ord for Run {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Run::Text(a), Run::Text(b)) => a.cmp(b),
            // Shorter digit strings are smaller numbers; equal lengths compare digit by digit.
            (Run::Number(a), Run::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Run::Text(_), Run::Number(_)) => Ordering::Less,
            (Run::Number(_), Run::Text(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Run {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort key for natural ordering: alternating text and number runs,
/// always starting and ending with a (possibly empty) text run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<Run>);

/// Orders names so that digit runs compare as integers and everything else
/// compares case-insensitively: `node1 < node2 < node10`.
#[derive(Debug, Clone)]
pub struct NaturalSorter {
    digits: Regex,
}

impl NaturalSorter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            digits: Regex::new(r"[0-9]+")?,
        })
    }

    pub fn key(&self, name: &str) -> NaturalKey {
        let mut runs = Vec::new();
        let mut last = 0;
        for m in self.digits.find_iter(name) {
            runs.push(Run::Text(name[last..m.start()].to_lowercase()));
            let trimmed = m.as_str().trim_start_matches('0');
            runs.push(Run::Number(if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }));
            last = m.end();
        }
        runs.push(Run::Text(name[last..].to_lowercase()));
        NaturalKey(runs)
    }

    /// Natural order, falling back to plain byte order so that names which
    /// differ only in case (or zero padding) still sort deterministically.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.key(a).cmp(&self.key(b)).then_with(|| a.cmp(b))
    }

    pub fn sort(&self, names: &mut [String]) {
        names.sort_by(|a, b| self.compare(a, b));
    }
}
