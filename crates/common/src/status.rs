// Working-tree status snapshots (`git status --porcelain` text) and change entries.

use serde::{Deserialize, Serialize};

use crate::ignore::IgnorePolicy;

/// Raw porcelain status text captured at one poll.
///
/// Only trailing whitespace is trimmed: the first column of a porcelain line
/// is part of the status code (` M app.py`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn new(raw: impl Into<String>) -> Self {
        let mut raw = raw.into();
        raw.truncate(raw.trim_end().len());
        Self(raw)
    }

    /// The snapshot substituted when the status query fails.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// All non-blank lines parsed as change entries, in output order.
    pub fn entries(&self) -> impl Iterator<Item = ChangeEntry> + '_ {
        self.0.lines().filter_map(ChangeEntry::parse)
    }
}

/// One line of porcelain status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// The line exactly as reported.
    pub line: String,
    /// Two-column porcelain status code (`" M"`, `"??"`, `"R "`...).
    pub status: String,
    /// Last whitespace-delimited token of the line, unquoted.
    pub path: String,
}

impl ChangeEntry {
    /// Parse a status line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let token = line.split_whitespace().last()?;
        let path = token.trim_matches('"');
        let status = line.get(..2).unwrap_or_default();
        Some(Self { line: line.to_string(), status: status.to_string(), path: path.to_string() })
    }
}

/// Entries of `snapshot` whose path is not ignored by `policy`.
pub fn filter_relevant(snapshot: &Snapshot, policy: &IgnorePolicy) -> Vec<ChangeEntry> {
    partition(snapshot, policy).0
}

/// Split entries into `(relevant, ignored)`, both in output order.
pub fn partition(snapshot: &Snapshot, policy: &IgnorePolicy) -> (Vec<ChangeEntry>, Vec<ChangeEntry>) {
    snapshot.entries().partition(|entry| !policy.is_ignored(&entry.path))
}
