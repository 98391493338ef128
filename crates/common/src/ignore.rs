// Ignore policy: directory names and file extensions that never trigger a publish.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory names ignored by default (any path segment may match).
pub const DEFAULT_IGNORED_DIRS: &[&str] =
    &[".git", "__pycache__", ".venv", "venv", "node_modules", ".pytest_cache", "db.sqlite3"];

/// File extensions ignored by default.
pub const DEFAULT_IGNORED_EXTENSIONS: &[&str] = &[".pyc", ".pyo", ".pyd", ".so", ".egg-info"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("ignored {kind} entry is empty")]
    EmptyEntry { kind: &'static str },

    #[error("ignored directory name `{0}` must be a single path segment")]
    NotASegment(String),
}

/// Decides which changed paths are irrelevant for auto-publishing.
///
/// A path is ignored when one of its `/`-separated segments equals an ignored
/// directory name, or when the extension of its final segment is ignored.
/// Extensions may be written with or without the leading dot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IgnorePolicy {
    pub dirs: BTreeSet<String>,
    pub extensions: BTreeSet<String>,
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self::from_parts(DEFAULT_IGNORED_DIRS.iter().copied(), DEFAULT_IGNORED_EXTENSIONS.iter().copied())
    }
}

impl IgnorePolicy {
    /// An empty policy that ignores nothing.
    pub fn empty() -> Self {
        Self { dirs: BTreeSet::new(), extensions: BTreeSet::new() }
    }

    /// Build and validate a policy.
    pub fn new<D, E>(dirs: D, extensions: E) -> Result<Self, PolicyError>
    where
        D: IntoIterator,
        D::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let policy = Self::from_parts(dirs, extensions);
        policy.validate()?;
        Ok(policy)
    }

    fn from_parts<D, E>(dirs: D, extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Reject entries that can never match (empty names, multi-segment dirs).
    pub fn validate(&self) -> Result<(), PolicyError> {
        for dir in &self.dirs {
            if dir.trim().is_empty() {
                return Err(PolicyError::EmptyEntry { kind: "directory" });
            }
            if dir.contains('/') || dir.contains('\\') {
                return Err(PolicyError::NotASegment(dir.clone()));
            }
        }
        if self.extensions.iter().any(|ext| normalize_extension(ext).is_empty()) {
            return Err(PolicyError::EmptyEntry { kind: "extension" });
        }
        Ok(())
    }

    /// Returns true if the path should not trigger a publish.
    pub fn is_ignored(&self, path: &str) -> bool {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if let Some(ext) = segments.last().and_then(|name| extension_of(name)) {
            if self.extensions.iter().any(|ignored| normalize_extension(ignored) == ext) {
                return true;
            }
        }

        segments.iter().any(|segment| self.dirs.contains(*segment))
    }
}

/// Extension of a file name without the dot. Dotfiles like `.env` and names
/// ending in a dot have none.
fn extension_of(name: &str) -> Option<&str> {
    let idx = name.rfind('.')?;
    if idx == 0 || idx + 1 == name.len() {
        return None;
    }
    Some(&name[idx + 1..])
}

fn normalize_extension(ext: &str) -> &str {
    ext.trim().trim_start_matches('.')
}
