// Watcher configuration file.
//
// Global config: `~/.autopush/config.toml`. Every section is optional; a
// missing file means all defaults. Command-line flags override file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use autopush_common::{IgnorePolicy, PolicyError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::git::worker::PushTarget;

/// Default delay between two status polls.
pub const DEFAULT_INTERVAL_MS: u64 = 2_000;

/// Default number of changed lines echoed per detected batch.
pub const DEFAULT_SHOW_LIMIT: usize = 5;

/// Root directory for autopush global state: `~/.autopush/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".autopush"))
}

/// Path to the global config file: `~/.autopush/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutopushConfig {
    pub watch: WatchConfig,
    pub ignore: IgnorePolicy,
    pub git: GitConfig,
}

/// Polling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    /// Working tree to watch. Falls back to the current directory.
    pub repo: Option<PathBuf>,
    /// Milliseconds between polls; must be non-zero.
    pub interval_ms: u64,
    /// Changed lines shown per detected batch before summarizing the rest.
    pub show_limit: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { repo: None, interval_ms: DEFAULT_INTERVAL_MS, show_limit: DEFAULT_SHOW_LIMIT }
    }
}

/// How commits are made and published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GitConfig {
    /// Git executable (defaults to `"git"` on `PATH`).
    pub program: String,
    /// Push after every successful commit.
    pub push: bool,
    /// Remote passed to `git push`; unset uses the branch's upstream.
    pub remote: Option<String>,
    /// Branch passed after `remote`; ignored without a remote.
    pub branch: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self { program: "git".into(), push: true, remote: None, branch: None }
    }
}

impl GitConfig {
    pub fn push_target(&self) -> PushTarget {
        PushTarget { remote: self.remote.clone(), branch: self.branch.clone() }
    }
}

impl AutopushConfig {
    /// Load `~/.autopush/config.toml`, or defaults when it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match global_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from a specific path. Missing file → defaults; a malformed or
    /// invalid file is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::Io(error)),
        }
    }

    /// Load from a specific path that must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.interval_ms == 0 {
            return Err(ConfigError::Invalid("watch.interval_ms must be greater than 0".into()));
        }
        if self.git.program.trim().is_empty() {
            return Err(ConfigError::Invalid("git.program must not be empty".into()));
        }
        self.ignore.validate()?;
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.watch.interval_ms)
    }

    /// Working tree to watch: `explicit`, else `watch.repo`, else the current
    /// directory. Relative paths resolve against the current directory.
    pub fn resolve_repo(&self, explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        let provided = explicit.or_else(|| self.watch.repo.clone()).unwrap_or_else(|| PathBuf::from("."));
        let absolute = if provided.is_absolute() {
            provided
        } else {
            std::env::current_dir()?.join(provided)
        };

        if !absolute.is_dir() {
            return Err(ConfigError::RepoNotFound(absolute));
        }
        Ok(absolute)
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid ignore policy: {0}")]
    Policy(#[from] PolicyError),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("working tree `{}` is not a directory", .0.display())]
    RepoNotFound(PathBuf),
}
