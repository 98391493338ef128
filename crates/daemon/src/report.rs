// Operator-facing events emitted by the watcher.
//
// The watcher never prints directly: it hands `WatchEvent`s to a `Reporter`.
// `ConsoleReporter` renders them as plain lines on stdout; the CLI adds a
// JSON-lines renderer on top of the same events.

use std::io::{self, Write};

use autopush_common::message::detection_time;
use autopush_common::ChangeEntry;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::watcher::publish::{PublishError, PublishOutcome};

/// Counters accumulated over one watch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    pub polls: u64,
    pub commits: u64,
    /// Polls that did not lead to a publish attempt, since the last attempt.
    pub idle_polls: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    Started { repo: String, interval_ms: u64 },
    ChangesDetected { at: String, shown: Vec<String>, omitted: usize },
    StatusFailed { error: String },
    StageFailed { error: String },
    Committed { message: String },
    NothingToCommit,
    CommitFailed { error: String },
    Pushed,
    PushSkipped,
    PushFailed { error: String },
    Stopped { summary: WatchSummary },
}

impl WatchEvent {
    /// A change batch showing at most `limit` lines.
    pub fn changes_detected(at: NaiveDateTime, changes: &[ChangeEntry], limit: usize) -> Self {
        let shown: Vec<String> = changes.iter().take(limit).map(|c| c.line.clone()).collect();
        let omitted = changes.len() - shown.len();
        Self::ChangesDetected { at: detection_time(at), shown, omitted }
    }
}

/// Events describing one publish attempt, in the order they happened.
pub fn publish_events(result: &Result<PublishOutcome, PublishError>) -> Vec<WatchEvent> {
    match result {
        Ok(PublishOutcome::Pushed { message }) => {
            vec![WatchEvent::Committed { message: message.clone() }, WatchEvent::Pushed]
        }
        Ok(PublishOutcome::PushSkipped { message }) => {
            vec![WatchEvent::Committed { message: message.clone() }, WatchEvent::PushSkipped]
        }
        Ok(PublishOutcome::PushFailed { message, error }) => vec![
            WatchEvent::Committed { message: message.clone() },
            WatchEvent::PushFailed { error: error.to_string() },
        ],
        Ok(PublishOutcome::NothingToCommit) => vec![WatchEvent::NothingToCommit],
        Err(PublishError::Stage(error)) => vec![WatchEvent::StageFailed { error: error.to_string() }],
        Err(PublishError::Commit(error)) => {
            vec![WatchEvent::CommitFailed { error: error.to_string() }]
        }
    }
}

/// Sink for watcher events.
pub trait Reporter {
    fn report(&mut self, event: &WatchEvent);
}

/// Prints events as human-readable lines.
#[derive(Debug)]
pub struct ConsoleReporter<W = io::Stdout> {
    out: W,
}

impl Default for ConsoleReporter<io::Stdout> {
    fn default() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, event: &WatchEvent) {
        for line in render_human(event) {
            // Operator output is best-effort; a closed stdout must not stop the loop.
            let _ = writeln!(self.out, "{line}");
        }
        let _ = self.out.flush();
    }
}

/// Plain-text rendering of an event, one entry per output line.
pub fn render_human(event: &WatchEvent) -> Vec<String> {
    match event {
        WatchEvent::Started { repo, interval_ms } => vec![
            "auto-push started".to_string(),
            format!("watching directory: {repo}"),
            format!("will auto-commit and push on file changes (polling every {interval_ms}ms)"),
        ],
        WatchEvent::ChangesDetected { at, shown, omitted } => {
            let mut lines = vec![String::new(), format!("changes detected at {at}:")];
            lines.extend(shown.iter().map(|line| format!("   {line}")));
            if *omitted > 0 {
                lines.push(format!("   ... and {omitted} more"));
            }
            lines
        }
        WatchEvent::StatusFailed { error } => vec![format!("error getting git status: {error}")],
        WatchEvent::StageFailed { error } => vec![format!("staging failed: {error}")],
        WatchEvent::Committed { message } => vec![format!("committed changes ({message})")],
        WatchEvent::NothingToCommit => vec!["nothing to commit".to_string()],
        WatchEvent::CommitFailed { error } => vec![format!("commit failed: {error}")],
        WatchEvent::Pushed => vec!["pushed to remote".to_string()],
        WatchEvent::PushSkipped => vec!["push disabled; commit kept local".to_string()],
        WatchEvent::PushFailed { error } => vec![format!("push failed: {error}")],
        WatchEvent::Stopped { summary } => vec![
            String::new(),
            format!(
                "auto-push stopped after {} polls ({} commits)",
                summary.polls, summary.commits
            ),
        ],
    }
}
