// Change watcher: poll `git status` → filter ignored paths → publish.
//
// One sequential loop. Each iteration sleeps the poll interval, takes a
// status snapshot and, when the snapshot is new and still has relevant
// entries after filtering, stages/commits/pushes. Every git failure is
// reported and the loop keeps going; only the shutdown token stops it.

pub mod publish;

use std::path::PathBuf;
use std::time::Duration;

use autopush_common::{ChangeEntry, IgnorePolicy, Snapshot};
use chrono::{Local, NaiveDateTime};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::{AutopushConfig, DEFAULT_INTERVAL_MS, DEFAULT_SHOW_LIMIT};
use crate::git::worker::{CommandExecutor, GitWorker, ProcessCommandExecutor};
use crate::report::{publish_events, ConsoleReporter, Reporter, WatchEvent, WatchSummary};

use self::publish::{publish_at, PublishError, PublishOutcome, PublishPlan};

/// Runtime settings for one watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    pub interval: Duration,
    pub show_limit: usize,
    pub ignore: IgnorePolicy,
    pub publish: PublishPlan,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            show_limit: DEFAULT_SHOW_LIMIT,
            ignore: IgnorePolicy::default(),
            publish: PublishPlan::default(),
        }
    }
}

impl From<&AutopushConfig> for WatchSettings {
    fn from(config: &AutopushConfig) -> Self {
        Self {
            interval: config.interval(),
            show_limit: config.watch.show_limit,
            ignore: config.ignore.clone(),
            publish: PublishPlan { push: config.git.push, target: config.git.push_target() },
        }
    }
}

/// What a single poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No new relevant changes.
    Idle,
    /// A publish was attempted.
    Published(Result<PublishOutcome, PublishError>),
}

pub struct Watcher<E = ProcessCommandExecutor, R = ConsoleReporter> {
    worker: GitWorker<E>,
    settings: WatchSettings,
    reporter: R,
    last_snapshot: Snapshot,
    summary: WatchSummary,
}

impl<R: Reporter> Watcher<ProcessCommandExecutor, R> {
    /// Watcher for `repo` using the git program and policies from `config`.
    pub fn from_config(repo: impl Into<PathBuf>, config: &AutopushConfig, reporter: R) -> Self {
        let worker = GitWorker::new(repo).with_program(config.git.program.clone());
        Self::with_worker(worker, WatchSettings::from(config), reporter)
    }
}

impl<E: CommandExecutor, R: Reporter> Watcher<E, R> {
    pub fn with_worker(worker: GitWorker<E>, settings: WatchSettings, reporter: R) -> Self {
        Self {
            worker,
            settings,
            reporter,
            last_snapshot: Snapshot::empty(),
            summary: WatchSummary::default(),
        }
    }

    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    pub fn summary(&self) -> WatchSummary {
        self.summary
    }

    /// Polls since the last publish attempt. Informational only.
    pub fn idle_polls(&self) -> u64 {
        self.summary.idle_polls
    }

    pub fn last_snapshot(&self) -> &Snapshot {
        &self.last_snapshot
    }

    /// Current status of the working tree; empty when git fails.
    pub fn poll_status(&mut self) -> Snapshot {
        match self.worker.status_porcelain() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, repo = %self.worker.repo_path().display(), "git status failed");
                self.reporter.report(&WatchEvent::StatusFailed { error: error.to_string() });
                Snapshot::empty()
            }
        }
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.settings.ignore.is_ignored(path)
    }

    pub fn filter_relevant(&self, snapshot: &Snapshot) -> Vec<ChangeEntry> {
        autopush_common::filter_relevant(snapshot, &self.settings.ignore)
    }

    /// Stage, commit and push now, stamped with the local time.
    pub fn publish(&self, changes: &[ChangeEntry]) -> Result<PublishOutcome, PublishError> {
        self.publish_at(changes, Local::now().naive_local())
    }

    pub fn publish_at(
        &self,
        changes: &[ChangeEntry],
        at: NaiveDateTime,
    ) -> Result<PublishOutcome, PublishError> {
        debug!(changes = changes.len(), "publishing change batch");
        publish_at(&self.worker, &self.settings.publish, at)
    }

    /// One poll cycle at the current local time.
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(Local::now().naive_local())
    }

    /// One poll cycle at a specific local time.
    pub fn tick_at(&mut self, now: NaiveDateTime) -> TickOutcome {
        self.summary.polls += 1;

        let snapshot = self.poll_status();
        if snapshot.is_empty() || snapshot == self.last_snapshot {
            return self.idle();
        }

        let relevant = self.filter_relevant(&snapshot);
        if relevant.is_empty() {
            debug!("only ignored paths changed");
            return self.idle();
        }

        info!(changes = relevant.len(), "changes detected");
        self.reporter.report(&WatchEvent::changes_detected(now, &relevant, self.settings.show_limit));

        let result = self.publish_at(&relevant, now);
        if matches!(&result, Ok(outcome) if outcome.committed()) {
            self.summary.commits += 1;
        }
        if let Err(error) = &result {
            warn!(%error, "publish failed");
        }
        for event in publish_events(&result) {
            self.reporter.report(&event);
        }

        self.last_snapshot = snapshot;
        self.summary.idle_polls = 0;
        TickOutcome::Published(result)
    }

    fn idle(&mut self) -> TickOutcome {
        self.summary.idle_polls += 1;
        debug!(idle_polls = self.summary.idle_polls, "no new relevant changes");
        TickOutcome::Idle
    }

    /// Poll until `shutdown` becomes `true` (or its sender is dropped).
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> WatchSummary {
        let repo = self.worker.repo_path().display().to_string();
        info!(%repo, interval = ?self.settings.interval, "watcher started");
        self.reporter.report(&WatchEvent::Started {
            repo,
            interval_ms: u64::try_from(self.settings.interval.as_millis()).unwrap_or(u64::MAX),
        });

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.settings.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            self.tick();
        }

        let summary = self.summary;
        info!(polls = summary.polls, commits = summary.commits, "watcher stopped");
        self.reporter.report(&WatchEvent::Stopped { summary });
        summary
    }
}
