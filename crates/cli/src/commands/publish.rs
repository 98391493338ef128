// `autopush publish`: stage, commit and push pending relevant changes once.

use anyhow::bail;
use autopush_common::filter_relevant;
use autopush_daemon::report::{publish_events, render_human, WatchEvent};
use autopush_daemon::watcher::publish::{publish_at, PublishPlan};
use chrono::Local;
use clap::Args;
use serde::Serialize;

use super::{git_worker, TargetArgs};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct PublishArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Commit locally without pushing.
    #[arg(long)]
    no_push: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub repo: String,
    pub changes: Vec<String>,
    pub events: Vec<WatchEvent>,
}

impl PublishReport {
    /// True if any step of the sequence failed.
    fn failed(&self) -> bool {
        self.events.iter().any(|event| {
            matches!(
                event,
                WatchEvent::StageFailed { .. }
                    | WatchEvent::CommitFailed { .. }
                    | WatchEvent::PushFailed { .. }
            )
        })
    }
}

pub fn run(args: PublishArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let report = match publish_once(&args) {
        Ok(report) => report,
        Err(error) => {
            output::print_anyhow_error(format, &error);
            return Err(error);
        }
    };

    output::print_output(format, &report, format_human)?;
    if report.failed() {
        bail!("publish did not complete");
    }
    Ok(())
}

fn publish_once(args: &PublishArgs) -> anyhow::Result<PublishReport> {
    let (config, repo) = args.target.resolve()?;
    let display = repo.display().to_string();
    let worker = git_worker(&config, repo);

    let snapshot = worker.status_porcelain()?;
    let relevant = filter_relevant(&snapshot, &config.ignore);
    let changes: Vec<String> = relevant.iter().map(|entry| entry.line.clone()).collect();
    if relevant.is_empty() {
        return Ok(PublishReport { repo: display, changes, events: Vec::new() });
    }

    let plan = PublishPlan {
        push: config.git.push && !args.no_push,
        target: config.git.push_target(),
    };
    let result = publish_at(&worker, &plan, Local::now().naive_local());
    Ok(PublishReport { repo: display, changes, events: publish_events(&result) })
}

fn format_human(report: &PublishReport) -> String {
    if report.changes.is_empty() {
        return format!("{}: no relevant changes to publish", report.repo);
    }

    let mut lines = vec![format!("{} ({} relevant changes)", report.repo, report.changes.len())];
    lines.extend(report.events.iter().flat_map(render_human));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(events: Vec<WatchEvent>) -> PublishReport {
        PublishReport { repo: "/srv/site".into(), changes: vec![" M app.py".into()], events }
    }

    #[test]
    fn clean_tree_message() {
        let report = PublishReport { repo: "/srv/site".into(), changes: Vec::new(), events: Vec::new() };
        assert_eq!(format_human(&report), "/srv/site: no relevant changes to publish");
        assert!(!report.failed());
    }

    #[test]
    fn successful_publish_lists_events() {
        let report = report(vec![
            WatchEvent::Committed { message: "Auto-commit: 2024-02-03 04:05:06".into() },
            WatchEvent::Pushed,
        ]);
        assert_eq!(
            format_human(&report),
            "/srv/site (1 relevant changes)\n\
             committed changes (Auto-commit: 2024-02-03 04:05:06)\n\
             pushed to remote"
        );
        assert!(!report.failed());
    }

    #[test]
    fn push_failure_marks_report_failed() {
        let report = report(vec![
            WatchEvent::Committed { message: "m".into() },
            WatchEvent::PushFailed { error: "rejected".into() },
        ]);
        assert!(report.failed());
    }

    #[test]
    fn nothing_to_commit_is_not_a_failure() {
        assert!(!report(vec![WatchEvent::NothingToCommit]).failed());
    }
}
