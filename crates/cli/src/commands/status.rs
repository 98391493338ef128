// `autopush status`: which pending changes are relevant and which are ignored.

use autopush_common::{partition, ChangeEntry, IgnorePolicy, Snapshot};
use clap::Args;
use serde::Serialize;

use super::{git_worker, TargetArgs};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub repo: String,
    pub relevant: Vec<ChangeEntry>,
    pub ignored: Vec<ChangeEntry>,
}

impl StatusReport {
    fn new(repo: String, snapshot: &Snapshot, policy: &IgnorePolicy) -> Self {
        let (relevant, ignored) = partition(snapshot, policy);
        Self { repo, relevant, ignored }
    }
}

pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    match collect(&args) {
        Ok(report) => {
            output::print_output(format, &report, format_human)?;
            Ok(())
        }
        Err(error) => {
            output::print_anyhow_error(format, &error);
            Err(error)
        }
    }
}

fn collect(args: &StatusArgs) -> anyhow::Result<StatusReport> {
    let (config, repo) = args.target.resolve()?;
    let display = repo.display().to_string();
    let snapshot = git_worker(&config, repo).status_porcelain()?;
    Ok(StatusReport::new(display, &snapshot, &config.ignore))
}

fn format_human(report: &StatusReport) -> String {
    let mut lines = vec![report.repo.clone()];

    if report.relevant.is_empty() {
        lines.push("  No relevant changes.".into());
    } else {
        lines.push(format!("  Relevant changes ({}):", report.relevant.len()));
        lines.extend(report.relevant.iter().map(|entry| format!("    {}", entry.line)));
    }

    if !report.ignored.is_empty() {
        lines.push(format!("  Ignored ({}):", report.ignored.len()));
        lines.extend(report.ignored.iter().map(|entry| format!("    {}", entry.line)));
    }

    lines.join("\n")
}
