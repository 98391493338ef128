// `autopush watch`: poll the working tree until Ctrl-C.

use anyhow::Context;
use autopush_daemon::config::AutopushConfig;
use autopush_daemon::runtime;
use autopush_daemon::watcher::Watcher;
use clap::Args;
use tracing::info;

use super::TargetArgs;
use crate::output::{self, EventPrinter, OutputFormat};

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Milliseconds between status polls (overrides `watch.interval_ms`).
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Commit locally without pushing.
    #[arg(long)]
    no_push: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(args: WatchArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    match run_watch(args, format) {
        Ok(()) => Ok(()),
        Err(error) => {
            output::print_anyhow_error(format, &error);
            Err(error)
        }
    }
}

fn run_watch(args: WatchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (mut config, repo) = args.target.resolve()?;
    apply_overrides(&mut config, args.interval_ms, args.no_push)?;

    let watcher = Watcher::from_config(repo, &config, EventPrinter::stdout(format));
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let summary = rt.block_on(runtime::run_until_ctrl_c(watcher));
    info!(polls = summary.polls, commits = summary.commits, "watch finished");
    Ok(())
}

fn apply_overrides(
    config: &mut AutopushConfig,
    interval_ms: Option<u64>,
    no_push: bool,
) -> anyhow::Result<()> {
    if let Some(interval_ms) = interval_ms {
        config.watch.interval_ms = interval_ms;
    }
    if no_push {
        config.git.push = false;
    }
    config.validate().context("invalid watch options")?;
    Ok(())
}
