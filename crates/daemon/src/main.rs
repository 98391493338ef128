// autopushd: standalone watcher driven by `~/.autopush/config.toml`.

use anyhow::Context;
use autopush_daemon::config::AutopushConfig;
use autopush_daemon::report::ConsoleReporter;
use autopush_daemon::runtime;
use autopush_daemon::watcher::Watcher;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AutopushConfig::load().context("failed to load autopush config")?;
    let repo = config.resolve_repo(None).context("failed to resolve working tree")?;

    info!(repo = %repo.display(), "starting standalone autopush watcher");
    let watcher = Watcher::from_config(repo, &config, ConsoleReporter::default());
    let summary = runtime::run_until_ctrl_c(watcher).await;
    info!(polls = summary.polls, commits = summary.commits, "autopushd exited");
    Ok(())
}
