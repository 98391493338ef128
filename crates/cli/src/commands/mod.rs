// CLI subcommand dispatch.

use std::path::PathBuf;

use anyhow::Context;
use autopush_daemon::config::AutopushConfig;
use autopush_daemon::git::worker::GitWorker;
use clap::{Args, Subcommand};

pub mod init;
pub mod publish;
pub mod status;
pub mod watch;

#[derive(Subcommand)]
pub enum Command {
    /// Watch the working tree and auto-commit/push relevant changes
    Watch(watch::WatchArgs),
    /// Show which pending changes would trigger a publish
    Status(status::StatusArgs),
    /// Stage, commit and push pending relevant changes once
    Publish(publish::PublishArgs),
    /// Write a config file with the default settings
    Init(init::InitArgs),
}

pub fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Watch(args) => watch::run(args),
        Command::Status(args) => status::run(args),
        Command::Publish(args) => publish::run(args),
        Command::Init(args) => init::run(args),
    }
}

/// Which working tree and config file a command operates on.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Working tree (defaults to `watch.repo` from the config, then the current directory).
    #[arg(long, value_name = "PATH")]
    repo: Option<PathBuf>,

    /// Config file (defaults to ~/.autopush/config.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl TargetArgs {
    pub fn load_config(&self) -> anyhow::Result<AutopushConfig> {
        match &self.config {
            Some(path) => AutopushConfig::load_from(path)
                .with_context(|| format!("failed to load config `{}`", path.display())),
            None => AutopushConfig::load().context("failed to load config ~/.autopush/config.toml"),
        }
    }

    /// Loaded config and the absolute working tree path.
    pub fn resolve(&self) -> anyhow::Result<(AutopushConfig, PathBuf)> {
        let config = self.load_config()?;
        let repo = config.resolve_repo(self.repo.clone()).context("failed to resolve working tree")?;
        Ok((config, repo))
    }
}

pub(crate) fn git_worker(config: &AutopushConfig, repo: PathBuf) -> GitWorker {
    GitWorker::new(repo).with_program(config.git.program.clone())
}
