// `autopush init`: write a config file with the default settings.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use autopush_daemon::config::{global_config_path, AutopushConfig};
use clap::Args;
use serde::Serialize;

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Where to write the config (defaults to ~/.autopush/config.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Working tree to record as `watch.repo`.
    #[arg(long, value_name = "PATH")]
    repo: Option<PathBuf>,

    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitResult {
    pub config_path: String,
    pub repo: Option<String>,
    pub overwritten: bool,
}

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    match init(&args) {
        Ok(result) => {
            output::print_output(format, &result, format_human)?;
            Ok(())
        }
        Err(error) => {
            output::print_anyhow_error(format, &error);
            Err(error)
        }
    }
}

fn init(args: &InitArgs) -> anyhow::Result<InitResult> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => global_config_path().context("could not determine home directory")?,
    };
    write_default_config(&path, args.repo.clone(), args.force)
}

fn write_default_config(
    path: &Path,
    repo: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<InitResult> {
    let existed = path.exists();
    if existed && !force {
        bail!("config already exists at `{}` (use --force to overwrite)", path.display());
    }

    let mut config = AutopushConfig::default();
    if repo.is_some() {
        config.watch.repo = Some(config.resolve_repo(repo).context("failed to resolve --repo")?);
    }

    config
        .save_to(path)
        .with_context(|| format!("failed to write config `{}`", path.display()))?;

    Ok(InitResult {
        config_path: path.display().to_string(),
        repo: config.watch.repo.map(|repo| repo.display().to_string()),
        overwritten: existed,
    })
}

fn format_human(result: &InitResult) -> String {
    let verb = if result.overwritten { "Overwrote" } else { "Wrote" };
    let mut line = format!("{verb} {}", result.config_path);
    if let Some(repo) = &result.repo {
        line.push_str(&format!("\n  watch.repo = {repo}"));
    }
    line
}
