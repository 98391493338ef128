use std::path::{Path, PathBuf};
use std::process::Command;

use autopush_common::Snapshot;
use thiserror::Error;

const NOTHING_TO_COMMIT: &str = "nothing to commit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GitWorkerError {
    #[error("failed to run `{command}`: {message}")]
    SpawnFailed { command: String, message: String },
    #[error("`{command}` failed with code {code:?}: {}", .stderr.trim())]
    CommandFailed { command: String, code: Option<i32>, stderr: String },
}

/// Result of `git commit` when the process itself ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The index had nothing staged; not an error.
    NothingToCommit,
}

/// Where `git push` publishes. `branch` is only passed along with `remote`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushTarget {
    pub remote: Option<String>,
    pub branch: Option<String>,
}

impl PushTarget {
    fn args(&self) -> Vec<String> {
        let mut args = vec!["push".to_string()];
        if let Some(remote) = &self.remote {
            args.push(remote.clone());
            if let Some(branch) = &self.branch {
                args.push(branch.clone());
            }
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl CommandExecutor for ProcessCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandResult {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs git subcommands synchronously inside one working tree.
#[derive(Debug, Clone)]
pub struct GitWorker<E = ProcessCommandExecutor> {
    repo_path: PathBuf,
    program: String,
    executor: E,
}

impl GitWorker<ProcessCommandExecutor> {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self::with_executor(repo_path, ProcessCommandExecutor)
    }
}

impl<E: CommandExecutor> GitWorker<E> {
    pub fn with_executor(repo_path: impl Into<PathBuf>, executor: E) -> Self {
        Self { repo_path: repo_path.into(), program: "git".to_string(), executor }
    }

    /// Use a different git binary (e.g. an absolute path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn status_porcelain(&self) -> Result<Snapshot, GitWorkerError> {
        let output = self.run(vec!["status".to_string(), "--porcelain".to_string()])?;
        Ok(Snapshot::new(output.stdout))
    }

    /// Stage every change in the tree, including deletions and untracked files.
    pub fn add_all(&self) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["add".to_string(), "-A".to_string()])
    }

    pub fn commit(&self, message: &str) -> Result<CommitOutcome, GitWorkerError> {
        let args = vec!["commit".to_string(), "-m".to_string(), message.to_string()];
        let command = self.command_line(&args);
        let result = self.execute(&command, &args)?;

        if result.success {
            return Ok(CommitOutcome::Committed);
        }
        if result.stdout.contains(NOTHING_TO_COMMIT) || result.stderr.contains(NOTHING_TO_COMMIT) {
            return Ok(CommitOutcome::NothingToCommit);
        }

        Err(command_failed(command, result))
    }

    pub fn push(&self, target: &PushTarget) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(target.args())
    }

    fn run(&self, args: Vec<String>) -> Result<GitCommandOutput, GitWorkerError> {
        let command = self.command_line(&args);
        let result = self.execute(&command, &args)?;

        if result.success {
            return Ok(GitCommandOutput { stdout: result.stdout, stderr: result.stderr });
        }

        Err(command_failed(command, result))
    }

    fn execute(&self, command: &str, args: &[String]) -> Result<CommandResult, GitWorkerError> {
        self.executor.execute(&self.program, args, &self.repo_path).map_err(|error| {
            GitWorkerError::SpawnFailed { command: command.to_string(), message: error.to_string() }
        })
    }

    fn command_line(&self, args: &[String]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }
}

fn command_failed(command: String, result: CommandResult) -> GitWorkerError {
    let stderr = if result.stderr.trim().is_empty() { result.stdout } else { result.stderr };
    GitWorkerError::CommandFailed { command, code: result.code, stderr }
}
