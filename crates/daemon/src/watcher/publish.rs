// Stage → commit → push sequence for one detected change batch.

use autopush_common::message::commit_message;
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{info, warn};

use crate::git::worker::{CommandExecutor, CommitOutcome, GitWorker, GitWorkerError, PushTarget};

/// How a publish attempt ended when nothing stopped it early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Committed and pushed.
    Pushed { message: String },
    /// Committed; pushing is disabled.
    PushSkipped { message: String },
    /// Committed, but the push failed. The commit stays local until a later push.
    PushFailed { message: String, error: GitWorkerError },
    /// `git commit` found nothing staged.
    NothingToCommit,
}

impl PublishOutcome {
    pub fn committed(&self) -> bool {
        !matches!(self, Self::NothingToCommit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("failed to stage changes: {0}")]
    Stage(GitWorkerError),
    #[error("failed to commit changes: {0}")]
    Commit(GitWorkerError),
}

/// Options that shape the publish sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub push: bool,
    pub target: PushTarget,
}

impl Default for PublishPlan {
    fn default() -> Self {
        Self { push: true, target: PushTarget::default() }
    }
}

/// Stage everything, commit with a message stamped `at`, then push.
///
/// Stage and commit failures abort the sequence; a push failure does not
/// undo the commit and is returned as an outcome.
pub fn publish_at<E: CommandExecutor>(
    worker: &GitWorker<E>,
    plan: &PublishPlan,
    at: NaiveDateTime,
) -> Result<PublishOutcome, PublishError> {
    worker.add_all().map_err(PublishError::Stage)?;

    let message = commit_message(at);
    match worker.commit(&message).map_err(PublishError::Commit)? {
        CommitOutcome::NothingToCommit => {
            info!("nothing to commit after staging");
            return Ok(PublishOutcome::NothingToCommit);
        }
        CommitOutcome::Committed => info!(%message, "committed changes"),
    }

    if !plan.push {
        return Ok(PublishOutcome::PushSkipped { message });
    }

    match worker.push(&plan.target) {
        Ok(_) => {
            info!(remote = ?plan.target.remote, "pushed commit");
            Ok(PublishOutcome::Pushed { message })
        }
        Err(error) => {
            warn!(%error, "push failed; commit kept locally");
            Ok(PublishOutcome::PushFailed { message, error })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::worker::tests::{failed, ok, MockExecutor};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap()
    }

    #[test]
    fn publish_stages_commits_and_pushes() {
        let mock = MockExecutor::new(vec![Ok(ok("")), Ok(ok("[main 1a2b3c] x\n")), Ok(ok(""))]);
        let worker = GitWorker::with_executor("/tmp/repo", mock.clone());

        let outcome = publish_at(&worker, &PublishPlan::default(), at()).unwrap();

        assert_eq!(outcome, PublishOutcome::Pushed { message: "Auto-commit: 2024-01-02 03:04:05".into() });
        let calls = mock.calls();
        assert_eq!(calls[0].args, vec!["add", "-A"]);
        assert_eq!(calls[1].args, vec!["commit", "-m", "Auto-commit: 2024-01-02 03:04:05"]);
        assert_eq!(calls[2].args, vec!["push"]);
    }

    #[test]
    fn push_failure_after_commit_is_an_outcome() {
        let mock = MockExecutor::new(vec![
            Ok(ok("")),
            Ok(ok("[main 1a2b3c] x\n")),
            Ok(failed(1, "", "fatal: could not read from remote repository\n")),
        ]);
        let worker = GitWorker::with_executor("/tmp/repo", mock);

        let outcome = publish_at(&worker, &PublishPlan::default(), at()).unwrap();
        match outcome {
            PublishOutcome::PushFailed { message, error } => {
                assert_eq!(message, "Auto-commit: 2024-01-02 03:04:05");
                assert!(error.to_string().contains("could not read from remote"));
            }
            other => panic!("expected push failure, got {other:?}"),
        }
    }

    #[test]
    fn nothing_to_commit_skips_push() {
        let mock = MockExecutor::new(vec![
            Ok(ok("")),
            Ok(failed(1, "nothing to commit, working tree clean\n", "")),
        ]);
        let worker = GitWorker::with_executor("/tmp/repo", mock.clone());

        let outcome = publish_at(&worker, &PublishPlan::default(), at()).unwrap();
        assert_eq!(outcome, PublishOutcome::NothingToCommit);
        assert!(!outcome.committed());
        assert_eq!(mock.subcommands(), vec!["add", "commit"]);
    }

    #[test]
    fn stage_failure_aborts_before_commit() {
        let mock = MockExecutor::new(vec![Ok(failed(128, "", "fatal: index.lock exists\n"))]);
        let worker = GitWorker::with_executor("/tmp/repo", mock.clone());

        let error = publish_at(&worker, &PublishPlan::default(), at()).unwrap_err();
        assert!(matches!(error, PublishError::Stage(_)));
        assert_eq!(mock.subcommands(), vec!["add"]);
    }

    #[test]
    fn commit_failure_aborts_before_push() {
        let mock =
            MockExecutor::new(vec![Ok(ok("")), Ok(failed(1, "", "error: gpg failed to sign\n"))]);
        let worker = GitWorker::with_executor("/tmp/repo", mock.clone());

        let error = publish_at(&worker, &PublishPlan::default(), at()).unwrap_err();
        assert!(matches!(error, PublishError::Commit(_)));
        assert!(error.to_string().starts_with("failed to commit changes:"));
        assert_eq!(mock.subcommands(), vec!["add", "commit"]);
    }

    #[test]
    fn disabled_push_keeps_commit_local() {
        let mock = MockExecutor::new(Vec::new());
        let worker = GitWorker::with_executor("/tmp/repo", mock.clone());
        let plan = PublishPlan { push: false, target: PushTarget::default() };

        let outcome = publish_at(&worker, &plan, at()).unwrap();
        assert!(matches!(outcome, PublishOutcome::PushSkipped { .. }));
        assert!(outcome.committed());
        assert_eq!(mock.subcommands(), vec!["add", "commit"]);
    }
}
