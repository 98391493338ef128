use std::path::{Path, PathBuf};
use std::process::Command;

use autopush_daemon::config::AutopushConfig;
use autopush_daemon::git::worker::ProcessCommandExecutor;
use autopush_daemon::report::{render_human, ConsoleReporter, WatchEvent};
use autopush_daemon::watcher::publish::PublishOutcome;
use autopush_daemon::watcher::{TickOutcome, Watcher};
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    repo: PathBuf,
    remote: PathBuf,
}

/// A working tree with one pushed commit and an `origin` bare remote.
fn repo_with_remote() -> Fixture {
    let temp = TempDir::new().expect("tempdir should be created");
    let remote = temp.path().join("remote.git");
    let repo = temp.path().join("repo");

    run_git(temp.path(), &["init", "--bare", remote.to_str().expect("utf8 remote path")]);
    run_git(temp.path(), &["init", "-b", "main", repo.to_str().expect("utf8 repo path")]);
    run_git(&repo, &["config", "user.name", "Autopush Bot"]);
    run_git(&repo, &["config", "user.email", "autopush-bot@example.test"]);
    run_git(&repo, &["config", "commit.gpgsign", "false"]);
    run_git(&repo, &["remote", "add", "origin", remote.to_str().expect("utf8 remote path")]);

    std::fs::write(repo.join("app.py"), "print('hello')\n").expect("seed file should be written");
    run_git(&repo, &["add", "."]);
    run_git(&repo, &["commit", "-m", "initial commit"]);
    run_git(&repo, &["push", "-u", "origin", "main"]);

    Fixture { _temp: temp, repo, remote }
}

fn quiet_watcher(repo: &Path) -> Watcher<ProcessCommandExecutor, ConsoleReporter<Vec<u8>>> {
    Watcher::from_config(repo, &AutopushConfig::default(), ConsoleReporter::with_writer(Vec::new()))
}

#[test]
fn relevant_change_is_committed_and_pushed() {
    let fixture = repo_with_remote();
    std::fs::write(fixture.repo.join("app.py"), "print('hello, world')\n")
        .expect("update should be written");
    std::fs::create_dir_all(fixture.repo.join("node_modules")).expect("dir should be created");
    std::fs::write(fixture.repo.join("node_modules").join("x.js"), "module.exports = 1;\n")
        .expect("ignored file should be written");

    let mut watcher = quiet_watcher(&fixture.repo);
    let outcome = watcher.tick();

    match outcome {
        TickOutcome::Published(Ok(PublishOutcome::Pushed { message })) => {
            assert!(message.starts_with("Auto-commit: "), "unexpected message: {message}");
        }
        other => panic!("expected a pushed commit, got {other:?}"),
    }

    let subject = run_git_capture(&fixture.repo, &["log", "-1", "--pretty=%s"]);
    assert!(subject.starts_with("Auto-commit: "), "unexpected subject: {subject}");

    // `add -A` stages the whole tree, ignored paths included.
    let files = run_git_capture(&fixture.repo, &["show", "--name-only", "--pretty=", "HEAD"]);
    assert!(files.lines().any(|f| f == "app.py"));
    assert!(files.lines().any(|f| f == "node_modules/x.js"));

    let local_head = run_git_capture(&fixture.repo, &["rev-parse", "HEAD"]);
    let remote_head = run_git_capture(
        &fixture.repo,
        &["--git-dir", fixture.remote.to_str().expect("utf8 remote path"), "rev-parse", "refs/heads/main"],
    );
    assert_eq!(local_head.trim(), remote_head.trim(), "remote should receive pushed commit");

    // The tree is clean now; the next poll is idle.
    assert_eq!(watcher.tick(), TickOutcome::Idle);
    assert_eq!(watcher.summary().commits, 1);
}

#[test]
fn ignored_only_changes_do_not_commit() {
    let fixture = repo_with_remote();
    let cache = fixture.repo.join("__pycache__");
    std::fs::create_dir_all(&cache).expect("dir should be created");
    std::fs::write(cache.join("app.cpython-312.pyc"), [0u8, 1, 2]).expect("pyc should be written");
    std::fs::write(fixture.repo.join("native.so"), [0u8]).expect("so should be written");

    let head_before = run_git_capture(&fixture.repo, &["rev-parse", "HEAD"]);
    let mut watcher = quiet_watcher(&fixture.repo);

    assert_eq!(watcher.tick(), TickOutcome::Idle);
    assert_eq!(watcher.tick(), TickOutcome::Idle);
    assert_eq!(watcher.idle_polls(), 2);

    let head_after = run_git_capture(&fixture.repo, &["rev-parse", "HEAD"]);
    assert_eq!(head_before, head_after);
}

#[test]
fn push_failure_keeps_local_commit() {
    let fixture = repo_with_remote();
    run_git(&fixture.repo, &["remote", "set-url", "origin", "/nonexistent/remote.git"]);
    std::fs::write(fixture.repo.join("notes.txt"), "todo\n").expect("file should be written");

    let mut watcher = quiet_watcher(&fixture.repo);
    let outcome = watcher.tick();

    assert!(
        matches!(outcome, TickOutcome::Published(Ok(PublishOutcome::PushFailed { .. }))),
        "expected push failure, got {outcome:?}"
    );
    let subject = run_git_capture(&fixture.repo, &["log", "-1", "--pretty=%s"]);
    assert!(subject.starts_with("Auto-commit: "));
    assert_eq!(watcher.summary().commits, 1);
}

#[test]
fn status_failure_is_not_fatal() {
    let temp = TempDir::new().expect("tempdir should be created");
    let missing = temp.path().join("removed");
    std::fs::create_dir_all(&missing).expect("dir should be created");
    let mut watcher = quiet_watcher(&missing);
    std::fs::remove_dir(&missing).expect("dir should be removed");

    // git cannot even start in a deleted directory; the poll degrades to idle.
    assert_eq!(watcher.tick(), TickOutcome::Idle);
    assert_eq!(watcher.tick(), TickOutcome::Idle);
    assert_eq!(watcher.summary().polls, 2);

    let rendered = render_human(&WatchEvent::StatusFailed { error: "spawn failed".into() });
    assert_eq!(rendered, vec!["error getting git status: spawn failed"]);
}

fn run_git(cwd: &Path, args: &[&str]) {
    let output =
        Command::new("git").args(args).current_dir(cwd).output().expect("git command should run");
    assert!(
        output.status.success(),
        "git {:?} failed:\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn run_git_capture(cwd: &Path, args: &[&str]) -> String {
    let output =
        Command::new("git").args(args).current_dir(cwd).output().expect("git command should run");
    assert!(
        output.status.success(),
        "git {:?} failed:\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8 output")
}
