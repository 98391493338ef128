// autopush-daemon: polls a git working tree and auto-commits/pushes relevant changes.

pub mod config;
pub mod git;
pub mod report;
pub mod runtime;
pub mod watcher;
