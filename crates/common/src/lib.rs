// autopush-common: working-tree change model shared by the daemon and CLI.

pub mod ignore;
pub mod message;
pub mod status;

pub use ignore::{IgnorePolicy, PolicyError};
pub use status::{filter_relevant, partition, ChangeEntry, Snapshot};
