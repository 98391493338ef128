// Process-level wiring: run a watcher until Ctrl-C.

use std::future::pending;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::git::worker::CommandExecutor;
use crate::report::{Reporter, WatchSummary};
use crate::watcher::Watcher;

/// Shutdown token flipped to `true` on the first Ctrl-C.
///
/// If the signal handler cannot be installed the token simply never fires,
/// so the watcher keeps running instead of exiting at startup.
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, stopping watcher");
                let _ = shutdown_tx.send(true);
            }
            Err(error) => {
                warn!(%error, "failed to listen for Ctrl-C; stop the process externally");
                pending::<()>().await;
            }
        }
    });
    shutdown_rx
}

/// Run `watcher` in the foreground until the process is interrupted.
pub async fn run_until_ctrl_c<E, R>(watcher: Watcher<E, R>) -> WatchSummary
where
    E: CommandExecutor,
    R: Reporter,
{
    watcher.run(shutdown_on_ctrl_c()).await
}
