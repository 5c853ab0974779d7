// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that the serve loop monitors. In-flight
//! generations are drained before the process exits.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Returns a token cancelled when SIGINT or SIGTERM is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Waits up to `timeout` for tracked tasks to finish.
///
/// Returns `true` if every task completed.
pub async fn drain_tasks(tracker: &TaskTracker, timeout: Duration) -> bool {
    tracker.close();
    if tracker.is_empty() {
        info!("no in-flight events to drain");
        return true;
    }

    info!(count = tracker.len(), "waiting for in-flight events to complete");
    match tokio::time::timeout(timeout, tracker.wait()).await {
        Ok(()) => {
            info!("all in-flight events drained");
            true
        }
        Err(_) => {
            warn!(remaining = tracker.len(), "drain timeout reached, abandoning in-flight events");
            false
        }
    }
}
