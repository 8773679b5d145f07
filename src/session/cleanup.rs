//! Idle-session expiry
//!
//! Sessions whose `last_active` is older than the timeout (30 minutes by
//! default) are evicted. The store sweeps lazily on every lookup; a periodic
//! background sweep can be started on top of that.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::manager::SessionHandle;

/// Inactivity timeout (30 minutes)
pub const SESSION_TIMEOUT_SECS: u64 = 30 * 60;

/// Whether a session last active at `last_active` has expired at `now`.
///
/// A session idle for exactly the timeout is still alive.
pub fn is_expired(last_active: DateTime<Utc>, now: DateTime<Utc>, timeout: Duration) -> bool {
    now.signed_duration_since(last_active) > timeout
}

/// Result of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepResult {
    pub sessions_scanned: usize,
    pub sessions_evicted: usize,
}

/// Evicts expired sessions from `sessions`.
///
/// A session whose lock is held is in the middle of a turn and is never evicted.
pub async fn sweep(
    sessions: &RwLock<HashMap<String, SessionHandle>>,
    timeout: Duration,
) -> SweepResult {
    let now = Utc::now();
    let mut guard = sessions.write().await;
    let sessions_scanned = guard.len();

    guard.retain(|session_id, handle| match handle.try_lock() {
        Ok(session) => {
            let expired = is_expired(session.last_active, now, timeout);
            if expired {
                debug!(
                    session_id = %session_id,
                    last_active = %session.last_active,
                    "Evicting idle session"
                );
            }
            !expired
        }
        Err(_) => true,
    });

    let sessions_evicted = sessions_scanned - guard.len();
    if sessions_evicted > 0 {
        info!(
            sessions_scanned = sessions_scanned,
            sessions_evicted = sessions_evicted,
            "Session sweep complete"
        );
    }

    SweepResult {
        sessions_scanned,
        sessions_evicted,
    }
}

/// Spawns a task that sweeps `sessions` every `interval`.
///
/// Returns a JoinHandle for graceful shutdown coordination and a shutdown sender
/// to signal the task to stop.
pub fn start_cleanup_task(
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
    timeout: Duration,
    interval: std::time::Duration,
) -> (JoinHandle<()>, mpsc::Sender<()>) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sweep(&sessions, timeout).await;
                }
                _ = shutdown_rx.recv() => {
                    info!("Cleanup task received shutdown signal, stopping");
                    break;
                }
            }
        }
    });

    (handle, shutdown_tx)
}
