use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::cleanup::{self, SESSION_TIMEOUT_SECS, SweepResult};
use crate::session::types::ConversationSession;

/// Shared handle to one session.
///
/// Holding the lock gives exclusive access for a whole turn, so two turns on
/// the same session id never interleave.
pub type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Owns every live conversation session, keyed by session id.
///
/// Idle sessions are swept on every `get_or_create` and `get` call.
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
    timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_timeout(std::time::Duration::from_secs(SESSION_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Self {
        let timeout = Duration::from_std(timeout)
            .unwrap_or_else(|_| Duration::seconds(SESSION_TIMEOUT_SECS as i64));
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            timeout,
        }
    }

    /// Generates a fresh opaque session id
    pub fn mint_session_id() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("sess_{}", &id[..12])
    }

    /// Returns the session for `session_id`, creating it when the id is
    /// absent, empty, unknown or expired.
    ///
    /// An unknown id is kept as the new session's id.
    pub async fn get_or_create(&self, session_id: Option<&str>) -> SessionHandle {
        self.sweep_expired().await;

        let requested = session_id.map(str::trim).filter(|id| !id.is_empty());

        if let Some(id) = requested {
            let guard = self.sessions.read().await;
            if let Some(handle) = guard.get(id) {
                return Arc::clone(handle);
            }
        }

        let id = requested
            .map(str::to_string)
            .unwrap_or_else(Self::mint_session_id);

        let mut guard = self.sessions.write().await;
        // Another caller may have created it between the two locks
        let handle = guard
            .entry(id.clone())
            .or_insert_with(|| {
                info!(session_id = %id, "Created conversation session");
                Arc::new(Mutex::new(ConversationSession::new(id.clone())))
            });
        Arc::clone(handle)
    }

    /// Like `get_or_create`, but returns the session already locked.
    ///
    /// A sweep can evict the session between the lookup and the lock; the
    /// lookup is then repeated so the caller never works on a handle the
    /// store no longer owns. Once locked, the session cannot be evicted.
    pub async fn lock_or_create(
        &self,
        session_id: Option<&str>,
    ) -> OwnedMutexGuard<ConversationSession> {
        loop {
            let handle = self.get_or_create(session_id).await;
            let guard = Arc::clone(&handle).lock_owned().await;
            if self.is_registered(&guard.session_id, &handle).await {
                return guard;
            }
            debug!(
                session_id = %guard.session_id,
                "Session evicted before it was locked, retrying"
            );
        }
    }

    /// Locks an existing, unexpired session; `None` if it is gone
    pub async fn lock_existing(
        &self,
        session_id: &str,
    ) -> Option<OwnedMutexGuard<ConversationSession>> {
        loop {
            let handle = self.get(session_id).await?;
            let guard = Arc::clone(&handle).lock_owned().await;
            if self.is_registered(session_id, &handle).await {
                return Some(guard);
            }
        }
    }

    async fn is_registered(&self, session_id: &str, handle: &SessionHandle) -> bool {
        self.sessions
            .read()
            .await
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }

    /// Returns an existing, unexpired session
    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sweep_expired().await;
        let guard = self.sessions.read().await;
        guard.get(session_id).cloned()
    }

    /// Evicts every idle session now
    pub async fn sweep_expired(&self) -> SweepResult {
        cleanup::sweep(&self.sessions, self.timeout).await
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            debug!(session_id = %session_id, "Removed conversation session");
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Starts a background task sweeping idle sessions every `interval`.
    ///
    /// Returns a JoinHandle for graceful shutdown coordination and a shutdown sender
    /// to signal the task to stop.
    pub fn start_cleanup_task(
        &self,
        interval: std::time::Duration,
    ) -> (JoinHandle<()>, mpsc::Sender<()>) {
        cleanup::start_cleanup_task(Arc::clone(&self.sessions), self.timeout, interval)
    }
}
