//! Per-session context and turn serialization.
//!
//! Every turn against a session takes a place on the session's turn chain
//! when it is submitted and runs only after the previously submitted turn has
//! released its place. Turns on one log therefore never interleave and always
//! run in submission order, while `submit` itself never blocks.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{RwLock, oneshot};
use tracing::debug;
use turnwright_core::TurnLog;

/// Shared handle to one session's log. Cheap to clone.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    session_id: String,
    log: RwLock<TurnLog>,
    /// Resolves when the most recently enqueued turn releases the session
    tail: Mutex<Option<oneshot::Receiver<()>>>,
}

impl SessionContext {
    pub fn new(log: TurnLog) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                session_id: log.session_id.clone(),
                log: RwLock::new(log),
                tail: Mutex::new(None),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// A copy of the log as it is right now.
    pub async fn snapshot(&self) -> TurnLog {
        self.inner.log.read().await.clone()
    }

    /// Replace the history with an empty log, after any queued turns finish.
    pub async fn clear(&self) {
        let _permit = self.enqueue().acquire().await;
        self.inner.log.write().await.clear();
        debug!(session_id = %self.session_id(), "Session history cleared");
    }

    /// Wait until every turn submitted so far has finished.
    pub async fn idle(&self) {
        let _permit = self.enqueue().acquire().await;
    }

    pub(crate) fn log(&self) -> &RwLock<TurnLog> {
        &self.inner.log
    }

    /// Take the next place on the turn chain. Never blocks.
    pub(crate) fn enqueue(&self) -> TurnTicket {
        let (release, next) = oneshot::channel();
        let mut tail = self
            .inner
            .tail
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let previous = tail.replace(next);
        TurnTicket { previous, release }
    }
}

/// A place on a session's turn chain.
pub(crate) struct TurnTicket {
    previous: Option<oneshot::Receiver<()>>,
    release: oneshot::Sender<()>,
}

impl TurnTicket {
    /// Wait for the predecessor to finish.
    ///
    /// The returned permit releases the successor when dropped, including
    /// when the owning task unwinds.
    pub(crate) async fn acquire(self) -> TurnPermit {
        if let Some(previous) = self.previous {
            // A dropped sender means the predecessor is gone too.
            let _ = previous.await;
        }
        TurnPermit {
            _release: self.release,
        }
    }
}

pub(crate) struct TurnPermit {
    _release: oneshot::Sender<()>,
}
