use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::generation::generator::Ghostwriter;
use crate::session::{Session, SessionSnapshot};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub ghostwriter: Arc<Ghostwriter>,
    /// The one session this process serves. Handlers hold the lock for the whole
    /// generate/refine call, so at most one request is in flight.
    pub session: Arc<Mutex<Session>>,
    /// Last published view of `session`. Readable while a call holds the lock.
    snapshot_tx: Arc<watch::Sender<SessionSnapshot>>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl AppState {
    pub fn new(ghostwriter: Ghostwriter) -> Self {
        let session = Session::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
        Self {
            ghostwriter: Arc::new(ghostwriter),
            session: Arc::new(Mutex::new(session)),
            snapshot_tx: Arc::new(snapshot_tx),
            snapshot_rx,
        }
    }

    /// Call with the lock still held, after every generate/refine attempt.
    pub fn publish(&self, session: &Session) {
        self.snapshot_tx.send_replace(session.snapshot());
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }
}
