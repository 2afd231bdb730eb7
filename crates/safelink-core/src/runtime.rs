//! Single-actor driver that connects the session state machine to a backend.
//!
//! Messages are applied strictly in arrival order on the caller's task; only
//! the backend calls run concurrently, and their outcomes come back as
//! messages through a channel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::backend::ScanBackend;
use crate::session::{update, Effect, Msg, RequestId, ScanSession};

pub struct ScanRunner {
    session: ScanSession,
    backend: Arc<dyn ScanBackend>,
    tx: mpsc::UnboundedSender<Msg>,
    rx: mpsc::UnboundedReceiver<Msg>,
    pending: HashMap<RequestId, JoinHandle<()>>,
}

impl ScanRunner {
    pub fn new(backend: Arc<dyn ScanBackend>, session: ScanSession) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            backend,
            tx,
            rx,
            pending: HashMap::new(),
        }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    /// Number of backend calls still running.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    /// Apply one message and perform the resulting effects.
    pub fn dispatch(&mut self, msg: Msg) {
        match &msg {
            Msg::ScanSucceeded { request_id, .. } | Msg::ScanFailed { request_id, .. } => {
                self.pending.remove(request_id);
            }
            _ => {}
        }
        let session = std::mem::take(&mut self.session);
        let (session, effects) = update(session, msg);
        self.session = session;
        for effect in effects {
            self.perform(effect);
        }
    }

    /// Submit raw user text. Must be called from within a tokio runtime.
    pub fn submit(&mut self, raw: impl Into<String>) {
        self.dispatch(Msg::Submit(raw.into()));
    }

    pub fn reset(&mut self) {
        self.dispatch(Msg::Reset);
    }

    /// Wait for backend completions until the session is no longer in flight.
    pub async fn run_until_settled(&mut self) -> &ScanSession {
        while self.session.is_in_flight() {
            let Some(msg) = self.rx.recv().await else {
                break;
            };
            self.dispatch(msg);
        }
        &self.session
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::DispatchScan { request_id, url } => {
                info!(request_id, %url, "scanning");
                let backend = Arc::clone(&self.backend);
                let tx = self.tx.clone();
                let handle = tokio::spawn(async move {
                    let mut call = AbortOnDrop(tokio::spawn(async move {
                        backend.scan(&url).await
                    }));
                    let msg = match (&mut call.0).await {
                        Ok(Ok(bundle)) => Msg::ScanSucceeded {
                            request_id,
                            bundle: Box::new(bundle),
                        },
                        Ok(Err(err)) => {
                            warn!(request_id, error = %err, "backend scan failed");
                            Msg::ScanFailed {
                                request_id,
                                message: err.user_message(),
                            }
                        }
                        Err(err) if err.is_panic() => {
                            error!(request_id, "backend scan panicked");
                            Msg::ScanFailed {
                                request_id,
                                message: None,
                            }
                        }
                        Err(_) => return,
                    };
                    // The runner may already be gone; nothing to deliver to then.
                    let _ = tx.send(msg);
                });
                self.pending.insert(request_id, handle);
            }
            Effect::AbandonScan { request_id } => {
                if let Some(handle) = self.pending.remove(&request_id) {
                    debug!(request_id, "aborting superseded backend call");
                    handle.abort();
                }
            }
        }
    }
}

/// Aborts the backend call when the task awaiting it is aborted.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl Drop for ScanRunner {
    fn drop(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }
}
