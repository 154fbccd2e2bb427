use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::debug;

use crate::credentials::claims::Claims;

const BUFFER_SIZE: usize = 16;

/// Notifications consumed by UI/navigation layers. This crate never
/// navigates or renders; it only announces.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Established(Claims),
    Ended(EndReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The renewal credential was rejected by the server.
    RenewalRejected,
    /// The caller ended the session deliberately.
    Logout,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match *self {
            EndReason::RenewalRejected => "renewal_rejected",
            EndReason::Logout => "logout",
        }
    }
}

/// Broadcast handle for session notifications. Cheap to clone; every
/// subscriber sees every event sent after it subscribed.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUFFER_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn established(&self, claims: Claims) {
        let _ = self
            .tx
            .send(SessionEvent::Established(claims))
            .map_err(|_| debug!("session established, no listeners"));
    }

    pub fn ended(&self, reason: EndReason) {
        let _ = self
            .tx
            .send(SessionEvent::Ended(reason))
            .map_err(|_| debug!("session ended, no listeners"));
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
