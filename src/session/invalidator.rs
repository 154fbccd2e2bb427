use tracing::{error, info};

use crate::credentials::store::CredentialStore;
use crate::observability::metrics::get_metrics;
use crate::persistence::KeyValueStore;
use crate::session::events::{EndReason, SessionEvents};

/// Reacts to unrecoverable renewal failure (or a deliberate logout) by
/// clearing credentials and broadcasting one session-ended signal.
#[derive(Debug, Clone)]
pub struct SessionInvalidator<P> {
    store: CredentialStore<P>,
    events: SessionEvents,
}

impl<P: KeyValueStore> SessionInvalidator<P> {
    pub fn new(store: CredentialStore<P>, events: SessionEvents) -> Self {
        Self { store, events }
    }

    /// Clear the credential store and emit exactly one `Ended`
    /// notification, regardless of how many requests were blocked on
    /// the failure that led here.
    pub async fn invalidate(&self, reason: EndReason) {
        if let Err(err) = self.store.clear().await {
            // the session still ends; stale persisted entries expire on TTL
            error!("clearing credential store failed: {}", err);
        }
        let metrics = get_metrics().await;
        metrics
            .sessions_ended
            .with_label_values(&[reason.as_str()])
            .inc();
        info!(reason = reason.as_str(), "session ended");
        self.events.ended(reason);
    }
}
