use std::mem;

use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::credentials::claims::decode_claims;
use crate::credentials::store::CredentialStore;
use crate::error::RenewalError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::persistence::KeyValueStore;
use crate::refresh::executor::RenewToken;
use crate::session::events::EndReason;
use crate::session::invalidator::SessionInvalidator;

static RESOLVED_MSG: &'static str = "resolved";
static REJECTED_MSG: &'static str = "rejected";

/// One request blocked on the in-flight renewal, awaiting the shared
/// outcome. Created when a request fails with expiry while a renewal is
/// already running, destroyed when the queue drains.
struct PendingRequest {
    target: String,
    tx: oneshot::Sender<Result<String, RenewalError>>,
}

/// The pending queue exists only inside the `Renewing` variant, so
/// "queue non-empty implies a renewal is in flight" and "at most one
/// renewal in flight" hold by construction.
enum RenewalState {
    Idle,
    Renewing { pending: Vec<PendingRequest> },
}

enum Role {
    Leader,
    Waiter(oneshot::Receiver<Result<String, RenewalError>>),
}

/// Decides, on each credential-expiry signal, whether to start a
/// renewal or to enqueue the signalling request behind the one already
/// in flight, and drains the queue in arrival order when it settles.
pub struct RefreshCoordinator<R, P> {
    executor: R,
    store: CredentialStore<P>,
    invalidator: SessionInvalidator<P>,
    state: Mutex<RenewalState>,
}

impl<R: RenewToken, P: KeyValueStore> RefreshCoordinator<R, P> {
    pub fn new(executor: R, store: CredentialStore<P>, invalidator: SessionInvalidator<P>) -> Self {
        Self {
            executor,
            store,
            invalidator,
            state: Mutex::new(RenewalState::Idle),
        }
    }

    /// Entry point for a request that observed a credential-expiry
    /// signal. Resolves with the renewed access credential once the
    /// (single) renewal settles, or with the renewal failure.
    ///
    /// No timeout: a hung renewal exchange stalls every caller here.
    pub async fn handle_expiry(&self, target: &str) -> Result<String, RenewalError> {
        let role = {
            let mut state = self.state.lock().await;
            match &mut *state {
                RenewalState::Renewing { pending } => {
                    let (tx, rx) = oneshot::channel();
                    pending.push(PendingRequest {
                        target: target.to_owned(),
                        tx,
                    });
                    debug!(%target, queued = pending.len(), "renewal in flight, request queued");
                    Role::Waiter(rx)
                }
                RenewalState::Idle => {
                    *state = RenewalState::Renewing {
                        pending: Vec::new(),
                    };
                    debug!(%target, "expiry signal, starting renewal");
                    Role::Leader
                }
            }
        };

        match role {
            Role::Waiter(rx) => rx
                .await
                .unwrap_or_else(|_| Err(RenewalError::transient("renewal abandoned before settling"))),
            Role::Leader => {
                let outcome = self.run_exchange().await;
                self.settle(outcome).await
            }
        }
    }

    /// The single renewal exchange plus commit. Runs outside the state
    /// lock so late expiry signals can still enqueue while it is away.
    async fn run_exchange(&self) -> Result<String, RenewalError> {
        let metrics = get_metrics().await;
        metrics.renewal_attempts.inc();
        let start = get_instant();

        let grant = self
            .store
            .renewal_grant()
            .await
            .ok_or_else(|| RenewalError::transient("no active session to renew"))?;

        let result = self
            .executor
            .renew(&grant.renewal_token, &grant.session_id)
            .await;
        metrics.renewal_duration.observe(start.elapsed().as_secs_f64());
        let access_token = result?;

        let claims = decode_claims(&access_token).map_err(|err| {
            RenewalError::transient(format!("renewal returned an undecodable credential: {}", err))
        })?;
        // session id must survive a renewal
        if claims.session_id != grant.session_id {
            return Err(RenewalError::SessionChanged {
                expected: grant.session_id,
                got: claims.session_id,
            });
        }

        self.store.commit_access(&access_token).await.map_err(|err| {
            RenewalError::transient(format!("committing renewed credential: {}", err))
        })?;
        info!(session_id = %grant.session_id, "access credential renewed");
        Ok(access_token)
    }

    /// Drain the queue in arrival order, return to `Idle`, and end the
    /// session when the failure was authorization-class. Settling an
    /// already-idle coordinator is a no-op drain.
    async fn settle(&self, outcome: Result<String, RenewalError>) -> Result<String, RenewalError> {
        let pending = {
            let mut state = self.state.lock().await;
            match mem::replace(&mut *state, RenewalState::Idle) {
                RenewalState::Renewing { pending } => pending,
                RenewalState::Idle => Vec::new(),
            }
        };

        let metrics = get_metrics().await;
        let label = if outcome.is_ok() { RESOLVED_MSG } else { REJECTED_MSG };
        let drained = pending.len();
        for request in pending {
            if request.tx.send(outcome.clone()).is_err() {
                // the waiter went away; the queue moves on
                debug!(target = %request.target, "pending request dropped before drain");
            }
        }
        metrics
            .drained_requests
            .with_label_values(&[label])
            .inc_by(drained as u64);

        match &outcome {
            Ok(_) => debug!(drained, "pending requests resolved with renewed credential"),
            Err(err) => {
                warn!(drained, "renewal failed: {}", err);
                metrics
                    .renewal_failures
                    .with_label_values(&[err.reason()])
                    .inc();
                if err.ends_session() {
                    self.invalidator.invalidate(EndReason::RenewalRejected).await;
                }
            }
        }
        outcome
    }

    #[cfg(test)]
    pub(crate) async fn is_idle(&self) -> bool {
        matches!(*self.state.lock().await, RenewalState::Idle)
    }
}
