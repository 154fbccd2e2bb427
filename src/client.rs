use http::StatusCode;
use tokio::sync::broadcast::Receiver;
use tracing::{debug, info, warn};

use crate::config::settings::ClientConfig;
use crate::credentials::claims::Claims;
use crate::credentials::store::CredentialStore;
use crate::credentials::token::CredentialPair;
use crate::error::{ClientError, TransportError};
use crate::persistence::memory::MemoryStore;
use crate::persistence::KeyValueStore;
use crate::refresh::coordinator::RefreshCoordinator;
use crate::refresh::executor::{HttpRenewalExecutor, RenewToken};
use crate::session::events::{EndReason, SessionEvent, SessionEvents};
use crate::session::invalidator::SessionInvalidator;
use crate::transport::decorator::{ExemptionList, RequestDecorator};
use crate::transport::descriptor::{RequestAttempt, RequestDescriptor};
use crate::transport::http_transport::HttpTransport;
use crate::transport::{SendRequest, TransportResponse};

/// Request execution façade.
///
/// Submits decorated requests over the transport, intercepts
/// credential-expiry responses before they reach the caller, and hands
/// them to the refresh coordinator for a single renewal plus replay.
pub struct ApiClient<T, R, P = MemoryStore> {
    transport: T,
    decorator: RequestDecorator<P>,
    coordinator: RefreshCoordinator<R, P>,
    store: CredentialStore<P>,
    invalidator: SessionInvalidator<P>,
    events: SessionEvents,
}

impl ApiClient<HttpTransport, HttpRenewalExecutor, MemoryStore> {
    /// Ready-to-use client over reqwest with in-memory persistence.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::with_persistence(config, MemoryStore::new())
    }
}

impl<P: KeyValueStore + Clone> ApiClient<HttpTransport, HttpRenewalExecutor, P> {
    /// Client over reqwest with a caller-chosen persistence backend.
    pub fn with_persistence(config: &ClientConfig, persistence: P) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(TransportError::from)?;
        let base_url = config.base_url.trim_end_matches('/');
        let transport = HttpTransport::with_client(base_url, client.clone());
        let executor =
            HttpRenewalExecutor::new(format!("{}{}", base_url, config.renewal_path()), client);
        let store = CredentialStore::new(persistence, config.access_ttl(), config.renewal_ttl());
        Ok(Self::new(
            transport,
            executor,
            store,
            ExemptionList::new(config.exempt_paths()),
        ))
    }
}

impl<T, R, P> ApiClient<T, R, P>
where
    T: SendRequest,
    R: RenewToken,
    P: KeyValueStore + Clone,
{
    pub fn new(
        transport: T,
        executor: R,
        store: CredentialStore<P>,
        exemptions: ExemptionList,
    ) -> Self {
        let events = SessionEvents::new();
        let invalidator = SessionInvalidator::new(store.clone(), events.clone());
        let decorator = RequestDecorator::new(store.clone(), exemptions);
        let coordinator = RefreshCoordinator::new(executor, store.clone(), invalidator.clone());
        Self {
            transport,
            decorator,
            coordinator,
            store,
            invalidator,
            events,
        }
    }

    /// Execute a request, transparently renewing the access credential
    /// on an expiry signal and resubmitting once.
    ///
    /// Every response status other than 401 passes through untouched.
    /// A 401 on an exempt target, on an already-replayed request, or
    /// without an active session also passes through, verbatim.
    pub async fn execute(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<TransportResponse, ClientError> {
        let mut attempt = RequestAttempt::new(descriptor);
        loop {
            let request = self.decorator.decorate(&attempt.descriptor).await;
            let response = self.transport.send(request).await?;
            if response.status != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }
            if self.decorator.is_exempt(&attempt.descriptor.path) {
                debug!(path = %attempt.descriptor.path, "unauthorized on exempt target, passing through");
                return Ok(response);
            }
            if attempt.retried() {
                warn!(path = %attempt.descriptor.path, "still unauthorized after renewal, surfacing");
                return Ok(response);
            }
            if !self.store.has_session().await {
                debug!(path = %attempt.descriptor.path, "expiry signal without active session, ignored");
                return Ok(response);
            }

            self.coordinator.handle_expiry(&attempt.descriptor.path).await?;
            attempt.mark_retried();
            // loop resubmits, decorated with the renewed credential
        }
    }

    /// Install freshly issued credentials and announce the session.
    /// The session id comes out of the access token's decoded claims.
    pub async fn establish_session(
        &self,
        access_token: &str,
        renewal_token: &str,
    ) -> anyhow::Result<Claims> {
        let (pair, claims) = CredentialPair::from_tokens(access_token, renewal_token)?;
        self.store.install(&pair).await?;
        info!(session_id = %pair.session_id, "session established");
        self.events.established(claims.clone());
        Ok(claims)
    }

    /// Deliberate sign-out: clears credentials, emits one `Ended`.
    pub async fn end_session(&self) {
        self.invalidator.invalidate(EndReason::Logout).await;
    }

    pub fn events(&self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &CredentialStore<P> {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn coordinator(&self) -> &RefreshCoordinator<R, P> {
        &self.coordinator
    }
}
