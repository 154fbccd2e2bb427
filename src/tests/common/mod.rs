// tests/common/mod.rs
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use http::header::AUTHORIZATION;
use http::{HeaderMap, StatusCode};
use serde_json::json;
use tokio::sync::{Mutex, RwLock, Semaphore};

use crate::client::ApiClient;
use crate::credentials::store::CredentialStore;
use crate::error::{RenewalError, TransportError};
use crate::persistence::memory::MemoryStore;
use crate::refresh::executor::RenewToken;
use crate::transport::decorator::ExemptionList;
use crate::transport::descriptor::RequestDescriptor;
use crate::transport::{SendRequest, TransportResponse};

pub const SESSION_ID: &str = "session-1";
pub const RENEWAL_TOKEN: &str = "renewal-1";

/// Unsigned JWT; only the payload matters to the claims decoder.
pub fn jwt_with_claims(claims: &serde_json::Value) -> String {
    let b64 = |bytes: &[u8]| base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
    format!(
        "{}.{}.{}",
        b64(br#"{"alg":"HS256","typ":"JWT"}"#),
        b64(claims.to_string().as_bytes()),
        b64(b"sig")
    )
}

/// Access credential for the shared test session. The generation claim
/// makes each issued credential a distinct string.
pub fn access_token(generation: u32) -> String {
    jwt_with_claims(&json!({
        "sessionId": SESSION_ID,
        "role": ["ADMIN"],
        "exp": 4102444800u64,
        "gen": generation,
    }))
}

/// What the scripted transport saw, in send order.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub path: String,
    pub authorization: Option<String>,
}

/// Transport double: 200 for requests bearing the accepted credential,
/// 401 for everything else. Records every send in order.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    accepted: Arc<RwLock<String>>,
    sent: Arc<Mutex<Vec<SentRequest>>>,
}

impl ScriptedTransport {
    pub fn accepting(token: &str) -> Self {
        Self {
            accepted: Arc::new(RwLock::new(token.to_owned())),
            sent: Arc::default(),
        }
    }

    pub async fn accept(&self, token: &str) {
        *self.accepted.write().await = token.to_owned();
    }

    pub async fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl SendRequest for ScriptedTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<TransportResponse, TransportError> {
        let authorization = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_owned());
        self.sent.lock().await.push(SentRequest {
            path: request.path.clone(),
            authorization: authorization.clone(),
        });

        let expected = format!("Bearer {}", self.accepted.read().await);
        let status = if authorization.as_deref() == Some(expected.as_str()) {
            StatusCode::OK
        } else {
            StatusCode::UNAUTHORIZED
        };
        Ok(TransportResponse {
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        })
    }
}

/// Renewal double: consumes one gate permit per exchange, then yields
/// the next scripted outcome. Lets a test hold a renewal open while
/// more requests pile up behind it.
#[derive(Clone)]
pub struct GatedRenewal {
    outcomes: Arc<Mutex<VecDeque<Result<String, RenewalError>>>>,
    gate: Arc<Semaphore>,
    calls: Arc<AtomicUsize>,
}

impl GatedRenewal {
    /// Gate starts closed; call [`GatedRenewal::release`] to let the
    /// in-flight exchange finish.
    pub fn gated(outcome: Result<String, RenewalError>) -> Self {
        Self::with_permits(outcome, 0)
    }

    /// Gate already open: exchanges complete immediately.
    pub fn open(outcome: Result<String, RenewalError>) -> Self {
        Self::with_permits(outcome, 64)
    }

    fn with_permits(outcome: Result<String, RenewalError>, permits: usize) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from([outcome]))),
            gate: Arc::new(Semaphore::new(permits)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub async fn push_outcome(&self, outcome: Result<String, RenewalError>) {
        self.outcomes.lock().await.push_back(outcome);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RenewToken for GatedRenewal {
    async fn renew(&self, _renewal_token: &str, _session_id: &str) -> Result<String, RenewalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self.gate.acquire().await.expect("renewal gate closed");
        permit.forget();
        self.outcomes
            .lock()
            .await
            .pop_front()
            .expect("no scripted renewal outcome left")
    }
}

pub type TestClient = ApiClient<ScriptedTransport, GatedRenewal, MemoryStore>;

pub fn test_store() -> CredentialStore<MemoryStore> {
    CredentialStore::new(
        MemoryStore::new(),
        Duration::from_secs(60),
        Duration::from_secs(3600),
    )
}

/// Client with an established session on generation-1 credentials and
/// the stock `/auth/` exemption.
pub async fn authed_client(transport: ScriptedTransport, renewal: GatedRenewal) -> TestClient {
    let client = ApiClient::new(
        transport,
        renewal,
        test_store(),
        ExemptionList::new(vec!["/auth/".to_owned()]),
    );
    client
        .establish_session(&access_token(1), RENEWAL_TOKEN)
        .await
        .expect("establish session");
    client
}

/// Let spawned tasks run until the transport has seen `n` sends, plus a
/// few extra turns so every blocked task reaches its suspension point.
/// Only meaningful on the current-thread runtime flavor.
pub async fn wait_for_sends(transport: &ScriptedTransport, n: usize) {
    for _ in 0..1000 {
        if transport.sent_count().await >= n {
            break;
        }
        tokio::task::yield_now().await;
    }
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
