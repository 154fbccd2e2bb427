use http::header::{HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};

use crate::credentials::store::CredentialStore;
use crate::observability::metrics::get_metrics;
use crate::persistence::KeyValueStore;
use crate::transport::descriptor::RequestDescriptor;

static DECORATED_MSG: &'static str = "decorated";
static EXEMPT_MSG: &'static str = "exempt";
static UNDECORATED_MSG: &'static str = "undecorated";

/// URL substrings exempt from credential decoration and renewal
/// (login, registration, the renewal endpoint itself, OTP flows).
#[derive(Debug, Clone)]
pub struct ExemptionList {
    patterns: Vec<String>,
}

impl ExemptionList {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| path.contains(pattern))
    }
}

/// Attaches the current access credential to outgoing requests.
/// Read-only against the credential store.
#[derive(Debug, Clone)]
pub struct RequestDecorator<P> {
    store: CredentialStore<P>,
    exemptions: ExemptionList,
}

impl<P: KeyValueStore> RequestDecorator<P> {
    pub fn new(store: CredentialStore<P>, exemptions: ExemptionList) -> Self {
        Self { store, exemptions }
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.exemptions.matches(path)
    }

    /// Return a decorated copy of `descriptor`. Exempt targets pass
    /// through unmodified; a missing credential is logged but never an
    /// error, since some requests are valid pre-authentication.
    pub async fn decorate(&self, descriptor: &RequestDescriptor) -> RequestDescriptor {
        let metrics = get_metrics().await;
        if self.exemptions.matches(&descriptor.path) {
            debug!(path = %descriptor.path, "target exempt from credential decoration");
            metrics.decorated_requests.with_label_values(&[EXEMPT_MSG]).inc();
            return descriptor.clone();
        }

        let mut decorated = descriptor.clone();
        match self.store.access_token().await {
            Some(token) => match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    decorated.headers.insert(AUTHORIZATION, value);
                    metrics.decorated_requests.with_label_values(&[DECORATED_MSG]).inc();
                }
                Err(err) => {
                    warn!(path = %descriptor.path, "access credential not header-safe: {}", err);
                    metrics.decorated_requests.with_label_values(&[UNDECORATED_MSG]).inc();
                }
            },
            None => {
                warn!(path = %descriptor.path, "access credential not found, request proceeds undecorated");
                metrics.decorated_requests.with_label_values(&[UNDECORATED_MSG]).inc();
            }
        }
        decorated
    }
}

#[cfg(test)]
mod test {
    use super::ExemptionList;

    #[test]
    fn substring_match_covers_query_and_prefix_forms() {
        let list = ExemptionList::new(vec!["/auth/login".into(), "/auth/otp".into()]);
        assert!(list.matches("/auth/login"));
        assert!(list.matches("/api/v2/auth/login?redirect=1"));
        assert!(list.matches("/auth/otp/verify"));
        assert!(!list.matches("/users/42"));
    }
}
