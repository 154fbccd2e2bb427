use thiserror::Error;

/// Failure surface of [`crate::client::ApiClient::execute`].
///
/// HTTP responses with non-success statuses are not errors at this
/// layer: they pass through to the caller untouched. An error here
/// means the request could not produce a response at all.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The request was blocked on a credential renewal that failed.
    #[error("credential renewal failed: {0}")]
    Renewal(#[from] RenewalError),
}

/// Network-level transport failure. Status codes never end up here.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network failure: {detail}")]
    Network { detail: String },

    #[error("request could not be built: {detail}")]
    InvalidRequest { detail: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return TransportError::InvalidRequest {
                detail: err.to_string(),
            };
        }
        TransportError::Network {
            detail: err.to_string(),
        }
    }
}

/// Outcome of a failed renewal exchange.
///
/// Cloned into every pending request record that was queued against the
/// renewal, so it carries owned detail strings rather than source errors.
#[derive(Debug, Clone, Error)]
pub enum RenewalError {
    /// The renewal credential itself was rejected. Ends the session.
    #[error("renewal credential rejected: {detail}")]
    Unauthorized { detail: String },

    /// The exchange failed for a reason other than an invalid renewal
    /// credential. The session is kept, callers may retry later.
    #[error("renewal exchange failed: {detail}")]
    Transient { detail: String },

    /// The renewed credential belongs to a different session. Protocol
    /// violation, treated like a rejected renewal credential.
    #[error("renewal switched session from '{expected}' to '{got}'")]
    SessionChanged { expected: String, got: String },
}

impl RenewalError {
    pub fn transient(detail: impl Into<String>) -> Self {
        RenewalError::Transient {
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        RenewalError::Unauthorized {
            detail: detail.into(),
        }
    }

    /// Whether this failure invalidates the session.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            RenewalError::Unauthorized { .. } | RenewalError::SessionChanged { .. }
        )
    }

    /// Metrics/logging label for the failure class.
    pub fn reason(&self) -> &'static str {
        match self {
            RenewalError::Unauthorized { .. } => "unauthorized",
            RenewalError::Transient { .. } => "transient",
            RenewalError::SessionChanged { .. } => "session_changed",
        }
    }
}
