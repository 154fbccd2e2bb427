use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};

/// An outgoing request, described independently of the transport that
/// will carry it. `path` is joined onto the client's base URL.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        let mut descriptor = Self::new(Method::POST, path);
        descriptor.body = Some(body);
        descriptor
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A descriptor plus its retry bookkeeping.
///
/// The retried-once flag lives here, on a wrapper owned by the client
/// layer, never as a mutable field on the transport's request type. A
/// request that fails with expiry after one renewal-and-replay cycle is
/// surfaced terminally, not retried again.
#[derive(Debug)]
pub struct RequestAttempt {
    pub descriptor: RequestDescriptor,
    attempt: u8,
}

impl RequestAttempt {
    pub fn new(descriptor: RequestDescriptor) -> Self {
        Self {
            descriptor,
            attempt: 0,
        }
    }

    pub fn retried(&self) -> bool {
        self.attempt > 0
    }

    pub fn mark_retried(&mut self) {
        self.attempt = self.attempt.saturating_add(1);
    }
}
