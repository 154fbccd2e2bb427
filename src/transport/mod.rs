/// Transport module
///
/// The generic "send request" capability the client layer sits on, plus
/// request descriptors and credential decoration. Any HTTP status is a
/// normal response here; transport errors are network-level failures.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::TransportError;
use crate::transport::descriptor::RequestDescriptor;

pub mod decorator;
pub mod descriptor;
pub mod http_transport;

pub trait SendRequest: Send + Sync {
    fn send(
        &self,
        request: RequestDescriptor,
    ) -> impl std::future::Future<Output = Result<TransportResponse, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TransportResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
