use http::StatusCode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RenewalError;

/// The single network exchange trading a renewal credential for a new
/// access credential. Pure one-shot operation: implementations never
/// see the coordinator's queue, so they can be tested without any
/// concurrency concerns.
pub trait RenewToken: Send + Sync {
    fn renew(
        &self,
        renewal_token: &str,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<String, RenewalError>> + Send;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenewalRequest<'a> {
    renewal_token: &'a str,
    session_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenewalResponse {
    access_token: String,
}

/// HTTP implementation of the renewal exchange.
#[derive(Debug, Clone)]
pub struct HttpRenewalExecutor {
    url: String,
    client: Client,
}

impl HttpRenewalExecutor {
    /// `url` is the absolute renewal endpoint (base URL + renewal path).
    pub fn new(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

impl RenewToken for HttpRenewalExecutor {
    async fn renew(&self, renewal_token: &str, session_id: &str) -> Result<String, RenewalError> {
        debug!(%session_id, "renewal exchange started");
        let body = RenewalRequest {
            renewal_token,
            session_id,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|err| RenewalError::transient(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let detail = response.text().await.unwrap_or_default();
            if detail.is_empty() {
                return Err(RenewalError::unauthorized(status.to_string()));
            }
            return Err(RenewalError::Unauthorized { detail });
        }
        if !status.is_success() {
            return Err(RenewalError::transient(format!(
                "renewal endpoint returned {}",
                status
            )));
        }

        let parsed: RenewalResponse = response
            .json()
            .await
            .map_err(|err| RenewalError::transient(format!("invalid renewal response: {}", err)))?;
        Ok(parsed.access_token)
    }
}
