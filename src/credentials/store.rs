use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::credentials::token::{CredentialPair, RenewalGrant};
use crate::persistence::KeyValueStore;

static KEY_ACCESS: &str = "access_token";
static KEY_RENEWAL: &str = "renewal_token";
static KEY_SESSION: &str = "session_id";

/// Credential store: owns no bytes itself, delegates physical storage
/// to a [`KeyValueStore`] with per-entry expiry.
///
/// An injectable object rather than process-wide state, so multiple
/// independent clients (and test doubles) can coexist in one process.
#[derive(Debug, Clone)]
pub struct CredentialStore<P> {
    persistence: P,
    access_ttl: Duration,
    renewal_ttl: Duration,
}

impl<P: KeyValueStore> CredentialStore<P> {
    pub fn new(persistence: P, access_ttl: Duration, renewal_ttl: Duration) -> Self {
        Self {
            persistence,
            access_ttl,
            renewal_ttl,
        }
    }

    /// Install a full pair at session establishment.
    pub async fn install(&self, pair: &CredentialPair) -> Result<()> {
        self.persistence
            .set(KEY_ACCESS, &pair.access_token, self.access_ttl)
            .await?;
        self.persistence
            .set(KEY_RENEWAL, &pair.renewal_token, self.renewal_ttl)
            .await?;
        // session id lives as long as the renewal credential
        self.persistence
            .set(KEY_SESSION, &pair.session_id, self.renewal_ttl)
            .await?;
        debug!(session_id = %pair.session_id, "credentials installed");
        Ok(())
    }

    /// Current access credential, if present and unexpired.
    pub async fn access_token(&self) -> Option<String> {
        self.persistence.get(KEY_ACCESS).await
    }

    /// What a renewal exchange needs. Present as long as the session is
    /// active, even when the short-lived access entry already lapsed.
    pub async fn renewal_grant(&self) -> Option<RenewalGrant> {
        let renewal_token = self.persistence.get(KEY_RENEWAL).await?;
        let session_id = self.persistence.get(KEY_SESSION).await?;
        Some(RenewalGrant {
            renewal_token,
            session_id,
        })
    }

    pub async fn has_session(&self) -> bool {
        self.renewal_grant().await.is_some()
    }

    /// Replace the access credential in place after a successful
    /// renewal. The renewal credential and session id are untouched.
    pub async fn commit_access(&self, access_token: &str) -> Result<()> {
        self.persistence
            .set(KEY_ACCESS, access_token, self.access_ttl)
            .await
    }

    /// Drop everything. Used by the session invalidator.
    pub async fn clear(&self) -> Result<()> {
        self.persistence.clear(KEY_ACCESS).await?;
        self.persistence.clear(KEY_RENEWAL).await?;
        self.persistence.clear(KEY_SESSION).await?;
        Ok(())
    }
}
