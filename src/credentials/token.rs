use anyhow::Result;

use crate::credentials::claims::{decode_claims, Claims};

/// The full credential set for one authenticated session.
///
/// The session id is derived from the access token's claims at build
/// time and must stay stable across renewals.
#[derive(Debug, Clone)]
pub struct CredentialPair {
    pub access_token: String,
    pub renewal_token: String,
    pub session_id: String,
}

impl CredentialPair {
    /// Build a pair from freshly issued tokens, deriving the session id
    /// from the access token's decoded claims.
    pub fn from_tokens(access_token: &str, renewal_token: &str) -> Result<(Self, Claims)> {
        let claims = decode_claims(access_token)?;
        Ok((
            Self {
                access_token: access_token.to_owned(),
                renewal_token: renewal_token.to_owned(),
                session_id: claims.session_id.clone(),
            },
            claims,
        ))
    }
}

/// The slice of the credential pair a renewal exchange needs.
#[derive(Debug, Clone)]
pub struct RenewalGrant {
    pub renewal_token: String,
    pub session_id: String,
}
