use anyhow::{anyhow, Result};
use base64::Engine;
use serde::Deserialize;

/// Claims carried in the access credential payload.
///
/// Decoded client-side without signature verification: the server
/// validates the token, this layer only reads identity data out of it.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub role: Vec<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

pub fn decode_claims(access_token: &str) -> Result<Claims> {
    let parts: Vec<&str> = access_token.split('.').collect();
    if parts.len() != 3 {
        return Err(anyhow!("invalid JWT format"));
    }

    let payload = parts[1];
    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| anyhow!("base64 decode error: {}", e))?;

    serde_json::from_slice::<Claims>(&decoded).map_err(|e| anyhow!("invalid JWT payload: {}", e))
}

#[cfg(test)]
mod test {
    use super::*;
    use base64::Engine;

    fn jwt_with_payload(payload: &str) -> String {
        let b64 = |s: &str| base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(s);
        format!("{}.{}.{}", b64(r#"{"alg":"HS256","typ":"JWT"}"#), b64(payload), b64("sig"))
    }

    #[test]
    fn decodes_session_and_roles() {
        let token = jwt_with_payload(r#"{"sessionId":"s-1","role":["ADMIN"],"exp":1893456000}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.session_id, "s-1");
        assert_eq!(claims.role, vec!["ADMIN".to_string()]);
        assert_eq!(claims.exp, Some(1893456000));
    }

    #[test]
    fn rejects_non_jwt_values() {
        assert!(decode_claims("opaque-token").is_err());
        assert!(decode_claims("a.%%%.c").is_err());
    }

    #[test]
    fn missing_session_id_is_an_error() {
        let token = jwt_with_payload(r#"{"role":["ADMIN"]}"#);
        assert!(decode_claims(&token).is_err());
    }
}
