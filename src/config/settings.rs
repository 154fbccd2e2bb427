use std::time::Duration;

use serde::Deserialize;

pub const RENEWAL_PATH_DEFAULT: &str = "/auth/refresh";
/// Matches the lifetime of the cookie the access credential came from.
pub const ACCESS_TTL_SECONDS_DEFAULT: u64 = 86_400; // 1 day
pub const RENEWAL_TTL_SECONDS_DEFAULT: u64 = 604_800; // 7 days
pub const REQUEST_TIMEOUT_SECONDS_DEFAULT: u64 = 30;

/// ================================
/// Client configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub renewal_path: Option<String>,
    /// URL substrings that never receive credential decoration and
    /// never trigger renewal. The renewal path is always included.
    pub exempt_paths: Option<Vec<String>>,
    pub access_ttl_seconds: Option<u64>,
    pub renewal_ttl_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
    pub logging: Option<LoggingConfig>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            renewal_path: None,
            exempt_paths: None,
            access_ttl_seconds: None,
            renewal_ttl_seconds: None,
            request_timeout_seconds: None,
            logging: None,
        }
    }

    pub fn renewal_path(&self) -> &str {
        self.renewal_path.as_deref().unwrap_or(RENEWAL_PATH_DEFAULT)
    }

    /// Effective exemption set: configured entries (or the stock
    /// pre-auth endpoints) plus the renewal path itself, so the renewal
    /// exchange can never be intercepted as expired.
    pub fn exempt_paths(&self) -> Vec<String> {
        let mut paths = self.exempt_paths.clone().unwrap_or_else(|| {
            vec![
                "/auth/login".to_owned(),
                "/auth/register".to_owned(),
                "/auth/otp".to_owned(),
            ]
        });
        let renewal_path = self.renewal_path().to_owned();
        if !paths.contains(&renewal_path) {
            paths.push(renewal_path);
        }
        paths
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_seconds.unwrap_or(ACCESS_TTL_SECONDS_DEFAULT))
    }

    pub fn renewal_ttl(&self) -> Duration {
        Duration::from_secs(self.renewal_ttl_seconds.unwrap_or(RENEWAL_TTL_SECONDS_DEFAULT))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_seconds
                .unwrap_or(REQUEST_TIMEOUT_SECONDS_DEFAULT),
        )
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "json".to_string())
            .to_lowercase()
            .as_str()
        {
            "compact" | "text" => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}
