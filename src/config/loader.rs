use std::path::Path;

use anyhow::{anyhow, Result};

use crate::config::settings::ClientConfig;

/// Load and validate a client configuration from a YAML file.
pub async fn load_config(config_path: impl AsRef<Path>) -> Result<ClientConfig> {
    let path = config_path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("reading config {}: {}", path.display(), e))?;
    let config: ClientConfig =
        serde_yaml::from_str(&raw).map_err(|e| anyhow!("Invalid config format: {}", e))?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &ClientConfig) -> Result<()> {
    let url = reqwest::Url::parse(&config.base_url)
        .map_err(|e| anyhow!("base_url '{}' is not a valid URL: {}", config.base_url, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("base_url must be http or https, got '{}'", url.scheme()));
    }
    if !config.renewal_path().starts_with('/') {
        return Err(anyhow!(
            "renewal_path '{}' must start with '/'",
            config.renewal_path()
        ));
    }
    if config.access_ttl_seconds == Some(0) || config.renewal_ttl_seconds == Some(0) {
        return Err(anyhow!("credential TTLs must be non-zero"));
    }
    Ok(())
}
