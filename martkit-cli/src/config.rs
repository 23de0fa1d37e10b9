//! Configuration for the martkit CLI.
//!
//! A small TOML file names the API base URL, where the session token is
//! persisted, and the payment-gateway display settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// API section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root URL of the storefront API, e.g. `https://shop.example.com/api/`.
    pub base_url: Url,
    /// Where the bearer token is persisted between invocations.
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

/// Payment-gateway display settings, shown when the payment prompt opens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub key_id: Option<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
}

fn default_token_file() -> PathBuf {
    PathBuf::from("./martkit-token")
}

/// Load and validate the configuration, applying the CLI base-URL override
/// when given.
pub fn load(path: &Path, base_url_override: Option<Url>) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: FileConfig = toml::from_str(&content)?;

    if let Some(base_url) = base_url_override {
        config.api.base_url = base_url;
    }
    config.api.base_url = normalize_base_url(config.api.base_url)?;

    Ok(config)
}

/// `Url::join` treats a path without a trailing slash as a file and would
/// drop its last segment, so `/api` must become `/api/`.
fn normalize_base_url(mut url: Url) -> Result<Url, ConfigError> {
    if url.cannot_be_a_base() {
        return Err(ConfigError::Validation(format!(
            "base_url {url} cannot be used as an API root"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing_with_defaults() {
        let toml_str = r#"
[api]
base_url = "https://shop.example.com/api"

[gateway]
key_id = "rzp_test_abc123"
merchant_name = "Example Mart"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.token_file, PathBuf::from("./martkit-token"));
        assert_eq!(config.gateway.merchant_name.as_deref(), Some("Example Mart"));
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let url = Url::parse("https://shop.example.com/api").unwrap();
        let normalized = normalize_base_url(url).unwrap();
        assert_eq!(normalized.as_str(), "https://shop.example.com/api/");
        // Joining now keeps the /api prefix.
        assert_eq!(
            normalized.join("carts").unwrap().as_str(),
            "https://shop.example.com/api/carts"
        );
    }
}
