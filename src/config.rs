use std::path::Path;

use serde::Deserialize;

use crate::error::{ActionError, Result};

fn default_user_agent() -> String {
    "panel-file-actions/0.1".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Connection settings for the panel's client API
#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    /// Panel root, e.g. `https://panel.example.com`
    pub base_url: String,
    /// Client API key sent as a bearer token
    pub api_key: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout handed to the HTTP client
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl PanelConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout(),
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: PanelConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&raw)
    }

    /// Read `PANEL_URL`, `PANEL_API_KEY` and optionally `PANEL_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("PANEL_URL").map_err(|_| ActionError::InvalidConfig {
            message: "PANEL_URL is not set".to_string(),
        })?;
        let api_key = std::env::var("PANEL_API_KEY").map_err(|_| ActionError::InvalidConfig {
            message: "PANEL_API_KEY is not set".to_string(),
        })?;

        let mut config = Self::new(base_url, api_key);
        if let Ok(raw) = std::env::var("PANEL_TIMEOUT_SECS") {
            config.request_timeout_secs = raw.parse().map_err(|_| ActionError::InvalidConfig {
                message: format!("PANEL_TIMEOUT_SECS is not a number: {}", raw),
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ActionError::InvalidConfig {
                message: format!("base_url must be an http(s) URL, got '{}'", self.base_url),
            });
        }
        if self.api_key.trim().is_empty() {
            return Err(ActionError::InvalidConfig {
                message: "api_key is empty".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ActionError::InvalidConfig {
                message: "request_timeout_secs must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config =
            PanelConfig::from_json_str(r#"{"base_url": "https://panel.test", "api_key": "ptlc_abc"}"#)
                .unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.user_agent, "panel-file-actions/0.1");
    }

    #[test]
    fn test_rejects_bad_url() {
        let err = PanelConfig::from_json_str(r#"{"base_url": "panel.test", "api_key": "k"}"#)
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_empty_key() {
        let err = PanelConfig::new("https://panel.test", "  ").validate().unwrap_err();
        assert!(matches!(err, ActionError::InvalidConfig { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = PanelConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ActionError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("panel.json");
        tokio::fs::write(
            &path,
            r#"{"base_url": "http://localhost:8080", "api_key": "key", "request_timeout_secs": 5}"#,
        )
        .await
        .unwrap();

        let config = PanelConfig::from_file(&path).await.unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 5);
    }
}
