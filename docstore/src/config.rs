// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Document store authentication method.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No authentication.
    #[serde(rename = "none")]
    #[default]
    None,
    /// Bearer token authentication, e.g. an ID token from the auth provider.
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
}

/// Document store configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DocStoreConfig {
    /// Base URL of the document store API.
    pub base_url: String,
    /// Base URL of the image storage API. Falls back to `base_url` when unset.
    #[serde(default)]
    pub storage_url: Option<String>,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl DocStoreConfig {
    /// Returns the base URL used for image uploads.
    #[must_use]
    pub fn storage_url(&self) -> &str {
        self.storage_url.as_deref().unwrap_or(&self.base_url)
    }
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("kcal-docstore/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for DocStoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            storage_url: None,
            auth: AuthMethod::default(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_url_falls_back_to_base_url() {
        let config = DocStoreConfig {
            base_url: "https://db.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(config.storage_url(), "https://db.example.com");

        let config = DocStoreConfig {
            storage_url: Some("https://files.example.com".to_string()),
            ..config
        };
        assert_eq!(config.storage_url(), "https://files.example.com");
    }

    #[test]
    fn deserializes_tagged_auth() {
        let json = r#"{
            "base_url": "https://db.example.com",
            "auth": { "type": "bearer", "token": "t0k" }
        }"#;
        let config: DocStoreConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config.auth, AuthMethod::Bearer { ref token } if token == "t0k"));
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("kcal-docstore/"));
    }
}
