//! npm registry client for live version lookups

use crate::compose::RegistryLookup;
use crate::error::LookupError;
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// HTTP timeout for a single registry request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Body of `GET <registry>/<name>/latest`; other fields are ignored
#[derive(Debug, Deserialize)]
struct LatestRelease {
    version: String,
}

/// Registry client - resolves the `latest` dist-tag of a package
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    base: Url,
    client: reqwest::Client,
}

impl NpmRegistry {
    /// Create a new client with a custom user agent
    pub fn new(base: Url, user_agent: &str) -> Self {
        Self::with_timeout(base, user_agent, REQUEST_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base: Url, user_agent: &str, timeout: Duration) -> Self {
        Self {
            base,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a client from a product config, honoring its env override
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.registry_url_env())
            .unwrap_or_else(|_| config.default_registry_url().to_string());
        let url =
            Url::parse(&url_str).with_context(|| format!("Invalid registry URL: {}", url_str))?;
        Ok(Self::new(url, config.user_agent()))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `<base>/<name>/latest`, keeping scoped names as two segments
    fn latest_url(&self, name: &str) -> Result<Url, LookupError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| LookupError::Transport(format!("URL cannot have path segments: {}", self.base)))?;
            segments.pop_if_empty();
            for part in name.split('/') {
                segments.push(part);
            }
            segments.push("latest");
        }
        Ok(url)
    }
}

#[async_trait]
impl RegistryLookup for NpmRegistry {
    async fn latest_version(&self, name: &str) -> Result<String, LookupError> {
        let url = self.latest_url(name)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        let release: LatestRelease =
            serde_json::from_str(&body).map_err(|e| LookupError::Malformed(e.to_string()))?;
        Ok(release.version)
    }
}
