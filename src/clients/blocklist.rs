//! URL blocklist lookup over a generic threat-intelligence HTTP endpoint.

use crate::clients::{UrlReputation, UrlReputationLookup};
use crate::config::ApiSettings;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
struct CachedReputation {
    reputation: UrlReputation,
    cached_at: Instant,
}

#[derive(Debug, Deserialize)]
struct BlocklistResponse {
    #[serde(default)]
    malicious: bool,
    #[serde(default)]
    threats: Vec<String>,
}

pub struct UrlBlocklistClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    cache: Mutex<HashMap<String, CachedReputation>>,
}

impl UrlBlocklistClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        if settings.endpoint.is_empty() {
            return Err(anyhow!("url_reputation endpoint must not be empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!("scamcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build blocklist HTTP client")?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn cached(&self, url: &str) -> Option<UrlReputation> {
        let cache = self.cache.lock().ok()?;
        let entry = cache.get(url)?;
        if entry.cached_at.elapsed() < CACHE_TTL {
            log::debug!("Using cached reputation for {url}");
            Some(entry.reputation.clone())
        } else {
            None
        }
    }

    fn store(&self, url: &str, reputation: &UrlReputation) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.retain(|_, entry| entry.cached_at.elapsed() < CACHE_TTL);
            cache.insert(
                url.to_string(),
                CachedReputation {
                    reputation: reputation.clone(),
                    cached_at: Instant::now(),
                },
            );
        }
    }
}

#[async_trait]
impl UrlReputationLookup for UrlBlocklistClient {
    async fn check_url(&self, url: &str) -> Result<UrlReputation> {
        if let Some(reputation) = self.cached(url) {
            return Ok(reputation);
        }

        log::debug!("Querying blocklist for {url}");
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "url": url }));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.context("Blocklist request failed")?;
        if !response.status().is_success() {
            return Err(anyhow!("Blocklist returned status {}", response.status()));
        }

        let body: BlocklistResponse = response
            .json()
            .await
            .context("Blocklist response was not valid JSON")?;

        let reputation = UrlReputation {
            is_malicious: body.malicious,
            threat_types: body.threats,
        };
        self.store(url, &reputation);
        Ok(reputation)
    }
}
