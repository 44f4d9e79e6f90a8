//! Hosting/proxy profile lookup for a URL's host.

use crate::clients::{HostProfile, IpReputationLookup};
use crate::config::ApiSettings;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct HostProfileResponse {
    #[serde(default)]
    proxy: bool,
    #[serde(default)]
    hosting: bool,
}

pub struct HostProfileClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HostProfileClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        if settings.endpoint.is_empty() {
            return Err(anyhow!("ip_reputation endpoint must not be empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!("scamcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build host profile HTTP client")?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl IpReputationLookup for HostProfileClient {
    async fn host_profile(&self, host: &str) -> Result<HostProfile> {
        log::debug!("Querying host profile for {host}");
        let mut request = self
            .client
            .get(format!("{}/{host}", self.endpoint.trim_end_matches('/')));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .context("Host profile request failed")?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Host profile returned status {}",
                response.status()
            ));
        }

        let body: HostProfileResponse = response
            .json()
            .await
            .context("Host profile response was not valid JSON")?;

        Ok(HostProfile {
            is_proxy: body.proxy,
            is_hosting: body.hosting,
        })
    }
}
