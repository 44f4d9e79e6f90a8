//! Phone number validation over a numverify-style HTTP endpoint.

use crate::clients::{PhoneInfo, PhoneValidation};
use crate::config::ApiSettings;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct PhoneLookupResponse {
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    carrier: Option<String>,
    #[serde(default)]
    line_type: Option<String>,
}

pub struct PhoneLookupClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PhoneLookupClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        if settings.endpoint.is_empty() {
            return Err(anyhow!("phone_validation endpoint must not be empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!("scamcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build phone lookup HTTP client")?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl PhoneValidation for PhoneLookupClient {
    async fn validate(&self, number: &str) -> Result<PhoneInfo> {
        log::debug!("Validating phone number {number}");
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("number", number)]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("access_key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .context("Phone validation request failed")?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Phone validation returned status {}",
                response.status()
            ));
        }

        let body: PhoneLookupResponse = response
            .json()
            .await
            .context("Phone validation response was not valid JSON")?;

        Ok(PhoneInfo {
            is_valid: body.valid,
            carrier: body.carrier,
            line_type: body.line_type,
        })
    }
}
