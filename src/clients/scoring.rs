//! Remote ML scoring endpoint over the fixed feature vector.

use crate::clients::{FeatureVector, ModelScore, RiskModel};
use crate::config::ApiSettings;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct RiskModelClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RiskModelClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        if settings.endpoint.is_empty() {
            return Err(anyhow!("ml endpoint must not be empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!("scamcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build scoring HTTP client")?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl RiskModel for RiskModelClient {
    async fn score(&self, features: &FeatureVector) -> Result<ModelScore> {
        log::debug!(
            "Scoring feature vector (text_length={}, keyword_score={})",
            features.text_length,
            features.keyword_score
        );
        let mut request = self.client.post(&self.endpoint).json(features);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.context("Scoring request failed")?;
        if !response.status().is_success() {
            return Err(anyhow!("Scoring returned status {}", response.status()));
        }

        let score: ModelScore = response
            .json()
            .await
            .context("Scoring response did not match the expected schema")?;
        Ok(score)
    }
}
