//! External collaborator contracts. Each provider is reached through a
//! trait object so the engine depends only on the normalized result, never
//! on a concrete wire format. Mock implementations live in [`mock`] and back
//! both the test suite and the CLI's offline mode.

pub mod blocklist;
pub mod ip_profile;
pub mod llm;
pub mod mock;
pub mod phone_lookup;
pub mod scoring;
pub mod whois;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ProviderConfig;

#[derive(Debug, Clone, Default)]
pub struct UrlReputation {
    pub is_malicious: bool,
    pub threat_types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DomainInfo {
    pub domain: String,
    pub age_days: Option<u32>,
}

impl DomainInfo {
    /// Unknown age is not treated as young; only a confirmed low age flags.
    pub fn is_younger_than(&self, max_age_days: u32) -> bool {
        matches!(self.age_days, Some(age) if age <= max_age_days)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HostProfile {
    pub is_proxy: bool,
    pub is_hosting: bool,
}

#[derive(Debug, Clone)]
pub struct PhoneInfo {
    pub is_valid: bool,
    pub carrier: Option<String>,
    pub line_type: Option<String>,
}

/// One indicator inside an AI classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiIndicator {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub severity: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiRecommendation {
    Block,
    Caution,
    Investigate,
    #[default]
    LikelySafe,
    /// Providers drift; an unrecognized value must not fail the parse.
    #[serde(other)]
    Unknown,
}

/// The fixed LLM classification schema. Every field is defaulted so a
/// partial provider response still parses; range violations are clamped by
/// the accessors rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiClassification {
    pub is_scam: bool,
    pub confidence: i64,
    pub risk_level: String,
    pub scam_type: String,
    pub indicators: Vec<AiIndicator>,
    pub red_flags: Vec<String>,
    pub recommendation: AiRecommendation,
}

impl AiClassification {
    pub fn clamped_confidence(&self) -> u8 {
        self.confidence.clamp(0, 100) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
    Scam,
    #[default]
    NotScam,
    #[serde(other)]
    Unknown,
}

/// The fixed ML scoring schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelScore {
    pub prediction: Prediction,
    pub confidence: f64,
}

impl ModelScore {
    pub fn clamped_confidence(&self) -> f64 {
        self.confidence.clamp(0.0, 1.0)
    }
}

/// The fixed feature vector sent to the scoring endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub text_length: usize,
    pub keyword_score: u32,
    pub quality_score: u32,
    pub url_count: usize,
    pub email_count: usize,
    pub phone_count: usize,
    pub caps_ratio: f64,
    pub exclamation_count: usize,
}

#[async_trait]
pub trait UrlReputationLookup: Send + Sync {
    async fn check_url(&self, url: &str) -> Result<UrlReputation>;
}

#[async_trait]
pub trait DomainInfoLookup: Send + Sync {
    async fn domain_info(&self, domain: &str) -> Result<DomainInfo>;
}

#[async_trait]
pub trait IpReputationLookup: Send + Sync {
    async fn host_profile(&self, host: &str) -> Result<HostProfile>;
}

#[async_trait]
pub trait PhoneValidation: Send + Sync {
    async fn validate(&self, number: &str) -> Result<PhoneInfo>;
}

#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<AiClassification>;
}

#[async_trait]
pub trait RiskModel: Send + Sync {
    async fn score(&self, features: &FeatureVector) -> Result<ModelScore>;
}

/// The set of wired collaborators. A `None` slot means the corresponding
/// signal reports itself unavailable when asked to run.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub url_reputation: Option<Arc<dyn UrlReputationLookup>>,
    pub domain_info: Option<Arc<dyn DomainInfoLookup>>,
    pub ip_reputation: Option<Arc<dyn IpReputationLookup>>,
    pub phone_validation: Option<Arc<dyn PhoneValidation>>,
    pub classifier: Option<Arc<dyn TextClassifier>>,
    pub risk_model: Option<Arc<dyn RiskModel>>,
}

impl Collaborators {
    /// Wire real clients from provider configuration. Sections that are
    /// absent simply leave the slot empty; construction only fails on
    /// genuinely invalid settings.
    pub fn from_config(providers: &ProviderConfig) -> Result<Self> {
        let url_reputation: Option<Arc<dyn UrlReputationLookup>> = match &providers.url_reputation
        {
            Some(settings) => Some(Arc::new(blocklist::UrlBlocklistClient::new(settings)?)),
            None => None,
        };
        let ip_reputation: Option<Arc<dyn IpReputationLookup>> = match &providers.ip_reputation {
            Some(settings) => Some(Arc::new(ip_profile::HostProfileClient::new(settings)?)),
            None => None,
        };
        let phone_validation: Option<Arc<dyn PhoneValidation>> = match &providers.phone_validation
        {
            Some(settings) => Some(Arc::new(phone_lookup::PhoneLookupClient::new(settings)?)),
            None => None,
        };
        let classifier: Option<Arc<dyn TextClassifier>> = match &providers.ai {
            Some(settings) => Some(Arc::new(llm::LlmClassifierClient::new(settings)?)),
            None => None,
        };
        let risk_model: Option<Arc<dyn RiskModel>> = match &providers.ml {
            Some(settings) => Some(Arc::new(scoring::RiskModelClient::new(settings)?)),
            None => None,
        };
        // WHOIS needs no credentials, so domain info is always wired.
        let domain_info: Option<Arc<dyn DomainInfoLookup>> = Some(Arc::new(
            whois::WhoisDomainClient::new(providers.whois.timeout_seconds),
        ));

        Ok(Self {
            url_reputation,
            domain_info,
            ip_reputation,
            phone_validation,
            classifier,
            risk_model,
        })
    }

    /// Fully-wired offline collaborators for demos and tests.
    pub fn mocked() -> Self {
        mock::mocked_collaborators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_schema_parses_partial_payloads() {
        let parsed: AiClassification =
            serde_json::from_str(r#"{"is_scam": true, "confidence": 80}"#).unwrap();
        assert!(parsed.is_scam);
        assert_eq!(parsed.clamped_confidence(), 80);
        assert!(parsed.red_flags.is_empty());
        assert_eq!(parsed.recommendation, AiRecommendation::LikelySafe);
    }

    #[test]
    fn ai_schema_tolerates_unknown_recommendation() {
        let parsed: AiClassification =
            serde_json::from_str(r#"{"is_scam": false, "recommendation": "escalate"}"#).unwrap();
        assert_eq!(parsed.recommendation, AiRecommendation::Unknown);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let parsed: AiClassification =
            serde_json::from_str(r#"{"is_scam": true, "confidence": 400}"#).unwrap();
        assert_eq!(parsed.clamped_confidence(), 100);
        let negative: AiClassification =
            serde_json::from_str(r#"{"is_scam": true, "confidence": -5}"#).unwrap();
        assert_eq!(negative.clamped_confidence(), 0);
    }

    #[test]
    fn model_score_parses_and_clamps() {
        let parsed: ModelScore =
            serde_json::from_str(r#"{"prediction": "scam", "confidence": 1.7}"#).unwrap();
        assert_eq!(parsed.prediction, Prediction::Scam);
        assert!((parsed.clamped_confidence() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_prediction_does_not_fail_parse() {
        let parsed: ModelScore =
            serde_json::from_str(r#"{"prediction": "maybe", "confidence": 0.5}"#).unwrap();
        assert_eq!(parsed.prediction, Prediction::Unknown);
    }

    #[test]
    fn unknown_domain_age_is_not_young() {
        let info = DomainInfo {
            domain: "example.com".to_string(),
            age_days: None,
        };
        assert!(!info.is_younger_than(90));
    }

    #[test]
    fn collaborators_from_empty_config_have_domain_info_only() {
        let collaborators = Collaborators::from_config(&ProviderConfig::default()).unwrap();
        assert!(collaborators.url_reputation.is_none());
        assert!(collaborators.domain_info.is_some());
        assert!(collaborators.classifier.is_none());
    }
}
