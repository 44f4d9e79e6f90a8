//! Offline collaborator implementations. These back the test suite and the
//! CLI's `--mock` mode; none of them touch the network.

use crate::clients::{
    AiClassification, AiRecommendation, Collaborators, DomainInfo, DomainInfoLookup,
    FeatureVector, HostProfile, IpReputationLookup, ModelScore, PhoneInfo, PhoneValidation,
    Prediction, RiskModel, TextClassifier, UrlReputation, UrlReputationLookup,
};
use crate::domains::{host_of, registrable_domain};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MockUrlReputation {
    pub malicious_hosts: HashSet<String>,
}

impl MockUrlReputation {
    pub fn flagging<I: IntoIterator<Item = S>, S: Into<String>>(hosts: I) -> Self {
        Self {
            malicious_hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl UrlReputationLookup for MockUrlReputation {
    async fn check_url(&self, url: &str) -> Result<UrlReputation> {
        let host = host_of(url).unwrap_or_default();
        let is_malicious = self.malicious_hosts.contains(&host);
        Ok(UrlReputation {
            is_malicious,
            threat_types: if is_malicious {
                vec!["SOCIAL_ENGINEERING".to_string()]
            } else {
                Vec::new()
            },
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockDomainInfo {
    pub ages: HashMap<String, u32>,
    pub default_age: Option<u32>,
}

impl MockDomainInfo {
    pub fn with_age(mut self, domain: &str, age_days: u32) -> Self {
        self.ages.insert(domain.to_string(), age_days);
        self
    }

    pub fn defaulting_to(mut self, age_days: u32) -> Self {
        self.default_age = Some(age_days);
        self
    }
}

#[async_trait]
impl DomainInfoLookup for MockDomainInfo {
    async fn domain_info(&self, domain: &str) -> Result<DomainInfo> {
        let root = registrable_domain(&domain.to_lowercase());
        Ok(DomainInfo {
            age_days: self.ages.get(&root).copied().or(self.default_age),
            domain: root,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockIpProfile {
    pub proxy_hosts: HashSet<String>,
    pub hosting_hosts: HashSet<String>,
}

#[async_trait]
impl IpReputationLookup for MockIpProfile {
    async fn host_profile(&self, host: &str) -> Result<HostProfile> {
        Ok(HostProfile {
            is_proxy: self.proxy_hosts.contains(host),
            is_hosting: self.hosting_hosts.contains(host),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockPhoneValidation {
    pub invalid_numbers: HashSet<String>,
}

impl MockPhoneValidation {
    pub fn rejecting<I: IntoIterator<Item = S>, S: Into<String>>(numbers: I) -> Self {
        Self {
            invalid_numbers: numbers.into_iter().map(|n| digits_of(&n.into())).collect(),
        }
    }
}

fn digits_of(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[async_trait]
impl PhoneValidation for MockPhoneValidation {
    async fn validate(&self, number: &str) -> Result<PhoneInfo> {
        let is_valid = !self.invalid_numbers.contains(&digits_of(number));
        Ok(PhoneInfo {
            is_valid,
            carrier: is_valid.then(|| "Mock Carrier".to_string()),
            line_type: is_valid.then(|| "mobile".to_string()),
        })
    }
}

/// Returns a canned classification, or derives one from obvious keywords
/// when none is pinned (good enough for offline demos).
#[derive(Debug, Clone, Default)]
pub struct MockTextClassifier {
    pub canned: Option<AiClassification>,
}

impl MockTextClassifier {
    pub fn answering(classification: AiClassification) -> Self {
        Self {
            canned: Some(classification),
        }
    }
}

#[async_trait]
impl TextClassifier for MockTextClassifier {
    async fn classify(&self, text: &str) -> Result<AiClassification> {
        if let Some(canned) = &self.canned {
            return Ok(canned.clone());
        }

        let lowered = text.to_lowercase();
        let hits = ["urgent", "verify", "password", "winner", "wire transfer"]
            .iter()
            .filter(|k| lowered.contains(*k))
            .count();
        if hits >= 2 {
            Ok(AiClassification {
                is_scam: true,
                confidence: 70 + 10 * hits.min(3) as i64,
                risk_level: "high".to_string(),
                scam_type: "phishing".to_string(),
                indicators: Vec::new(),
                red_flags: vec!["Pressure language combined with credential request".to_string()],
                recommendation: AiRecommendation::Block,
            })
        } else {
            Ok(AiClassification {
                is_scam: false,
                confidence: 30,
                risk_level: "low".to_string(),
                scam_type: "none".to_string(),
                indicators: Vec::new(),
                red_flags: Vec::new(),
                recommendation: AiRecommendation::LikelySafe,
            })
        }
    }
}

/// A classifier that always errors, for exercising unavailability paths.
#[derive(Debug, Clone, Default)]
pub struct FailingTextClassifier;

#[async_trait]
impl TextClassifier for FailingTextClassifier {
    async fn classify(&self, _text: &str) -> Result<AiClassification> {
        Err(anyhow!("classifier credentials missing"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockRiskModel {
    pub canned: Option<ModelScore>,
}

impl MockRiskModel {
    pub fn answering(score: ModelScore) -> Self {
        Self {
            canned: Some(score),
        }
    }
}

#[async_trait]
impl RiskModel for MockRiskModel {
    async fn score(&self, features: &FeatureVector) -> Result<ModelScore> {
        if let Some(canned) = &self.canned {
            return Ok(canned.clone());
        }
        // Crude linear stand-in for the remote model.
        if features.keyword_score >= 5 || features.quality_score < 50 {
            Ok(ModelScore {
                prediction: Prediction::Scam,
                confidence: 0.8,
            })
        } else {
            Ok(ModelScore {
                prediction: Prediction::NotScam,
                confidence: 0.7,
            })
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FailingRiskModel;

#[async_trait]
impl RiskModel for FailingRiskModel {
    async fn score(&self, _features: &FeatureVector) -> Result<ModelScore> {
        Err(anyhow!("scoring endpoint unreachable"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FailingPhoneValidation;

#[async_trait]
impl PhoneValidation for FailingPhoneValidation {
    async fn validate(&self, _number: &str) -> Result<PhoneInfo> {
        Err(anyhow!("phone provider unreachable"))
    }
}

/// Fully-wired offline collaborators with a few known-bad fixtures.
pub fn mocked_collaborators() -> Collaborators {
    Collaborators {
        url_reputation: Some(Arc::new(MockUrlReputation::flagging([
            "malware.bad-site.example",
            "phish.example",
        ]))),
        domain_info: Some(Arc::new(
            MockDomainInfo::default()
                .with_age("suspicious.tk", 30)
                .with_age("bad-site.example", 12)
                .defaulting_to(3650),
        )),
        ip_reputation: Some(Arc::new(MockIpProfile {
            proxy_hosts: HashSet::from(["phish.example".to_string()]),
            hosting_hosts: HashSet::new(),
        })),
        phone_validation: Some(Arc::new(MockPhoneValidation::rejecting(["+1 555 000 0000"]))),
        classifier: Some(Arc::new(MockTextClassifier::default())),
        risk_model: Some(Arc::new(MockRiskModel::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_url_reputation_flags_listed_hosts() {
        let mock = MockUrlReputation::flagging(["phish.example"]);
        assert!(mock
            .check_url("https://phish.example/login")
            .await
            .unwrap()
            .is_malicious);
        assert!(!mock
            .check_url("https://example.com")
            .await
            .unwrap()
            .is_malicious);
    }

    #[tokio::test]
    async fn mock_domain_info_uses_registrable_domain() {
        let mock = MockDomainInfo::default().with_age("bad-site.example", 12);
        let info = mock.domain_info("malware.bad-site.example").await.unwrap();
        assert_eq!(info.age_days, Some(12));
    }

    #[tokio::test]
    async fn mock_phone_validation_normalizes_digits() {
        let mock = MockPhoneValidation::rejecting(["+1 555 000 0000"]);
        assert!(!mock.validate("15550000000").await.unwrap().is_valid);
        assert!(mock.validate("+1 555 123 4567").await.unwrap().is_valid);
    }

    #[tokio::test]
    async fn heuristic_classifier_needs_two_keywords() {
        let mock = MockTextClassifier::default();
        assert!(
            mock.classify("urgent: verify your password")
                .await
                .unwrap()
                .is_scam
        );
        assert!(!mock.classify("see you at lunch").await.unwrap().is_scam);
    }
}
