//! AI text signal: one LLM classification call behind the fixed schema.
//! The classifier's output is externally produced, so everything it says is
//! treated as a claim to be bounded, never as ground truth.

use crate::clients::{Collaborators, TextClassifier};
use crate::config::ScoringPolicy;
use crate::signals::{SignalKind, SignalReport};
use serde_json::json;
use std::sync::Arc;

pub struct AiTextSignal {
    classifier: Option<Arc<dyn TextClassifier>>,
    policy: ScoringPolicy,
}

impl AiTextSignal {
    pub fn new(collaborators: &Collaborators, policy: ScoringPolicy) -> Self {
        Self {
            classifier: collaborators.classifier.clone(),
            policy,
        }
    }

    pub async fn run(&self, text: &str) -> SignalReport {
        let classifier = match &self.classifier {
            Some(classifier) => classifier,
            None => {
                return SignalReport::unavailable(
                    SignalKind::AiClassifier,
                    "AI classifier not configured",
                )
            }
        };

        let classification = match classifier.classify(text).await {
            Ok(classification) => classification,
            Err(e) => {
                log::warn!("AI classification failed: {e:#}");
                return SignalReport::unavailable(SignalKind::AiClassifier, format!("{e:#}"));
            }
        };

        let mut report = SignalReport::scored(SignalKind::AiClassifier);
        let confidence = classification.clamped_confidence();

        if classification.is_scam {
            let risk = confidence as u32 / self.policy.ai_confidence_divisor;
            report.add_risk(
                risk,
                format!(
                    "AI classifier flagged text as likely scam ({}, {confidence}% confidence)",
                    if classification.scam_type.is_empty() {
                        "unspecified type"
                    } else {
                        classification.scam_type.as_str()
                    }
                ),
            );
            report.claim_confidence(confidence);
            for flag in &classification.red_flags {
                report.findings.push(format!("AI red flag: {flag}"));
            }
        } else {
            log::debug!("AI classifier found no scam ({confidence}% confidence)");
        }

        report.detail("is_scam", json!(classification.is_scam));
        report.detail("confidence", json!(confidence));
        report.detail("risk_level", json!(classification.risk_level));
        report.detail("scam_type", json!(classification.scam_type));
        report.detail("recommendation", json!(classification.recommendation));
        report.detail("indicator_count", json!(classification.indicators.len()));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::{FailingTextClassifier, MockTextClassifier};
    use crate::clients::{AiClassification, AiRecommendation};

    fn scam_classification(confidence: i64) -> AiClassification {
        AiClassification {
            is_scam: true,
            confidence,
            risk_level: "high".to_string(),
            scam_type: "phishing".to_string(),
            indicators: Vec::new(),
            red_flags: vec!["Asks for credentials".to_string()],
            recommendation: AiRecommendation::Block,
        }
    }

    fn with_classifier(classifier: Arc<dyn TextClassifier>) -> AiTextSignal {
        let collaborators = Collaborators {
            classifier: Some(classifier),
            ..Default::default()
        };
        AiTextSignal::new(&collaborators, ScoringPolicy::default())
    }

    #[tokio::test]
    async fn full_confidence_scam_contributes_five() {
        let signal = with_classifier(Arc::new(MockTextClassifier::answering(
            scam_classification(100),
        )));
        let report = signal.run("whatever").await;
        assert!(report.available);
        assert_eq!(report.risk, 5); // floor(100 / 20)
        assert_eq!(report.confidence_claim, Some(100));
    }

    #[tokio::test]
    async fn partial_confidence_uses_integer_division() {
        let signal = with_classifier(Arc::new(MockTextClassifier::answering(
            scam_classification(79),
        )));
        let report = signal.run("whatever").await;
        assert_eq!(report.risk, 3); // floor(79 / 20)
    }

    #[tokio::test]
    async fn non_scam_verdict_contributes_zero_without_claim() {
        let signal = with_classifier(Arc::new(MockTextClassifier::answering(AiClassification {
            is_scam: false,
            confidence: 90,
            ..Default::default()
        })));
        let report = signal.run("whatever").await;
        assert!(report.available);
        assert_eq!(report.risk, 0);
        assert!(report.confidence_claim.is_none());
    }

    #[tokio::test]
    async fn classifier_error_reports_unavailable() {
        let signal = with_classifier(Arc::new(FailingTextClassifier));
        let report = signal.run("whatever").await;
        assert!(!report.available);
        assert_eq!(report.risk, 0);
        assert!(report.confidence_claim.is_none());
    }

    #[tokio::test]
    async fn missing_classifier_reports_unavailable() {
        let signal = AiTextSignal::new(&Collaborators::default(), ScoringPolicy::default());
        let report = signal.run("whatever").await;
        assert!(!report.available);
    }

    #[tokio::test]
    async fn red_flags_surface_as_findings() {
        let signal = with_classifier(Arc::new(MockTextClassifier::answering(
            scam_classification(60),
        )));
        let report = signal.run("whatever").await;
        assert!(report
            .findings
            .iter()
            .any(|f| f.contains("Asks for credentials")));
    }
}
