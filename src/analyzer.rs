//! The aggregator: fans out to every enabled, entity-gated signal
//! concurrently, joins once, and reduces the results into a single
//! explainable verdict. Collaborator outages degrade the verdict's
//! completeness, never the request.

use crate::clients::{Collaborators, FeatureVector};
use crate::config::{EngineConfig, ScanOptions};
use crate::entities::EntityExtractor;
use crate::signals::ai_classifier::AiTextSignal;
use crate::signals::email_reputation::EmailReputationSignal;
use crate::signals::lexical::KeywordScanner;
use crate::signals::ml_classifier::MlClassifierSignal;
use crate::signals::phone_validation::PhoneValidationSignal;
use crate::signals::quality::TextQualityAnalyzer;
use crate::signals::url_reputation::UrlReputationSignal;
use crate::signals::{SignalKind, SignalReport};
use crate::verdict::{classify, recommendations_for, summary_for, Verdict};
use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Input ceiling; real validation belongs to the HTTP layer in front of us.
const MAX_TEXT_LEN: usize = 10_000;

pub struct Analyzer {
    config: EngineConfig,
    extractor: EntityExtractor,
    lexical: KeywordScanner,
    quality: TextQualityAnalyzer,
    url_signal: UrlReputationSignal,
    email_signal: EmailReputationSignal,
    phone_signal: PhoneValidationSignal,
    ai_signal: AiTextSignal,
    ml_signal: MlClassifierSignal,
}

impl Analyzer {
    /// Build an analyzer with collaborators wired from the provider config.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let collaborators = Collaborators::from_config(&config.providers)?;
        Self::with_collaborators(config, collaborators)
    }

    /// Build an analyzer around explicitly injected collaborators (tests,
    /// offline mode). Invalid policy settings fail here, never mid-analysis.
    pub fn with_collaborators(config: EngineConfig, collaborators: Collaborators) -> Result<Self> {
        config.policy.validate()?;
        let policy = config.policy.clone();
        Ok(Self {
            extractor: EntityExtractor::new(),
            lexical: KeywordScanner::new(policy.keyword_weights.clone()),
            quality: TextQualityAnalyzer::new(),
            url_signal: UrlReputationSignal::new(&collaborators, policy.clone()),
            email_signal: EmailReputationSignal::new(&collaborators, policy.clone()),
            phone_signal: PhoneValidationSignal::new(&collaborators, policy.clone()),
            ai_signal: AiTextSignal::new(&collaborators, policy.clone()),
            ml_signal: MlClassifierSignal::new(&collaborators, policy),
            config,
        })
    }

    /// Analyze one text. Always returns a complete verdict for well-formed
    /// input; signal failures surface in the breakdown, not as errors.
    pub async fn analyze(&self, text: &str, options: &ScanOptions) -> Verdict {
        let text = match text.char_indices().nth(MAX_TEXT_LEN) {
            Some((idx, _)) => {
                log::warn!(
                    "Input of {} chars exceeds the {MAX_TEXT_LEN}-char ceiling, truncating",
                    text.chars().count()
                );
                &text[..idx]
            }
            None => text,
        };

        // The local signals are pure and cheap; they run inline and also
        // feed the ML feature vector.
        let lexical_scan = self.lexical.scan(text);
        let quality_assessment = self.quality.assess(text);
        let entities = self.extractor.extract(text).bounded();

        log::debug!(
            "Extracted {} urls, {} emails, {} phones; lexical score {}",
            entities.urls.len(),
            entities.emails.len(),
            entities.phones.len(),
            lexical_scan.score
        );

        let features = FeatureVector {
            text_length: text.chars().count(),
            keyword_score: lexical_scan.score,
            quality_score: quality_assessment.quality_score,
            url_count: entities.urls.len(),
            email_count: entities.emails.len(),
            phone_count: entities.phones.len(),
            caps_ratio: quality_assessment.caps_ratio,
            exclamation_count: quality_assessment.exclamation_count,
        };

        // Fan out once, join once. A signal that is disabled or has no
        // candidate entities is skipped entirely, not run with empty input.
        let budgets = &self.config.budgets;
        let (url_report, email_report, phone_report, ai_report, ml_report) = tokio::join!(
            async {
                if !options.analyze_urls || entities.urls.is_empty() {
                    return None;
                }
                Some(
                    bounded(
                        SignalKind::UrlReputation,
                        Duration::from_millis(budgets.url_ms),
                        self.url_signal
                            .run(&entities.urls, options.include_enhanced),
                    )
                    .await,
                )
            },
            async {
                if !options.analyze_emails || entities.emails.is_empty() {
                    return None;
                }
                Some(
                    bounded(
                        SignalKind::EmailReputation,
                        Duration::from_millis(budgets.email_ms),
                        self.email_signal
                            .run(&entities.emails, options.include_enhanced),
                    )
                    .await,
                )
            },
            async {
                if !options.validate_phones || entities.phones.is_empty() {
                    return None;
                }
                Some(
                    bounded(
                        SignalKind::PhoneValidation,
                        Duration::from_millis(budgets.phone_ms),
                        self.phone_signal.run(&entities.phones),
                    )
                    .await,
                )
            },
            async {
                if !options.use_ai {
                    return None;
                }
                Some(
                    bounded(
                        SignalKind::AiClassifier,
                        Duration::from_millis(budgets.ai_ms),
                        self.ai_signal.run(text),
                    )
                    .await,
                )
            },
            async {
                if !options.use_ml {
                    return None;
                }
                Some(
                    bounded(
                        SignalKind::MlClassifier,
                        Duration::from_millis(budgets.ml_ms),
                        self.ml_signal.run(&features),
                    )
                    .await,
                )
            },
        );

        // Breakdown in declaration order, independent of completion order.
        let policy = &self.config.policy;
        let mut breakdown: Vec<SignalReport> = Vec::with_capacity(7);
        breakdown.push(lexical_scan.into_report());
        breakdown.push(quality_assessment.into_report(policy));
        breakdown.extend(url_report);
        breakdown.extend(email_report);
        breakdown.extend(phone_report);
        breakdown.extend(ai_report);
        breakdown.extend(ml_report);

        let score: u32 = breakdown.iter().map(|r| r.risk).sum();
        let confidence = breakdown
            .iter()
            .filter(|r| r.available)
            .filter_map(|r| r.confidence_claim)
            .fold(policy.confidence_floor, u8::max)
            .min(policy.confidence_cap);

        let (result, threat_level) = classify(score, policy);
        let risk_factors: Vec<String> = breakdown
            .iter()
            .flat_map(|r| r.findings.iter().cloned())
            .collect();

        if !options.debug {
            for report in &mut breakdown {
                report.details.clear();
            }
        }

        log::info!(
            "Analysis complete: score={score} result={result} level={threat_level} \
             confidence={confidence} ({} signals ran)",
            breakdown.len()
        );

        Verdict {
            result,
            threat_level,
            confidence,
            score,
            summary: summary_for(result, threat_level),
            risk_factors,
            recommendations: recommendations_for(result, threat_level),
            breakdown,
        }
    }
}

async fn bounded<F>(kind: SignalKind, budget: Duration, fut: F) -> SignalReport
where
    F: Future<Output = SignalReport>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(report) => report,
        Err(_) => SignalReport::unavailable(
            kind,
            format!("deadline of {}ms exceeded", budget.as_millis()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_analyzer() -> Analyzer {
        Analyzer::with_collaborators(EngineConfig::default(), Collaborators::default()).unwrap()
    }

    #[tokio::test]
    async fn local_only_scan_yields_complete_verdict() {
        let verdict = local_analyzer()
            .analyze("Nice to hear from you!", &ScanOptions::local_only())
            .await;
        assert_eq!(verdict.score, 0);
        assert_eq!(verdict.confidence, 60);
        assert_eq!(verdict.breakdown.len(), 2);
        assert!(!verdict.recommendations.is_empty());
    }

    #[tokio::test]
    async fn breakdown_follows_declaration_order() {
        let analyzer =
            Analyzer::with_collaborators(EngineConfig::default(), Collaborators::mocked())
                .unwrap();
        let verdict = analyzer
            .analyze(
                "urgent: verify at http://bit.ly/x, mail admin@mailinator.com or call 555-123-4567",
                &ScanOptions::default(),
            )
            .await;
        let kinds: Vec<SignalKind> = verdict.breakdown.iter().map(|r| r.signal).collect();
        assert_eq!(
            kinds,
            vec![
                SignalKind::Lexical,
                SignalKind::TextQuality,
                SignalKind::UrlReputation,
                SignalKind::EmailReputation,
                SignalKind::PhoneValidation,
                SignalKind::AiClassifier,
                SignalKind::MlClassifier,
            ]
        );
    }

    #[tokio::test]
    async fn oversized_input_is_truncated_not_rejected() {
        let huge = "a".repeat(20_000);
        let verdict = local_analyzer()
            .analyze(&huge, &ScanOptions::local_only())
            .await;
        assert_eq!(verdict.score, 0);
    }

    #[test]
    fn invalid_policy_fails_at_construction() {
        let mut config = EngineConfig::default();
        config.policy.critical_at = 1;
        assert!(Analyzer::with_collaborators(config, Collaborators::default()).is_err());
    }
}
