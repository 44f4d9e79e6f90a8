//! ML classifier signal: remote scoring of the fixed feature vector.

use crate::clients::{Collaborators, FeatureVector, Prediction, RiskModel};
use crate::config::ScoringPolicy;
use crate::signals::{SignalKind, SignalReport};
use serde_json::json;
use std::sync::Arc;

pub struct MlClassifierSignal {
    model: Option<Arc<dyn RiskModel>>,
    policy: ScoringPolicy,
}

impl MlClassifierSignal {
    pub fn new(collaborators: &Collaborators, policy: ScoringPolicy) -> Self {
        Self {
            model: collaborators.risk_model.clone(),
            policy,
        }
    }

    pub async fn run(&self, features: &FeatureVector) -> SignalReport {
        let model = match &self.model {
            Some(model) => model,
            None => {
                return SignalReport::unavailable(
                    SignalKind::MlClassifier,
                    "ML scoring not configured",
                )
            }
        };

        let score = match model.score(features).await {
            Ok(score) => score,
            Err(e) => {
                log::warn!("ML scoring failed: {e:#}");
                return SignalReport::unavailable(SignalKind::MlClassifier, format!("{e:#}"));
            }
        };

        let mut report = SignalReport::scored(SignalKind::MlClassifier);
        let confidence = score.clamped_confidence();

        if score.prediction == Prediction::Scam {
            let risk = (confidence * self.policy.ml_risk_multiplier).floor() as u32;
            report.add_risk(
                risk,
                format!("Model scored text as likely scam (p={confidence:.2})"),
            );
            report.claim_confidence((confidence * 100.0).round() as u8);
        } else {
            log::debug!("ML model prediction: {:?} (p={confidence:.2})", score.prediction);
        }

        report.detail("prediction", json!(score.prediction));
        report.detail("confidence", json!(confidence));
        report
    }
}
