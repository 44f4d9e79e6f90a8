//! Independent evidence-gathering signals. Each signal returns a bounded
//! risk contribution or reports itself unavailable; unavailability is never
//! evidence of safety or of risk.

pub mod ai_classifier;
pub mod email_reputation;
pub mod lexical;
pub mod ml_classifier;
pub mod phone_validation;
pub mod quality;
pub mod url_reputation;

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Lexical,
    TextQuality,
    UrlReputation,
    EmailReputation,
    PhoneValidation,
    AiClassifier,
    MlClassifier,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Lexical => "lexical",
            SignalKind::TextQuality => "text_quality",
            SignalKind::UrlReputation => "url_reputation",
            SignalKind::EmailReputation => "email_reputation",
            SignalKind::PhoneValidation => "phone_validation",
            SignalKind::AiClassifier => "ai_classifier",
            SignalKind::MlClassifier => "ml_classifier",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One signal's result. The constructors enforce the availability contract:
/// an unavailable signal carries zero risk and no confidence claim.
#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub signal: SignalKind,
    pub available: bool,
    pub risk: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_claim: Option<u8>,
    pub findings: Vec<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SignalReport {
    pub fn scored(signal: SignalKind) -> Self {
        Self {
            signal,
            available: true,
            risk: 0,
            confidence_claim: None,
            findings: Vec::new(),
            details: Map::new(),
            error: None,
        }
    }

    pub fn unavailable(signal: SignalKind, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log::debug!("Signal {signal} unavailable: {reason}");
        Self {
            signal,
            available: false,
            risk: 0,
            confidence_claim: None,
            findings: Vec::new(),
            details: Map::new(),
            error: Some(reason),
        }
    }

    pub fn add_risk(&mut self, amount: u32, finding: impl Into<String>) {
        self.risk += amount;
        self.findings.push(finding.into());
    }

    pub fn claim_confidence(&mut self, confidence: u8) {
        self.confidence_claim = Some(confidence.min(100));
    }

    pub fn detail(&mut self, key: &str, value: Value) {
        self.details.insert(key.to_string(), value);
    }
}
