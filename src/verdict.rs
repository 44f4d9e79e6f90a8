//! Terminal verdict types and the score-to-classification ladder.

use crate::config::ScoringPolicy;
use crate::signals::SignalReport;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanResult {
    LikelySafe,
    PotentialScam,
    ScamDetected,
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanResult::LikelySafe => "Likely Safe",
            ScanResult::PotentialScam => "Potential Scam",
            ScanResult::ScamDetected => "Scam Detected",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThreatLevel::Low => "Low",
            ThreatLevel::Medium => "Medium",
            ThreatLevel::High => "High",
            ThreatLevel::Critical => "Critical",
        };
        write!(f, "{s}")
    }
}

/// Classify a total score. Pure function of (score, policy): the ladder is
/// evaluated top-down and the first matching tier wins.
pub fn classify(score: u32, policy: &ScoringPolicy) -> (ScanResult, ThreatLevel) {
    if score >= policy.critical_at {
        (ScanResult::ScamDetected, ThreatLevel::Critical)
    } else if score >= policy.high_at {
        (ScanResult::ScamDetected, ThreatLevel::High)
    } else if score >= policy.medium_at {
        (ScanResult::PotentialScam, ThreatLevel::Medium)
    } else if score >= policy.low_at {
        (ScanResult::PotentialScam, ThreatLevel::Low)
    } else {
        (ScanResult::LikelySafe, ThreatLevel::Low)
    }
}

/// Fixed per-tier explanation shown alongside the verdict.
pub fn summary_for(result: ScanResult, level: ThreatLevel) -> String {
    match (result, level) {
        (ScanResult::ScamDetected, ThreatLevel::Critical) => {
            "Multiple strong scam indicators present. Treat this message as hostile.".to_string()
        }
        (ScanResult::ScamDetected, _) => {
            "This message matches known scam patterns with high likelihood.".to_string()
        }
        (ScanResult::PotentialScam, ThreatLevel::Medium) => {
            "Several suspicious indicators found. Independently verify before acting.".to_string()
        }
        (ScanResult::PotentialScam, _) => {
            "Some suspicious indicators found. Proceed with caution.".to_string()
        }
        (ScanResult::LikelySafe, _) => {
            "No significant scam indicators found in this message.".to_string()
        }
    }
}

/// Fixed per-tier recommended actions.
pub fn recommendations_for(result: ScanResult, level: ThreatLevel) -> Vec<String> {
    match (result, level) {
        (ScanResult::ScamDetected, ThreatLevel::Critical) => vec![
            "Do not respond or click any links".to_string(),
            "Block the sender immediately".to_string(),
            "Report to the relevant authorities or your fraud team".to_string(),
            "If you already shared credentials or payment details, act now to secure them"
                .to_string(),
        ],
        (ScanResult::ScamDetected, _) => vec![
            "Do not respond or click any links".to_string(),
            "Block and report the sender".to_string(),
            "Verify any claims through an official channel you look up yourself".to_string(),
        ],
        (ScanResult::PotentialScam, _) => vec![
            "Do not share personal or financial information".to_string(),
            "Verify the sender through an independent channel before acting".to_string(),
            "Avoid clicking embedded links; navigate to sites directly".to_string(),
        ],
        (ScanResult::LikelySafe, _) => vec![
            "No action required, but stay alert for follow-up messages".to_string(),
        ],
    }
}

/// The terminal artifact of one analysis. Constructed once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub result: ScanResult,
    pub threat_level: ThreatLevel,
    /// Bounded to the policy cap (95 by default): never claim certainty.
    pub confidence: u8,
    pub score: u32,
    pub summary: String,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    /// Per-signal reports in declaration order, independent of completion order.
    pub breakdown: Vec<SignalReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_boundaries() {
        let policy = ScoringPolicy::default();
        assert_eq!(
            classify(0, &policy),
            (ScanResult::LikelySafe, ThreatLevel::Low)
        );
        assert_eq!(
            classify(2, &policy),
            (ScanResult::LikelySafe, ThreatLevel::Low)
        );
        assert_eq!(
            classify(3, &policy),
            (ScanResult::PotentialScam, ThreatLevel::Low)
        );
        assert_eq!(
            classify(6, &policy),
            (ScanResult::PotentialScam, ThreatLevel::Medium)
        );
        assert_eq!(
            classify(10, &policy),
            (ScanResult::ScamDetected, ThreatLevel::High)
        );
        assert_eq!(
            classify(15, &policy),
            (ScanResult::ScamDetected, ThreatLevel::Critical)
        );
        assert_eq!(
            classify(100, &policy),
            (ScanResult::ScamDetected, ThreatLevel::Critical)
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let policy = ScoringPolicy::default();
        for score in 0..40 {
            assert_eq!(classify(score, &policy), classify(score, &policy));
        }
    }

    #[test]
    fn classification_is_monotone_in_score() {
        let policy = ScoringPolicy::default();
        let mut last_level = ThreatLevel::Low;
        for score in 0..40 {
            let (_, level) = classify(score, &policy);
            assert!(level >= last_level);
            last_level = level;
        }
    }

    #[test]
    fn every_tier_has_recommendations() {
        for (result, level) in [
            (ScanResult::LikelySafe, ThreatLevel::Low),
            (ScanResult::PotentialScam, ThreatLevel::Low),
            (ScanResult::PotentialScam, ThreatLevel::Medium),
            (ScanResult::ScamDetected, ThreatLevel::High),
            (ScanResult::ScamDetected, ThreatLevel::Critical),
        ] {
            assert!(!recommendations_for(result, level).is_empty());
            assert!(!summary_for(result, level).is_empty());
        }
    }
}
