//! Text-quality heuristics. Scam copy is reliably sloppier than legitimate
//! correspondence: shouted capitals, exclamation stacking, text-speak and
//! recurring misspellings. Purely local, always available.

use crate::config::ScoringPolicy;
use crate::signals::{SignalKind, SignalReport};
use regex::Regex;
use serde_json::json;

const CAPS_RATIO_LIMIT: f64 = 0.3;
const CAPS_PENALTY: u32 = 15;
const EXCLAMATION_LIMIT: usize = 3;
const EXCLAMATION_PENALTY: u32 = 10;
const PATTERN_PENALTY: u32 = 5;
const MISSPELLING_PENALTY: u32 = 5;

const MISSPELLINGS: [&str; 10] = [
    "recieve",
    "seperate",
    "occured",
    "untill",
    "definately",
    "guarentee",
    "beleive",
    "acount",
    "verfiy",
    "paymnet",
];

#[derive(Debug, Clone)]
pub struct QualityAssessment {
    /// 100 is clean copy; penalties subtract down to a floor of 0.
    pub quality_score: u32,
    pub caps_ratio: f64,
    pub exclamation_count: usize,
    pub issues: Vec<String>,
}

impl QualityAssessment {
    pub fn has_poor_quality(&self, policy: &ScoringPolicy) -> bool {
        self.quality_score < policy.poor_quality_threshold
    }

    pub fn into_report(self, policy: &ScoringPolicy) -> SignalReport {
        let mut report = SignalReport::scored(SignalKind::TextQuality);
        let poor = self.has_poor_quality(policy);
        if poor {
            report.add_risk(
                policy.poor_quality_bump,
                format!("Poor text quality (score {}/100)", self.quality_score),
            );
        }
        report.detail("quality_score", json!(self.quality_score));
        report.detail("caps_ratio", json!(self.caps_ratio));
        report.detail("exclamation_count", json!(self.exclamation_count));
        report.detail("issues", json!(self.issues));
        report
    }
}

pub struct TextQualityAnalyzer {
    suspicious_patterns: Vec<(Regex, &'static str)>,
}

impl Default for TextQualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextQualityAnalyzer {
    pub fn new() -> Self {
        Self {
            suspicious_patterns: vec![
                (
                    Regex::new(r"(?i)\b(u|ur|plz|pls|thx|gr8|b4|2day|w8|l8r)\b").unwrap(),
                    "text-speak",
                ),
                (
                    Regex::new(r"([a-zA-Z])\1{2,}").unwrap(),
                    "repeated characters",
                ),
                (
                    Regex::new(r"(?i)[$£€]{2,}|100%\s*(free|guaranteed)").unwrap(),
                    "money emphasis",
                ),
            ],
        }
    }

    pub fn assess(&self, text: &str) -> QualityAssessment {
        let mut quality: i64 = 100;
        let mut issues = Vec::new();

        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        let caps_ratio = if letters.is_empty() {
            0.0
        } else {
            letters.iter().filter(|c| c.is_uppercase()).count() as f64 / letters.len() as f64
        };
        if caps_ratio > CAPS_RATIO_LIMIT {
            quality -= CAPS_PENALTY as i64;
            issues.push(format!("excessive capitalization ({:.0}%)", caps_ratio * 100.0));
        }

        let exclamation_count = text.matches('!').count();
        if exclamation_count > EXCLAMATION_LIMIT {
            quality -= EXCLAMATION_PENALTY as i64;
            issues.push(format!("excessive exclamation marks ({exclamation_count})"));
        }

        for (pattern, name) in &self.suspicious_patterns {
            let hits = pattern.find_iter(text).count();
            if hits > 0 {
                quality -= (PATTERN_PENALTY as i64) * hits as i64;
                issues.push(format!("{name} ({hits})"));
            }
        }

        let lowered = text.to_lowercase();
        for word in MISSPELLINGS {
            if lowered.contains(word) {
                quality -= MISSPELLING_PENALTY as i64;
                issues.push(format!("misspelling: {word}"));
            }
        }

        QualityAssessment {
            quality_score: quality.max(0) as u32,
            caps_ratio,
            exclamation_count,
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> TextQualityAnalyzer {
        TextQualityAnalyzer::new()
    }

    #[test]
    fn clean_text_is_full_quality() {
        let a = analyzer().assess("Hello, your order shipped today. Tracking is attached.");
        assert_eq!(a.quality_score, 100);
        assert!(a.issues.is_empty());
        assert!(!a.has_poor_quality(&ScoringPolicy::default()));
    }

    #[test]
    fn shouted_text_is_penalized() {
        let a = analyzer().assess("YOU MUST SEND THE MONEY TODAY OR ELSE");
        assert!(a.caps_ratio > 0.9);
        assert_eq!(a.quality_score, 85);
    }

    #[test]
    fn exclamation_stacking_is_penalized() {
        let a = analyzer().assess("Win now! Really! Do it! Today! Hurry!");
        assert!(a.exclamation_count > 3);
        assert!(a.quality_score <= 90);
    }

    #[test]
    fn misspellings_are_each_penalized() {
        let a = analyzer().assess("Please recieve the paymnet into your acount");
        assert_eq!(a.quality_score, 85);
        assert_eq!(
            a.issues
                .iter()
                .filter(|i| i.starts_with("misspelling"))
                .count(),
            3
        );
    }

    #[test]
    fn quality_floor_is_zero() {
        let text = "RECIEVE UR FREEEE $$$ NOW!!!! PLZ!!!! GR8 W8 2DAY ACOUNT PAYMNET!!!! \
                    SEPERATE GUARENTEE DEFINATELY UNTILL OCCURED BELEIVE VERFIY!!!!";
        let a = analyzer().assess(text);
        assert_eq!(a.quality_score, 0);
    }

    #[test]
    fn poor_quality_maps_to_flat_bump() {
        let policy = ScoringPolicy::default();
        let report = analyzer()
            .assess("RECIEVE UR FREEEE $$$ NOW!!!! PLZ SEND PAYMNET 2DAY!!!!")
            .into_report(&policy);
        assert!(report.available);
        assert_eq!(report.risk, policy.poor_quality_bump);
        assert!(report.details.contains_key("quality_score"));
    }

    #[test]
    fn good_quality_contributes_zero_risk() {
        let policy = ScoringPolicy::default();
        let report = analyzer()
            .assess("See you at the meeting on Thursday.")
            .into_report(&policy);
        assert_eq!(report.risk, 0);
        assert!(report.findings.is_empty());
    }
}
