//! Categorized keyword scan. Purely local, always available, and therefore
//! the floor every verdict stands on when external collaborators are down.

use crate::config::CategoryWeights;
use crate::signals::{SignalKind, SignalReport};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordCategory {
    Urgency,
    Financial,
    Authentication,
    Action,
    Emotional,
    Authority,
}

impl KeywordCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordCategory::Urgency => "urgency",
            KeywordCategory::Financial => "financial",
            KeywordCategory::Authentication => "authentication",
            KeywordCategory::Action => "action",
            KeywordCategory::Emotional => "emotional",
            KeywordCategory::Authority => "authority",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            KeywordCategory::Urgency => "Urgency pressure language",
            KeywordCategory::Financial => "Financial lure language",
            KeywordCategory::Authentication => "Credential-theft language",
            KeywordCategory::Action => "Action-push language",
            KeywordCategory::Emotional => "Emotional manipulation language",
            KeywordCategory::Authority => "Authority impersonation language",
        }
    }
}

/// Category keyword lists. Substring matching is deliberate: scammers pad
/// keywords into longer phrases, and false positives are damped by the
/// threshold ladder rather than by stricter matching here.
const KEYWORD_TABLE: [(KeywordCategory, &[&str]); 6] = [
    (
        KeywordCategory::Urgency,
        &[
            "urgent",
            "immediately",
            "act now",
            "expires",
            "deadline",
            "right away",
            "asap",
            "final notice",
            "last chance",
            "within 24 hours",
        ],
    ),
    (
        KeywordCategory::Financial,
        &[
            "bank transfer",
            "wire transfer",
            "payment",
            "bitcoin",
            "cryptocurrency",
            "gift card",
            "refund",
            "invoice",
            "western union",
            "processing fee",
        ],
    ),
    (
        KeywordCategory::Authentication,
        &[
            "verify",
            "password",
            "login",
            "sign in",
            "credentials",
            "authenticate",
            "security alert",
            "suspended",
            "locked",
            "confirm your identity",
        ],
    ),
    (
        KeywordCategory::Action,
        &[
            "click here",
            "click the link",
            "click below",
            "open the attachment",
            "call this number",
            "reply now",
            "download",
        ],
    ),
    (
        KeywordCategory::Emotional,
        &[
            "congratulations",
            "winner",
            "you have won",
            "prize",
            "lottery",
            "inheritance",
            "dear friend",
            "help me",
            "emergency",
        ],
    ),
    (
        KeywordCategory::Authority,
        &[
            "irs",
            "government",
            "police",
            "fbi",
            "microsoft support",
            "official notice",
            "court",
            "legal action",
            "tax office",
        ],
    ),
];

#[derive(Debug, Clone)]
pub struct LexicalScan {
    pub score: u32,
    /// Matched keywords per category, in declaration order.
    pub matches: Vec<(KeywordCategory, Vec<&'static str>)>,
}

impl LexicalScan {
    pub fn into_report(self) -> SignalReport {
        let mut report = SignalReport::scored(SignalKind::Lexical);
        report.risk = self.score;
        for (category, matched) in &self.matches {
            report.findings.push(format!(
                "{} ({} match{})",
                category.label(),
                matched.len(),
                if matched.len() == 1 { "" } else { "es" }
            ));
            report.detail(
                category.as_str(),
                Value::Array(matched.iter().map(|k| json!(k)).collect()),
            );
        }
        report
    }
}

#[derive(Debug, Clone)]
pub struct KeywordScanner {
    weights: CategoryWeights,
}

impl KeywordScanner {
    pub fn new(weights: CategoryWeights) -> Self {
        Self { weights }
    }

    fn weight(&self, category: KeywordCategory) -> u32 {
        match category {
            KeywordCategory::Urgency => self.weights.urgency,
            KeywordCategory::Financial => self.weights.financial,
            KeywordCategory::Authentication => self.weights.authentication,
            KeywordCategory::Action => self.weights.action,
            KeywordCategory::Emotional => self.weights.emotional,
            KeywordCategory::Authority => self.weights.authority,
        }
    }

    pub fn scan(&self, text: &str) -> LexicalScan {
        let lowered = text.to_lowercase();
        let mut score = 0;
        let mut matches = Vec::new();

        for (category, keywords) in KEYWORD_TABLE {
            let matched: Vec<&'static str> = keywords
                .iter()
                .copied()
                .filter(|k| lowered.contains(k))
                .collect();
            if !matched.is_empty() {
                score += matched.len() as u32 * self.weight(category);
                log::debug!(
                    "Lexical category {} matched {:?}",
                    category.as_str(),
                    matched
                );
                matches.push((category, matched));
            }
        }

        LexicalScan { score, matches }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> KeywordScanner {
        KeywordScanner::new(CategoryWeights::default())
    }

    #[test]
    fn clean_text_scores_zero() {
        let scan = scanner().scan("Lunch at noon tomorrow? The weather looks great.");
        assert_eq!(scan.score, 0);
        assert!(scan.matches.is_empty());
    }

    #[test]
    fn reference_phishing_text_scores_seven() {
        // urgent (2) + verify (3) + click here (2)
        let scan = scanner().scan("URGENT: verify your account now, click here http://bit.ly/x9z");
        assert_eq!(scan.score, 7);
        assert_eq!(scan.matches.len(), 3);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let a = scanner().scan("VERIFY YOUR PASSWORD");
        let b = scanner().scan("verify your password");
        assert_eq!(a.score, b.score);
        assert_eq!(a.score, 6); // verify (3) + password (3)
    }

    #[test]
    fn repeated_category_matches_accumulate() {
        let scan = scanner().scan("You are a winner! Congratulations on the prize!");
        // winner + congratulations + prize, emotional weight 2
        assert_eq!(scan.score, 6);
    }

    #[test]
    fn report_carries_matched_keywords_per_category() {
        let report = scanner().scan("urgent wire transfer").into_report();
        assert!(report.available);
        assert_eq!(report.risk, 4);
        assert!(report.details.contains_key("urgency"));
        assert!(report.details.contains_key("financial"));
        assert_eq!(report.findings.len(), 2);
    }

    #[test]
    fn adding_a_keyword_never_decreases_score() {
        let base = scanner().scan("verify your account").score;
        let more = scanner().scan("verify your account urgent").score;
        assert!(more > base);
    }
}
