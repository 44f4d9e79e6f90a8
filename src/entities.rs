//! Candidate entity extraction: URLs, email addresses and phone numbers
//! pulled out of raw text with three independent regex scans. No network
//! access and no failure mode; unmatched patterns yield empty lists.

use regex::Regex;

/// External lookups are bounded per request to contain fan-out and cost.
pub const MAX_URLS: usize = 3;
pub const MAX_EMAILS: usize = 2;
pub const MAX_PHONES: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedEntities {
    pub urls: Vec<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.emails.is_empty() && self.phones.is_empty()
    }

    /// Truncate to the per-request lookup caps, preserving first-seen order.
    pub fn bounded(mut self) -> Self {
        self.urls.truncate(MAX_URLS);
        self.emails.truncate(MAX_EMAILS);
        self.phones.truncate(MAX_PHONES);
        self
    }
}

pub struct EntityExtractor {
    url_regex: Regex,
    email_regex: Regex,
    phone_regex: Regex,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor {
    pub fn new() -> Self {
        Self {
            url_regex: Regex::new(r#"(?i)\bhttps?://[^\s<>"')\]]+"#).unwrap(),
            email_regex: Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").unwrap(),
            phone_regex: Regex::new(r"\+?\d{0,3}[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}")
                .unwrap(),
        }
    }

    pub fn extract(&self, text: &str) -> ExtractedEntities {
        ExtractedEntities {
            urls: self.extract_urls(text),
            emails: self.extract_emails(text),
            phones: self.extract_phones(text),
        }
    }

    fn extract_urls(&self, text: &str) -> Vec<String> {
        let mut urls = Vec::new();
        for m in self.url_regex.find_iter(text) {
            // Trailing sentence punctuation is part of the prose, not the URL.
            let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
            if !url.is_empty() && !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }
        urls
    }

    fn extract_emails(&self, text: &str) -> Vec<String> {
        let mut emails = Vec::new();
        for m in self.email_regex.find_iter(text) {
            let email = m.as_str().to_lowercase();
            if !emails.contains(&email) {
                emails.push(email);
            }
        }
        emails
    }

    fn extract_phones(&self, text: &str) -> Vec<String> {
        let mut phones = Vec::new();
        for m in self.phone_regex.find_iter(text) {
            let candidate = m.as_str().trim();
            let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
            // Shorter digit runs are dates, amounts or order numbers.
            if !(7..=15).contains(&digits) {
                continue;
            }
            let normalized = candidate.to_string();
            if !phones.contains(&normalized) {
                phones.push(normalized);
            }
        }
        phones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_urls_without_trailing_punctuation() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Click https://example.com/login. Then http://bit.ly/x9z, thanks");
        assert_eq!(
            entities.urls,
            vec!["https://example.com/login", "http://bit.ly/x9z"]
        );
    }

    #[test]
    fn extracts_and_lowercases_emails() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Contact Admin@Example.COM or support@help.org now");
        assert_eq!(entities.emails, vec!["admin@example.com", "support@help.org"]);
    }

    #[test]
    fn extracts_phone_numbers_with_separators() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Call +1 (555) 123-4567 or 555-987-6543 today");
        assert_eq!(entities.phones.len(), 2);
        assert!(entities.phones[0].contains("555"));
    }

    #[test]
    fn short_digit_runs_are_not_phones() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Order 12345 ships on 2024-01-02 for $19.99");
        assert!(entities.phones.is_empty());
    }

    #[test]
    fn malformed_input_yields_empty_lists() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("@@@ http:// ...---... ()");
        assert!(entities.is_empty());
    }

    #[test]
    fn deduplicates_preserving_first_seen_order() {
        let extractor = EntityExtractor::new();
        let entities =
            extractor.extract("https://a.com https://b.com https://a.com a@b.com A@B.COM");
        assert_eq!(entities.urls, vec!["https://a.com", "https://b.com"]);
        assert_eq!(entities.emails, vec!["a@b.com"]);
    }

    #[test]
    fn bounded_truncates_to_lookup_caps() {
        let entities = ExtractedEntities {
            urls: (0..5).map(|i| format!("https://u{i}.com")).collect(),
            emails: (0..4).map(|i| format!("a{i}@x.com")).collect(),
            phones: (0..3).map(|i| format!("555-000-000{i}")).collect(),
        }
        .bounded();
        assert_eq!(entities.urls.len(), MAX_URLS);
        assert_eq!(entities.emails.len(), MAX_EMAILS);
        assert_eq!(entities.phones.len(), MAX_PHONES);
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = EntityExtractor::new();
        let text = "Call 555-123-4567, visit http://bit.ly/x and mail a@b.co";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }
}
