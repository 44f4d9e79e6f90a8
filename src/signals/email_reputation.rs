//! Email reputation signal: disposable-provider membership, suspicious
//! local parts, and (enhanced) domain freshness.

use crate::clients::{Collaborators, DomainInfoLookup};
use crate::config::ScoringPolicy;
use crate::domains::{email_domain, email_local_part, is_disposable_domain};
use crate::signals::{SignalKind, SignalReport};
use regex::Regex;
use serde_json::json;
use std::sync::Arc;

/// Generic role aliases that scammers favor for fake "official" senders.
const GENERIC_ALIASES: [&str; 9] = [
    "admin",
    "support",
    "info",
    "billing",
    "security",
    "service",
    "account",
    "noreply",
    "no-reply",
];

pub struct EmailReputationSignal {
    domain_info: Option<Arc<dyn DomainInfoLookup>>,
    digit_run: Regex,
    policy: ScoringPolicy,
}

impl EmailReputationSignal {
    pub fn new(collaborators: &Collaborators, policy: ScoringPolicy) -> Self {
        Self {
            domain_info: collaborators.domain_info.clone(),
            digit_run: Regex::new(r"\d{6,}").unwrap(),
            policy,
        }
    }

    fn local_part_is_suspicious(&self, local: &str) -> bool {
        let lowered = local.to_lowercase();
        self.digit_run.is_match(&lowered) || GENERIC_ALIASES.contains(&lowered.as_str())
    }

    pub async fn run(&self, emails: &[String], include_enhanced: bool) -> SignalReport {
        let mut report = SignalReport::scored(SignalKind::EmailReputation);
        let mut lookup_errors: Vec<String> = Vec::new();

        for email in emails {
            let domain = match email_domain(email) {
                Some(domain) => domain,
                None => continue,
            };

            if is_disposable_domain(&domain) {
                report.add_risk(
                    self.policy.email_disposable_risk,
                    format!("Disposable email domain: {domain}"),
                );
            }

            if let Some(local) = email_local_part(email) {
                if self.local_part_is_suspicious(local) {
                    report.add_risk(
                        self.policy.email_local_part_risk,
                        format!("Suspicious sender alias: {email}"),
                    );
                }
            }

            if include_enhanced {
                if let Some(domain_info) = &self.domain_info {
                    match domain_info.domain_info(&domain).await {
                        Ok(info) => {
                            if info.is_younger_than(self.policy.young_domain_max_age_days) {
                                report.add_risk(
                                    self.policy.email_young_domain_risk,
                                    format!(
                                        "Email domain registered {} days ago: {}",
                                        info.age_days.unwrap_or(0),
                                        info.domain
                                    ),
                                );
                            }
                        }
                        Err(e) => {
                            log::debug!("Domain info lookup failed for {domain}: {e:#}");
                            lookup_errors.push(format!("domain_info: {e}"));
                        }
                    }
                }
            }
        }

        report.detail("emails_checked", json!(emails.len()));
        if !lookup_errors.is_empty() {
            report.detail("lookup_errors", json!(lookup_errors));
        }
        report
    }
}
