//! URL reputation signal. Combines local structural checks (scheme,
//! shortener host) with blocklist, domain-age and hosting-profile lookups.
//! Each URL's contribution is capped below the Critical threshold so a
//! single link can never force the top tier by itself.

use crate::clients::Collaborators;
use crate::clients::{DomainInfoLookup, IpReputationLookup, UrlReputationLookup};
use crate::config::ScoringPolicy;
use crate::domains::{host_of, is_shortener_host};
use crate::signals::{SignalKind, SignalReport};
use serde_json::json;
use std::sync::Arc;
use url::Url;

pub struct UrlReputationSignal {
    blocklist: Option<Arc<dyn UrlReputationLookup>>,
    domain_info: Option<Arc<dyn DomainInfoLookup>>,
    ip_profile: Option<Arc<dyn IpReputationLookup>>,
    policy: ScoringPolicy,
}

impl UrlReputationSignal {
    pub fn new(collaborators: &Collaborators, policy: ScoringPolicy) -> Self {
        Self {
            blocklist: collaborators.url_reputation.clone(),
            domain_info: collaborators.domain_info.clone(),
            ip_profile: collaborators.ip_reputation.clone(),
            policy,
        }
    }

    pub async fn run(&self, urls: &[String], include_enhanced: bool) -> SignalReport {
        let mut report = SignalReport::scored(SignalKind::UrlReputation);
        let mut lookup_errors: Vec<String> = Vec::new();

        for url in urls {
            let mut url_risk = 0u32;
            let mut url_findings: Vec<String> = Vec::new();
            let host = host_of(url).unwrap_or_default();

            if let Ok(parsed) = Url::parse(url) {
                if parsed.scheme() == "http" {
                    url_risk += self.policy.url_insecure_scheme_risk;
                    url_findings.push(format!("Non-HTTPS link: {url}"));
                }
            }

            if !host.is_empty() && is_shortener_host(&host) {
                url_risk += self.policy.url_shortener_risk;
                url_findings.push(format!("Shortened URL hides its destination: {url}"));
            }

            if let Some(blocklist) = &self.blocklist {
                match blocklist.check_url(url).await {
                    Ok(reputation) if reputation.is_malicious => {
                        url_risk += self.policy.url_malicious_risk;
                        let threats = if reputation.threat_types.is_empty() {
                            "unspecified".to_string()
                        } else {
                            reputation.threat_types.join(", ")
                        };
                        url_findings.push(format!("URL flagged by blocklist ({threats}): {url}"));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("Blocklist lookup failed for {url}: {e:#}");
                        lookup_errors.push(format!("blocklist: {e}"));
                    }
                }
            }

            if include_enhanced && !host.is_empty() {
                if let Some(domain_info) = &self.domain_info {
                    match domain_info.domain_info(&host).await {
                        Ok(info) => {
                            if info.is_younger_than(self.policy.young_domain_max_age_days) {
                                url_risk += self.policy.url_young_domain_risk;
                                url_findings.push(format!(
                                    "Recently registered domain ({} days old): {}",
                                    info.age_days.unwrap_or(0),
                                    info.domain
                                ));
                            }
                        }
                        Err(e) => {
                            log::debug!("Domain info lookup failed for {host}: {e:#}");
                            lookup_errors.push(format!("domain_info: {e}"));
                        }
                    }
                }

                if let Some(ip_profile) = &self.ip_profile {
                    match ip_profile.host_profile(&host).await {
                        Ok(profile) => {
                            if profile.is_proxy || profile.is_hosting {
                                url_risk += self.policy.url_hosting_ip_risk;
                                url_findings
                                    .push(format!("URL served from proxy/hosting IP: {host}"));
                            }
                        }
                        Err(e) => {
                            log::debug!("Host profile lookup failed for {host}: {e:#}");
                            lookup_errors.push(format!("ip_profile: {e}"));
                        }
                    }
                }
            }

            let capped = url_risk.min(self.policy.url_risk_cap);
            if capped < url_risk {
                log::debug!("URL risk for {url} capped from {url_risk} to {capped}");
            }
            report.risk += capped;
            report.findings.extend(url_findings);
        }

        report.detail("urls_checked", json!(urls.len()));
        if !lookup_errors.is_empty() {
            report.detail("lookup_errors", json!(lookup_errors));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::{MockDomainInfo, MockIpProfile, MockUrlReputation};
    use std::collections::HashSet;

    fn signal(collaborators: Collaborators) -> UrlReputationSignal {
        UrlReputationSignal::new(&collaborators, ScoringPolicy::default())
    }

    fn bare_collaborators() -> Collaborators {
        Collaborators {
            url_reputation: Some(Arc::new(MockUrlReputation::default())),
            domain_info: Some(Arc::new(MockDomainInfo::default().defaulting_to(3650))),
            ip_reputation: Some(Arc::new(MockIpProfile::default())),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn shortener_plus_plain_http_scores_five() {
        let report = signal(bare_collaborators())
            .run(&["http://bit.ly/x9z".to_string()], true)
            .await;
        assert!(report.available);
        assert_eq!(report.risk, 5);
        assert_eq!(report.findings.len(), 2);
    }

    #[tokio::test]
    async fn clean_https_url_scores_zero() {
        let report = signal(bare_collaborators())
            .run(&["https://example.com/page".to_string()], true)
            .await;
        assert_eq!(report.risk, 0);
        assert!(report.findings.is_empty());
    }

    #[tokio::test]
    async fn malicious_url_with_everything_is_capped() {
        let collaborators = Collaborators {
            url_reputation: Some(Arc::new(MockUrlReputation::flagging(["bad.tk"]))),
            domain_info: Some(Arc::new(MockDomainInfo::default().with_age("bad.tk", 10))),
            ip_reputation: Some(Arc::new(MockIpProfile {
                proxy_hosts: HashSet::from(["bad.tk".to_string()]),
                hosting_hosts: HashSet::new(),
            })),
            ..Default::default()
        };
        let policy = ScoringPolicy::default();
        let report = signal(collaborators)
            .run(&["http://bad.tk/login".to_string()], true)
            .await;
        // Raw 10+3+2+2 = 17 capped at the per-URL cap.
        assert_eq!(report.risk, policy.url_risk_cap);
        assert!(report.risk < policy.critical_at);
    }

    #[tokio::test]
    async fn enhanced_lookups_are_gated() {
        let collaborators = Collaborators {
            url_reputation: Some(Arc::new(MockUrlReputation::default())),
            domain_info: Some(Arc::new(MockDomainInfo::default().with_age("new.example", 5))),
            ip_reputation: Some(Arc::new(MockIpProfile::default())),
            ..Default::default()
        };
        let with_enhanced = signal(collaborators.clone())
            .run(&["https://new.example/x".to_string()], true)
            .await;
        let without_enhanced = signal(collaborators)
            .run(&["https://new.example/x".to_string()], false)
            .await;
        assert_eq!(with_enhanced.risk, 3);
        assert_eq!(without_enhanced.risk, 0);
    }

    #[tokio::test]
    async fn failed_lookups_degrade_without_killing_the_signal() {
        // No blocklist client wired at all: local checks still apply.
        let collaborators = Collaborators::default();
        let report = signal(collaborators)
            .run(&["http://bit.ly/abc".to_string()], true)
            .await;
        assert!(report.available);
        assert_eq!(report.risk, 5);
    }

    #[tokio::test]
    async fn risk_accumulates_across_urls() {
        let report = signal(bare_collaborators())
            .run(
                &[
                    "http://bit.ly/a".to_string(),
                    "http://tinyurl.com/b".to_string(),
                ],
                true,
            )
            .await;
        assert_eq!(report.risk, 10);
    }
}
