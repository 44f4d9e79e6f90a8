//! Domain registration age via direct WHOIS (TCP port 43) with a DNS
//! fallback. Results are cached in-process for a day; registration dates
//! do not move.

use crate::clients::{DomainInfo, DomainInfoLookup};
use crate::domains::registrable_domain;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct CachedInfo {
    info: DomainInfo,
    cached_at: SystemTime,
}

#[derive(Debug, Clone)]
pub struct WhoisDomainClient {
    cache: Arc<RwLock<HashMap<String, CachedInfo>>>,
    timeout: Duration,
}

impl WhoisDomainClient {
    pub fn new(timeout_seconds: u64) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    /// WHOIS server for a domain's TLD; IANA for anything unlisted.
    fn whois_server(domain: &str) -> &'static str {
        let tld = domain.split('.').next_back().unwrap_or(domain);
        match tld {
            "com" | "net" => "whois.verisign-grs.com",
            "org" => "whois.pir.org",
            "info" => "whois.afilias.net",
            "biz" => "whois.neulevel.biz",
            "us" => "whois.nic.us",
            "uk" => "whois.nic.uk",
            "de" => "whois.denic.de",
            "fr" => "whois.afnic.fr",
            "it" => "whois.nic.it",
            "nl" => "whois.domain-registry.nl",
            "au" => "whois.auda.org.au",
            "ca" => "whois.cira.ca",
            "jp" => "whois.jprs.jp",
            "cn" => "whois.cnnic.cn",
            "ru" => "whois.tcinet.ru",
            "br" => "whois.registro.br",
            "mx" => "whois.mx",
            "tk" => "whois.dot.tk",
            "ml" => "whois.dot.ml",
            "ga" => "whois.dot.ga",
            "cf" => "whois.dot.cf",
            _ => "whois.iana.org",
        }
    }

    async fn query_whois_server(&self, server: &str, domain: &str) -> Result<String> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpStream;
        use tokio::time::timeout;

        log::debug!("Connecting to WHOIS server {server}:43 for {domain}");
        let mut stream =
            timeout(self.timeout, TcpStream::connect(format!("{server}:43"))).await??;

        let query = format!("{domain}\r\n");
        stream.write_all(query.as_bytes()).await?;

        let mut response = String::new();
        timeout(self.timeout, stream.read_to_string(&mut response)).await??;

        if response.is_empty() {
            return Err(anyhow!("Empty WHOIS response"));
        }
        Ok(response)
    }

    fn parse_whois_text(text: &str, domain: &str) -> Result<DomainInfo> {
        // Creation-date labels vary wildly across registries.
        let patterns = [
            r"(?i)creation\s*date[:\s]+([^\r\n]+)",
            r"(?i)created[:\s]+([^\r\n]+)",
            r"(?i)registered[:\s]+([^\r\n]+)",
            r"(?i)domain\s*created[:\s]+([^\r\n]+)",
            r"(?i)registration\s*date[:\s]+([^\r\n]+)",
            r"(?i)created\s*on[:\s]+([^\r\n]+)",
            r"(?i)registered\s*on[:\s]+([^\r\n]+)",
            r"(?i)create_date[:\s]+([^\r\n]+)",
            r"(?i)registration_time[:\s]+([^\r\n]+)",
        ];

        for pattern in patterns {
            if let Ok(regex) = Regex::new(pattern) {
                if let Some(captures) = regex.captures(text) {
                    if let Some(date_match) = captures.get(1) {
                        let date_str = date_match.as_str().trim();
                        if let Some(creation) = parse_date_string(date_str) {
                            let age_days = age_in_days(creation);
                            log::debug!(
                                "Parsed creation date for {domain}: {date_str} ({age_days} days old)"
                            );
                            return Ok(DomainInfo {
                                domain: domain.to_string(),
                                age_days: Some(age_days),
                            });
                        }
                        log::debug!("Unparseable creation date format: '{date_str}'");
                    }
                }
            }
        }

        Err(anyhow!("No creation date found in WHOIS text"))
    }

    async fn fetch(&self, domain: &str) -> Result<DomainInfo> {
        let primary = Self::whois_server(domain);
        match self.query_whois_server(primary, domain).await {
            Ok(text) => {
                if let Ok(info) = Self::parse_whois_text(&text, domain) {
                    return Ok(info);
                }
            }
            Err(e) => log::debug!("WHOIS query to {primary} failed: {e}"),
        }

        for fallback in ["whois.iana.org", "whois.internic.net"] {
            if fallback == primary {
                continue;
            }
            match self.query_whois_server(fallback, domain).await {
                Ok(text) => {
                    if let Ok(info) = Self::parse_whois_text(&text, domain) {
                        return Ok(info);
                    }
                }
                Err(e) => log::debug!("Fallback WHOIS server {fallback} failed: {e}"),
            }
        }

        // DNS fallback: confirms the domain exists but not its age.
        self.dns_fallback(domain).await
    }

    async fn dns_fallback(&self, domain: &str) -> Result<DomainInfo> {
        use hickory_resolver::TokioAsyncResolver;

        log::debug!("All WHOIS servers failed for {domain}, trying DNS");
        let resolver = TokioAsyncResolver::tokio_from_system_conf()?;
        match resolver.lookup_ip(domain).await {
            Ok(_) => Ok(DomainInfo {
                domain: domain.to_string(),
                age_days: None,
            }),
            Err(e) => Err(anyhow!("Domain does not resolve: {e}")),
        }
    }
}

#[async_trait]
impl DomainInfoLookup for WhoisDomainClient {
    async fn domain_info(&self, domain: &str) -> Result<DomainInfo> {
        let root = registrable_domain(&domain.to_lowercase());
        if root.is_empty() || !root.contains('.') || root.contains(' ') {
            return Err(anyhow!("Invalid domain format: {root}"));
        }

        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&root) {
                let age = SystemTime::now()
                    .duration_since(entry.cached_at)
                    .unwrap_or(Duration::ZERO);
                if age < CACHE_TTL {
                    log::debug!("Using cached domain info for {root}");
                    return Ok(entry.info.clone());
                }
            }
        }

        let info = self.fetch(&root).await?;

        {
            let mut cache = self.cache.write().await;
            cache.insert(
                root,
                CachedInfo {
                    info: info.clone(),
                    cached_at: SystemTime::now(),
                },
            );
        }

        Ok(info)
    }
}

/// Parse an ISO-style date out of whatever surrounding format the registry
/// uses. Day precision is plenty for an age check.
fn parse_date_string(date_str: &str) -> Option<SystemTime> {
    let iso = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();
    let captures = iso.captures(date_str)?;
    let year: u32 = captures[1].parse().ok()?;
    let month: u32 = captures[2].parse().ok()?;
    let day: u32 = captures[3].parse().ok()?;

    let days = days_since_epoch(year, month, day)?;
    Some(UNIX_EPOCH + Duration::from_secs(days * 24 * 60 * 60))
}

fn days_since_epoch(year: u32, month: u32, day: u32) -> Option<u64> {
    if year < 1970 || month == 0 || month > 12 || day == 0 || day > 31 {
        return None;
    }

    let years_since_1970 = (year - 1970) as u64;
    let mut days = years_since_1970 * 365 + years_since_1970 / 4;

    const DAYS_IN_MONTH: [u64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    for m in 1..month {
        days += DAYS_IN_MONTH[(m - 1) as usize];
    }

    Some(days + day as u64 - 1)
}

fn age_in_days(creation: SystemTime) -> u32 {
    let secs = SystemTime::now()
        .duration_since(creation)
        .unwrap_or(Duration::ZERO)
        .as_secs();
    (secs / (24 * 60 * 60)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whois_server_selection() {
        assert_eq!(
            WhoisDomainClient::whois_server("example.com"),
            "whois.verisign-grs.com"
        );
        assert_eq!(WhoisDomainClient::whois_server("example.org"), "whois.pir.org");
        assert_eq!(
            WhoisDomainClient::whois_server("example.zz"),
            "whois.iana.org"
        );
    }

    #[test]
    fn parses_creation_date_variants() {
        let samples = [
            "Creation Date: 2020-05-01T00:00:00Z",
            "created: 2020-05-01",
            "Registered on: 2020-05-01 12:00:00",
        ];
        for sample in samples {
            let info = WhoisDomainClient::parse_whois_text(sample, "example.com").unwrap();
            assert!(info.age_days.is_some(), "failed on: {sample}");
        }
    }

    #[test]
    fn rejects_text_without_creation_date() {
        let result = WhoisDomainClient::parse_whois_text("No match for domain", "example.com");
        assert!(result.is_err());
    }

    #[test]
    fn parsed_age_is_plausible() {
        let info =
            WhoisDomainClient::parse_whois_text("Creation Date: 1997-09-15", "example.com")
                .unwrap();
        // Registered last century, so far more than a decade old.
        assert!(info.age_days.unwrap() > 3650);
    }

    #[test]
    fn invalid_dates_are_rejected() {
        assert!(parse_date_string("not a date").is_none());
        assert!(parse_date_string("1969-01-01").is_none());
        assert!(days_since_epoch(2020, 13, 1).is_none());
        assert!(days_since_epoch(2020, 0, 1).is_none());
    }

    #[tokio::test]
    async fn invalid_domain_is_rejected_before_any_query() {
        let client = WhoisDomainClient::new(1);
        assert!(client.domain_info("nodots").await.is_err());
    }
}
