use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-request feature flags. Each flag independently gates one signal;
/// disabling a signal never affects the others or the final verdict shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub use_ai: bool,
    pub analyze_urls: bool,
    pub validate_phones: bool,
    pub analyze_emails: bool,
    pub use_ml: bool,
    /// Gates the deeper URL/email lookups (domain age, hosting IP profile).
    pub include_enhanced: bool,
    /// Keep raw per-signal details in the verdict breakdown.
    pub debug: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            use_ai: true,
            analyze_urls: true,
            validate_phones: true,
            analyze_emails: true,
            use_ml: true,
            include_enhanced: true,
            debug: false,
        }
    }
}

impl ScanOptions {
    /// Everything off except the local lexical/quality signals.
    pub fn local_only() -> Self {
        Self {
            use_ai: false,
            analyze_urls: false,
            validate_phones: false,
            analyze_emails: false,
            use_ml: false,
            include_enhanced: false,
            debug: false,
        }
    }
}

/// Per-category keyword weights. Authentication and authority phrases weigh
/// more because they correlate with credential theft and impersonation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub urgency: u32,
    pub financial: u32,
    pub authentication: u32,
    pub action: u32,
    pub emotional: u32,
    pub authority: u32,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            urgency: 2,
            financial: 2,
            authentication: 3,
            action: 2,
            emotional: 2,
            authority: 3,
        }
    }
}

/// The scoring policy: every heuristic constant in one tunable place.
/// The defaults are the calibration the thresholds below were set against;
/// change one and the others may need product-level revalidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub keyword_weights: CategoryWeights,

    pub poor_quality_threshold: u32,
    pub poor_quality_bump: u32,

    pub url_malicious_risk: u32,
    pub url_young_domain_risk: u32,
    pub url_insecure_scheme_risk: u32,
    pub url_shortener_risk: u32,
    pub url_hosting_ip_risk: u32,
    /// Cap on a single URL's contribution. Must stay below `critical_at` so
    /// one URL alone can never force the top tier.
    pub url_risk_cap: u32,
    pub young_domain_max_age_days: u32,

    pub email_disposable_risk: u32,
    pub email_local_part_risk: u32,
    pub email_young_domain_risk: u32,

    pub phone_invalid_risk: u32,

    pub ai_confidence_divisor: u32,
    pub ml_risk_multiplier: f64,

    pub confidence_floor: u8,
    pub confidence_cap: u8,

    /// Threshold ladder over the accumulated score, evaluated top-down.
    pub low_at: u32,
    pub medium_at: u32,
    pub high_at: u32,
    pub critical_at: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            keyword_weights: CategoryWeights::default(),
            poor_quality_threshold: 70,
            poor_quality_bump: 2,
            url_malicious_risk: 10,
            url_young_domain_risk: 3,
            url_insecure_scheme_risk: 2,
            url_shortener_risk: 3,
            url_hosting_ip_risk: 2,
            url_risk_cap: 12,
            young_domain_max_age_days: 90,
            email_disposable_risk: 3,
            email_local_part_risk: 2,
            email_young_domain_risk: 2,
            phone_invalid_risk: 2,
            ai_confidence_divisor: 20,
            ml_risk_multiplier: 5.0,
            confidence_floor: 60,
            confidence_cap: 95,
            low_at: 3,
            medium_at: 6,
            high_at: 10,
            critical_at: 15,
        }
    }
}

impl ScoringPolicy {
    /// Reject inconsistent policies at construction time, never mid-analysis.
    pub fn validate(&self) -> Result<()> {
        if !(self.low_at < self.medium_at
            && self.medium_at < self.high_at
            && self.high_at < self.critical_at)
        {
            return Err(anyhow!(
                "threshold ladder must be strictly increasing: {} < {} < {} < {}",
                self.low_at,
                self.medium_at,
                self.high_at,
                self.critical_at
            ));
        }
        if self.low_at == 0 {
            return Err(anyhow!("low_at must be positive"));
        }
        if self.url_risk_cap >= self.critical_at {
            return Err(anyhow!(
                "url_risk_cap ({}) must stay below critical_at ({})",
                self.url_risk_cap,
                self.critical_at
            ));
        }
        if self.ai_confidence_divisor == 0 {
            return Err(anyhow!("ai_confidence_divisor must be nonzero"));
        }
        if self.ml_risk_multiplier <= 0.0 {
            return Err(anyhow!("ml_risk_multiplier must be positive"));
        }
        if self.confidence_floor > self.confidence_cap {
            return Err(anyhow!(
                "confidence_floor ({}) exceeds confidence_cap ({})",
                self.confidence_floor,
                self.confidence_cap
            ));
        }
        if self.confidence_cap > 100 {
            return Err(anyhow!("confidence_cap must be <= 100"));
        }
        Ok(())
    }
}

/// Per-signal wall-clock budgets in milliseconds. A signal that exceeds its
/// budget is cancelled and reported unavailable, never retried in-request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalBudgets {
    pub url_ms: u64,
    pub email_ms: u64,
    pub phone_ms: u64,
    pub ai_ms: u64,
    pub ml_ms: u64,
}

impl Default for SignalBudgets {
    fn default() -> Self {
        Self {
            url_ms: 4000,
            email_ms: 4000,
            phone_ms: 3000,
            ai_ms: 8000,
            ml_ms: 3000,
        }
    }
}

/// Endpoint plus optional credential for one HTTP collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub endpoint: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

fn default_llm_timeout() -> u64 {
    15
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhoisSettings {
    pub timeout_seconds: u64,
}

impl Default for WhoisSettings {
    fn default() -> Self {
        Self { timeout_seconds: 5 }
    }
}

/// Which collaborators exist and how to reach them. A missing section means
/// the corresponding signal reports itself unavailable when requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub url_reputation: Option<ApiSettings>,
    pub ip_reputation: Option<ApiSettings>,
    pub phone_validation: Option<ApiSettings>,
    pub ai: Option<LlmSettings>,
    pub ml: Option<ApiSettings>,
    pub whois: WhoisSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub policy: ScoringPolicy,
    pub budgets: SignalBudgets,
    pub providers: ProviderConfig,
}

impl EngineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: EngineConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.policy.validate()?;
        Ok(config)
    }

    pub fn generate_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(&EngineConfig::default())?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        log::info!("Generated default configuration at {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_enable_everything_but_debug() {
        let opts = ScanOptions::default();
        assert!(opts.use_ai);
        assert!(opts.analyze_urls);
        assert!(opts.validate_phones);
        assert!(opts.analyze_emails);
        assert!(opts.use_ml);
        assert!(opts.include_enhanced);
        assert!(!opts.debug);
    }

    #[test]
    fn default_policy_is_valid() {
        assert!(ScoringPolicy::default().validate().is_ok());
    }

    #[test]
    fn inverted_ladder_is_rejected() {
        let policy = ScoringPolicy {
            high_at: 20,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn url_cap_must_stay_below_critical() {
        let policy = ScoringPolicy {
            url_risk_cap: 15,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn config_roundtrips_through_yaml() {
        let yaml = serde_yaml::to_string(&EngineConfig::default()).unwrap();
        let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.policy.critical_at, 15);
        assert_eq!(parsed.budgets.ai_ms, 8000);
        assert!(parsed.providers.ai.is_none());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let parsed: EngineConfig = serde_yaml::from_str("policy:\n  critical_at: 20\n").unwrap();
        assert_eq!(parsed.policy.critical_at, 20);
        assert_eq!(parsed.policy.high_at, 10);
        assert_eq!(parsed.budgets.url_ms, 4000);
    }
}
