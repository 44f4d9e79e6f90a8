//! Phone validation signal. A number the provider cannot resolve to a
//! valid line is itself a mild risk indicator; a provider we cannot reach
//! is evidence of nothing.

use crate::clients::{Collaborators, PhoneValidation};
use crate::config::ScoringPolicy;
use crate::signals::{SignalKind, SignalReport};
use serde_json::json;
use std::sync::Arc;

pub struct PhoneValidationSignal {
    client: Option<Arc<dyn PhoneValidation>>,
    policy: ScoringPolicy,
}

impl PhoneValidationSignal {
    pub fn new(collaborators: &Collaborators, policy: ScoringPolicy) -> Self {
        Self {
            client: collaborators.phone_validation.clone(),
            policy,
        }
    }

    pub async fn run(&self, phones: &[String]) -> SignalReport {
        let client = match &self.client {
            Some(client) => client,
            None => {
                return SignalReport::unavailable(
                    SignalKind::PhoneValidation,
                    "phone validation not configured",
                )
            }
        };

        let mut report = SignalReport::scored(SignalKind::PhoneValidation);
        let mut successes = 0usize;
        let mut errors: Vec<String> = Vec::new();

        for phone in phones {
            match client.validate(phone).await {
                Ok(info) => {
                    successes += 1;
                    if info.is_valid {
                        log::debug!(
                            "Phone {phone} validated (carrier: {})",
                            info.carrier.as_deref().unwrap_or("unknown")
                        );
                    } else {
                        report.add_risk(
                            self.policy.phone_invalid_risk,
                            format!("Unverifiable or invalid phone number: {phone}"),
                        );
                    }
                }
                Err(e) => {
                    log::warn!("Phone validation failed for {phone}: {e:#}");
                    errors.push(format!("{phone}: {e}"));
                }
            }
        }

        // Nothing resolved at all: that is an outage, not a result.
        if successes == 0 && !errors.is_empty() {
            return SignalReport::unavailable(
                SignalKind::PhoneValidation,
                format!("all lookups failed: {}", errors.join("; ")),
            );
        }

        report.detail("phones_checked", json!(phones.len()));
        if !errors.is_empty() {
            report.detail("lookup_errors", json!(errors));
        }
        report
    }
}
