//! LLM text classification over an Ollama-compatible chat endpoint. The
//! completion is semi-structured text; the JSON verdict is extracted and
//! validated here so nothing downstream ever sees a raw completion.

use crate::clients::{AiClassification, TextClassifier};
use crate::config::LlmSettings;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are a scam detection classifier. Analyze the user's message and \
respond with ONLY a JSON object of this exact shape: {\"is_scam\": bool, \"confidence\": 0-100, \
\"risk_level\": \"low|medium|high|critical\", \"scam_type\": string, \"indicators\": \
[{\"type\": string, \"description\": string, \"severity\": string}], \"red_flags\": [string], \
\"recommendation\": \"block|caution|investigate|likely_safe\"}. No prose outside the JSON.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

pub struct LlmClassifierClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClassifierClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        if settings.endpoint.is_empty() {
            return Err(anyhow!("ai endpoint must not be empty"));
        }
        if settings.model.is_empty() {
            return Err(anyhow!("ai model must not be empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!("scamcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build LLM HTTP client")?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

/// Pull the first balanced JSON object out of a completion. Models wrap
/// verdicts in prose or markdown fences despite instructions not to.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[async_trait]
impl TextClassifier for LlmClassifierClient {
    async fn classify(&self, text: &str) -> Result<AiClassification> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            stream: false,
        };

        log::debug!(
            "Requesting classification from {} (model {})",
            self.endpoint,
            self.model
        );
        let mut http_request = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request
            .send()
            .await
            .context("LLM classification request failed")?;
        if !response.status().is_success() {
            return Err(anyhow!("LLM returned status {}", response.status()));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("LLM response was not valid chat JSON")?;

        let json = extract_json_object(&chat.message.content)
            .ok_or_else(|| anyhow!("LLM completion contained no JSON object"))?;
        let classification: AiClassification = serde_json::from_str(json)
            .context("LLM verdict did not match the classification schema")?;
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_json() {
        let text = r#"{"is_scam": true, "confidence": 90}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn extracts_json_from_markdown_fences() {
        let text = "Here is my analysis:\n```json\n{\"is_scam\": false, \"confidence\": 10}\n```\nDone.";
        let json = extract_json_object(text).unwrap();
        let parsed: AiClassification = serde_json::from_str(json).unwrap();
        assert!(!parsed.is_scam);
        assert_eq!(parsed.clamped_confidence(), 10);
    }

    #[test]
    fn handles_nested_objects_and_braces_in_strings() {
        let text = r#"verdict: {"is_scam": true, "indicators": [{"type": "a {weird} one", "description": "d", "severity": "high"}]} trailing"#;
        let json = extract_json_object(text).unwrap();
        let parsed: AiClassification = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.indicators.len(), 1);
        assert_eq!(parsed.indicators[0].kind, "a {weird} one");
    }

    #[test]
    fn no_json_yields_none() {
        assert!(extract_json_object("I think this is a scam.").is_none());
        assert!(extract_json_object("unbalanced { here").is_none());
    }
}
