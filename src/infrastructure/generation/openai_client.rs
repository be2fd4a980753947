//! Blocking chat-completions client for OpenAI-compatible endpoints.

use std::time::Duration;

use crate::{
    application::services::{Generator, RemedyPrompt},
    domain::DomainError,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Generator backed by an OpenAI-style `/chat/completions` endpoint.
///
/// The adapter stays synchronous on purpose: the relaxation core treats
/// generation as an opaque blocking call and owns no retry or timeout policy
/// beyond this client's transport timeout.
pub struct OpenAiGenerator {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiGenerator {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();

        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl Generator for OpenAiGenerator {
    fn complete(&self, prompt: &RemedyPrompt) -> Result<String, DomainError> {
        let request_body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
        });

        let response = self
            .agent
            .post(&self.chat_url())
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(request_body)
            .map_err(|err| {
                DomainError::generation(format!("chat completion request failed: {err}"))
            })?;

        let payload: serde_json::Value = response.into_json().map_err(|err| {
            DomainError::generation(format!("failed to decode chat completion response: {err}"))
        })?;

        extract_message_text(&payload)
    }
}

/// Pulls the first choice's message content out of a chat-completions payload.
/// Trimmed, so a generator that appends a trailing newline still satisfies the
/// exact-sentinel contract.
fn extract_message_text(payload: &serde_json::Value) -> Result<String, DomainError> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(|content| content.as_str())
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            DomainError::generation("chat completion response carried no message content")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_trims_message_content() {
        let payload = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "No remedy found.\n" } }
            ]
        });
        assert_eq!(extract_message_text(&payload).unwrap(), "No remedy found.");
    }

    #[test]
    fn missing_content_is_a_generation_error() {
        let payload = serde_json::json!({ "choices": [] });
        let err = extract_message_text(&payload).unwrap_err();
        assert!(matches!(err, DomainError::Generation(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = OpenAiGenerator::new("https://api.openai.com/v1/", "key", "gpt-4o-mini", 0.2);
        assert_eq!(client.chat_url(), "https://api.openai.com/v1/chat/completions");
    }
}
