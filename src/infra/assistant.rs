//! HTTP text-generation backend for the writing assistant.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::application::assistant::{AssistantError, GenerationRequest, TextGenerator};

use super::error::InfraError;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Posts `{"prompt", "history"}` as JSON and expects `{"text"}` back.
#[derive(Clone)]
pub struct HttpTextGenerator {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpTextGenerator {
    pub fn new(endpoint: Url, api_key: Option<String>) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("tessera/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AssistantError> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(api_key) = self.api_key.as_deref() {
            builder = builder.bearer_auth(api_key);
        }

        debug!(
            target = "infra::assistant",
            endpoint = %self.endpoint,
            history = request.history.len(),
            "sending generation request"
        );

        let response = builder
            .send()
            .await
            .map_err(|err| AssistantError::transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AssistantError::transport(err.to_string()))?;

        if !status.is_success() {
            return Err(AssistantError::Status {
                status: status.as_u16(),
                message: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        parse_generation_body(&body)
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    text: Option<String>,
}

/// Extract the generated text from a success body.
pub(crate) fn parse_generation_body(body: &str) -> Result<String, AssistantError> {
    let response: GenerationResponse = serde_json::from_str(body)
        .map_err(|err| AssistantError::invalid_response(err.to_string()))?;

    match response.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AssistantError::invalid_response("response carried no text")),
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::assistant::ChatMessage;

    #[test]
    fn request_payload_shape() {
        let request = GenerationRequest {
            prompt: "Summarise HACCP".into(),
            history: vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            serde_json::json!({
                "prompt": "Summarise HACCP",
                "history": [
                    { "role": "user", "content": "hi" },
                    { "role": "assistant", "content": "hello" }
                ]
            })
        );
    }

    #[test]
    fn parses_text_field() {
        assert_eq!(
            parse_generation_body(r#"{"text":"<p>Done</p>","model":"x"}"#).expect("text"),
            "<p>Done</p>"
        );
    }

    #[test]
    fn missing_or_blank_text_is_invalid() {
        for body in [r#"{}"#, r#"{"text":"  "}"#, "not json"] {
            assert!(matches!(
                parse_generation_body(body),
                Err(AssistantError::InvalidResponse { .. })
            ));
        }
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(250);
        let truncated = truncate(&body, 200);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate(" short ", 200), "short");
    }
}
