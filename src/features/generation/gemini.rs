//! Gemini `generateContent` client
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::generator::{GenerationError, GenerationRequest, TextGenerator};

/// Public Gemini endpoint, overridable with `GEMINI_API_BASE`
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Longest upstream error message passed on to users
const MAX_ERROR_MESSAGE_CHARS: usize = 500;

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
            timeout,
        }
    }

    /// Point the client at another endpoint (proxies, regional gateways)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.base_url, model)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn build_request(request: &GenerationRequest) -> GeminiRequest {
    let system_instruction = if request.system_instruction.trim().is_empty() {
        None
    } else {
        Some(GeminiContent {
            role: None,
            parts: vec![GeminiTextPart {
                text: request.system_instruction.clone(),
            }],
        })
    };

    GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiTextPart {
                text: request.prompt.clone(),
            }],
        }],
        system_instruction,
        generation_config: GeminiGenerationConfig {
            temperature: request.temperature,
        },
    }
}

/// Concatenate the first candidate's text parts
fn extract_text(response: GeminiResponse) -> Result<String, GenerationError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::Blocked(reason));
    }

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text)
}

fn api_error(status: u16, body: &str) -> GenerationError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    // Gateways can answer with whole HTML pages
    let message = if message.chars().count() > MAX_ERROR_MESSAGE_CHARS {
        let cut: String = message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        format!("{cut}...")
    } else {
        message
    };
    GenerationError::Api { status, message }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = build_request(request);
        debug!(
            "Calling Gemini model {} | Prompt length: {} | Temperature: {}",
            request.model,
            request.prompt.len(),
            request.temperature
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        let parsed: GeminiResponse = response.json().await?;
        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::personas::{PersonaConfig, DEFAULT_MODEL};

    fn sample_request() -> GenerationRequest {
        GenerationRequest::for_persona(
            "What is Rust?",
            &PersonaConfig {
                name: "Coder".to_string(),
                system_instruction: "Be terse.".to_string(),
                temperature: 0.2,
                model: DEFAULT_MODEL.to_string(),
            },
        )
    }

    #[test]
    fn test_request_body_shape() {
        let value = serde_json::to_value(build_request(&sample_request())).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "What is Rust?");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Be terse.");
        assert!(value["systemInstruction"].get("role").is_none());
        let temperature = value["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_blank_system_instruction_omitted() {
        let mut request = sample_request();
        request.system_instruction = "  ".to_string();
        let value = serde_json::to_value(build_request(&request)).unwrap();
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new("key", Duration::from_secs(1))
            .with_base_url("http://localhost:8080/models/");
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost:8080/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Hello, "},{"text":"world. "}],"role":"model"}}]}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(response).unwrap(), "Hello, world. ");
    }

    #[test]
    fn test_extract_text_keeps_leading_indentation() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"    fn main() {}\n"}]}}]}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(response).unwrap(), "    fn main() {}\n");
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_text(response).unwrap(), "");
    }

    #[test]
    fn test_blocked_prompt() {
        let json = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::Blocked(reason)) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_api_error_prefers_message_field() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        match api_error(429, body) {
            GenerationError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Resource has been exhausted");
            }
            other => panic!("unexpected error: {other}"),
        }

        match api_error(502, "Bad Gateway\n") {
            GenerationError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_api_error_caps_long_bodies() {
        let page = format!("<html>{}</html>", "x".repeat(3000));
        match api_error(502, &page) {
            GenerationError::Api { message, .. } => {
                assert_eq!(message.chars().count(), MAX_ERROR_MESSAGE_CHARS + 3);
                assert!(message.starts_with("<html>"));
                assert!(message.ends_with("..."));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_connection_failure_does_not_leak_api_key() {
        // Nothing listens on port 1, so the request fails before any response
        let client = GeminiClient::new("SECRET_API_KEY_123", Duration::from_secs(2))
            .with_base_url("http://127.0.0.1:1/models");

        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Http(_)));

        let debug = format!("{err:?}");
        assert!(!debug.contains("SECRET_API_KEY_123"), "key leaked: {debug}");
        let display = err.to_string();
        assert!(!display.contains("SECRET_API_KEY_123"), "key leaked: {display}");
        assert!(!display.contains("127.0.0.1:1"), "url leaked: {display}");
    }
}
