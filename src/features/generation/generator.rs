//! Text generation seam
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::features::personas::PersonaConfig;

/// One single-turn generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instruction: String,
    pub temperature: f32,
    pub model: String,
}

impl GenerationRequest {
    /// Build a request that carries a persona's steering settings
    pub fn for_persona(prompt: &str, persona: &PersonaConfig) -> Self {
        Self {
            prompt: prompt.to_string(),
            system_instruction: persona.system_instruction.clone(),
            temperature: persona.temperature,
            model: persona.model.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("prompt was blocked: {0}")]
    Blocked(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs can carry credentials; keep them out of replies and logs
        GenerationError::Http(e.without_url())
    }
}

/// Anything that can turn a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Run a generation under a hard deadline
pub async fn generate_with_timeout(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    limit: Duration,
) -> Result<String, GenerationError> {
    tokio::time::timeout(limit, generator.generate(request))
        .await
        .map_err(|_| GenerationError::Timeout(limit))?
}
