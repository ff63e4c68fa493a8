//! Persona records and the persisted document shape
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Backend model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
/// Temperature applied when `/persona_set` omits one
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const DEFAULT_PERSONA_NAME: &str = "Default";
const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub name: String,
    pub system_instruction: String,
    /// Sampling temperature in `[0, 1]`
    pub temperature: f32,
    pub model: String,
}

impl PersonaConfig {
    /// The persona a fresh store starts with
    pub fn fallback(model: &str) -> Self {
        Self {
            name: DEFAULT_PERSONA_NAME.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            model: model.to_string(),
        }
    }
}

/// Check a temperature before it is stored or sent upstream
pub fn validate_temperature(temperature: f32) -> Result<f32, PersonaError> {
    if (0.0..=1.0).contains(&temperature) {
        Ok(temperature)
    } else {
        Err(PersonaError::InvalidTemperature(temperature))
    }
}

/// Whole persisted state: `{ "default": ..., "by_channel": { "<id>": ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaDocument {
    pub default: PersonaConfig,
    #[serde(default)]
    pub by_channel: BTreeMap<String, PersonaConfig>,
}

impl PersonaDocument {
    pub fn new(default: PersonaConfig) -> Self {
        Self {
            default,
            by_channel: BTreeMap::new(),
        }
    }

    pub fn lookup(&self, channel_id: &str) -> ResolvedPersona {
        match self.by_channel.get(channel_id) {
            Some(persona) => ResolvedPersona {
                persona: persona.clone(),
                source: PersonaSource::ChannelOverride,
            },
            None => ResolvedPersona {
                persona: self.default.clone(),
                source: PersonaSource::Default,
            },
        }
    }
}

/// Where a resolved persona came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaSource {
    ChannelOverride,
    Default,
}

impl PersonaSource {
    pub fn label(self) -> &'static str {
        match self {
            PersonaSource::ChannelOverride => "channel override",
            PersonaSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPersona {
    pub persona: PersonaConfig,
    pub source: PersonaSource,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access persona store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("persona store at {path} is malformed: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize persona store: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("persona store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("temperature must be between 0 and 1, got {0}")]
    InvalidTemperature(f32),
    #[error("persona name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Storage(#[from] StorageError),
}
