//! # Features
//!
//! Domain features used by the slash commands.

pub mod generation;
pub mod personas;

pub use generation::{GeminiClient, GenerationError, GenerationRequest, TextGenerator};
pub use personas::{PersonaConfig, PersonaStore};
