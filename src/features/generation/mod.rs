//! # Generation Feature
//!
//! Single-turn text generation behind the `TextGenerator` trait, with the Gemini
//! REST implementation used by the bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod gemini;
pub mod generator;

pub use gemini::GeminiClient;
pub use generator::{generate_with_timeout, GenerationError, GenerationRequest, TextGenerator};
