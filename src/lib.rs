// Core layer - configuration and response utilities
pub mod core;

// Features layer - persona store and text generation
pub mod features;

// Application layer
pub mod commands;

pub use core::Config;
pub use features::{GeminiClient, PersonaConfig, PersonaStore, TextGenerator};
