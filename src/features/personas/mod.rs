//! # Personas Feature
//!
//! Channel-scoped personas: a system instruction, temperature and model per channel,
//! falling back to a default, persisted as a JSON document.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod backend;
pub mod persona;
pub mod store;

pub use backend::{JsonFileBackend, MemoryBackend, PersonaBackend};
pub use persona::{
    validate_temperature, PersonaConfig, PersonaDocument, PersonaError, PersonaSource,
    ResolvedPersona, StorageError, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
pub use store::PersonaStore;
