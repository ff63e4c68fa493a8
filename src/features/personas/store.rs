//! # Feature: Channel Persona Store
//!
//! Per-channel persona overrides with a default fallback, persisted through an
//! injected backend after every change.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use log::{debug, info};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use super::backend::PersonaBackend;
use super::persona::{
    validate_temperature, PersonaConfig, PersonaDocument, PersonaError, ResolvedPersona,
    StorageError,
};

/// Shared persona state. Cheap to clone; clones see the same document.
#[derive(Clone)]
pub struct PersonaStore {
    backend: Arc<dyn PersonaBackend>,
    document: Arc<RwLock<PersonaDocument>>,
    default_model: String,
}

impl PersonaStore {
    /// Load the persisted document, or create and persist a fresh one.
    ///
    /// A malformed document is an error and is left untouched on disk.
    pub fn load(
        backend: Arc<dyn PersonaBackend>,
        default_model: &str,
    ) -> Result<Self, StorageError> {
        let document = match backend.load()? {
            Some(document) => {
                info!(
                    "Loaded persona store from {} ({} channel overrides)",
                    backend.describe(),
                    document.by_channel.len()
                );
                document
            }
            None => {
                let document = PersonaDocument::new(PersonaConfig::fallback(default_model));
                backend.save(&document)?;
                info!("Created default persona store at {}", backend.describe());
                document
            }
        };

        Ok(Self {
            backend,
            document: Arc::new(RwLock::new(document)),
            default_model: default_model.to_string(),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, PersonaDocument> {
        // Writers only swap in a fully persisted document, so a poisoned lock still holds valid data
        self.document
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Persona for a channel: its override if present, else the default
    pub fn resolve(&self, channel_id: &str) -> PersonaConfig {
        self.lookup(channel_id).persona
    }

    /// Like [`resolve`](Self::resolve) but also says whether an override applied
    pub fn lookup(&self, channel_id: &str) -> ResolvedPersona {
        self.read().lookup(channel_id)
    }

    /// Display alias of [`resolve`](Self::resolve)
    pub fn describe(&self, channel_id: &str) -> PersonaConfig {
        self.resolve(channel_id)
    }

    /// Insert or replace a channel override and persist the whole document.
    ///
    /// Writes are serialized on the document lock. On a failed save the
    /// in-memory state is unchanged.
    pub fn set(
        &self,
        channel_id: &str,
        name: &str,
        system_instruction: &str,
        temperature: f32,
    ) -> Result<PersonaConfig, PersonaError> {
        let temperature = validate_temperature(temperature)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(PersonaError::EmptyName);
        }

        let persona = PersonaConfig {
            name: name.to_string(),
            system_instruction: system_instruction.to_string(),
            temperature,
            model: self.default_model.clone(),
        };

        let mut document = self
            .document
            .write()
            .map_err(|_| StorageError::Poisoned)?;
        let mut updated = (*document).clone();
        updated
            .by_channel
            .insert(channel_id.to_string(), persona.clone());

        self.backend.save(&updated)?;
        *document = updated;

        debug!(
            "Persisted persona '{}' for channel {channel_id} to {}",
            persona.name,
            self.backend.describe()
        );
        Ok(persona)
    }

    pub fn channel_count(&self) -> usize {
        self.read().by_channel.len()
    }

    pub fn default_persona(&self) -> PersonaConfig {
        self.read().default.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::personas::backend::{JsonFileBackend, MemoryBackend};
    use crate::features::personas::persona::{PersonaSource, DEFAULT_MODEL};

    fn memory_store() -> (Arc<MemoryBackend>, PersonaStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = PersonaStore::load(backend.clone(), DEFAULT_MODEL).unwrap();
        (backend, store)
    }

    #[test]
    fn test_load_initializes_and_persists_default() {
        let (backend, store) = memory_store();

        let persisted = backend.snapshot().expect("default document persisted");
        assert_eq!(persisted.default, store.default_persona());
        assert!(persisted.by_channel.is_empty());
        assert_eq!(store.default_persona().model, DEFAULT_MODEL);
    }

    #[test]
    fn test_unknown_channels_resolve_to_default() {
        let (_, store) = memory_store();
        store.set("known", "Coder", "Be terse.", 0.2).unwrap();

        let default = store.default_persona();
        for id in ["", "unknown", "123456789012345678", "KNOWN", "known "] {
            assert_eq!(store.resolve(id), default, "channel {id:?}");
            assert_eq!(store.lookup(id).source, PersonaSource::Default);
        }
    }

    #[test]
    fn test_set_then_resolve() {
        let (_, store) = memory_store();
        let stored = store.set("chan1", "Coder", "Be terse.", 0.2).unwrap();

        let expected = PersonaConfig {
            name: "Coder".to_string(),
            system_instruction: "Be terse.".to_string(),
            temperature: 0.2,
            model: DEFAULT_MODEL.to_string(),
        };
        assert_eq!(stored, expected);
        assert_eq!(store.resolve("chan1"), expected);
        assert_eq!(store.describe("chan1"), expected);
        assert_eq!(store.lookup("chan1").source, PersonaSource::ChannelOverride);
        assert_eq!(store.channel_count(), 1);
    }

    #[test]
    fn test_set_overwrites_existing_override() {
        let (backend, store) = memory_store();
        store.set("chan1", "Coder", "Be terse.", 0.2).unwrap();
        store.set("chan1", "Poet", "Rhyme everything.", 0.9).unwrap();

        assert_eq!(store.resolve("chan1").name, "Poet");
        assert_eq!(store.channel_count(), 1);
        assert_eq!(backend.snapshot().unwrap().by_channel["chan1"].name, "Poet");
    }

    #[test]
    fn test_set_survives_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personas.json");

        let store = PersonaStore::load(Arc::new(JsonFileBackend::new(&path)), DEFAULT_MODEL)
            .unwrap();
        store.set("chan1", "Coder", "Be terse.", 0.2).unwrap();
        let before = store.resolve("chan1");
        drop(store);

        let reloaded =
            PersonaStore::load(Arc::new(JsonFileBackend::new(&path)), DEFAULT_MODEL).unwrap();
        assert_eq!(reloaded.resolve("chan1"), before);
        assert_eq!(reloaded.resolve("chan2"), reloaded.default_persona());
    }

    #[test]
    fn test_out_of_range_temperature_rejected_and_not_persisted() {
        let (backend, store) = memory_store();

        for bad in [-0.01, 1.5, f32::NAN, f32::INFINITY] {
            let err = store.set("chan1", "Hot", "x", bad).unwrap_err();
            assert!(matches!(err, PersonaError::InvalidTemperature(_)));
        }
        assert_eq!(store.lookup("chan1").source, PersonaSource::Default);
        assert!(backend.snapshot().unwrap().by_channel.is_empty());
    }

    #[test]
    fn test_boundary_temperatures_accepted() {
        let (_, store) = memory_store();
        assert_eq!(store.set("a", "Cold", "x", 0.0).unwrap().temperature, 0.0);
        assert_eq!(store.set("b", "Warm", "x", 1.0).unwrap().temperature, 1.0);
    }

    #[test]
    fn test_blank_name_rejected() {
        let (_, store) = memory_store();
        assert!(matches!(
            store.set("chan1", "   ", "x", 0.5),
            Err(PersonaError::EmptyName)
        ));
    }

    #[test]
    fn test_failed_save_leaves_memory_unchanged() {
        let seed = PersonaDocument::new(PersonaConfig::fallback(DEFAULT_MODEL));
        let store = PersonaStore::load(
            Arc::new(FailingAfterLoad(seed)),
            DEFAULT_MODEL,
        )
        .unwrap();

        let err = store.set("chan1", "Coder", "Be terse.", 0.2).unwrap_err();
        assert!(matches!(err, PersonaError::Storage(_)));
        assert_eq!(store.lookup("chan1").source, PersonaSource::Default);
    }

    #[test]
    fn test_load_fails_when_initial_save_fails() {
        let result = PersonaStore::load(Arc::new(MemoryBackend::failing()), DEFAULT_MODEL);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_file_fails_load_and_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personas.json");
        std::fs::write(&path, r#"{"by_channel": {}}"#).unwrap();

        let result = PersonaStore::load(Arc::new(JsonFileBackend::new(&path)), DEFAULT_MODEL);
        assert!(matches!(result, Err(StorageError::Malformed { .. })));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"by_channel": {}}"#
        );
    }

    #[test]
    fn test_concurrent_sets_for_distinct_channels_all_persist() {
        let (backend, store) = memory_store();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .set(&format!("chan{i}"), &format!("P{i}"), "x", 0.5)
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.channel_count(), 8);
        assert_eq!(backend.snapshot().unwrap().by_channel.len(), 8);
    }

    /// Serves a seed document but refuses every write
    struct FailingAfterLoad(PersonaDocument);

    impl PersonaBackend for FailingAfterLoad {
        fn load(&self) -> Result<Option<PersonaDocument>, StorageError> {
            Ok(Some(self.0.clone()))
        }

        fn save(&self, _document: &PersonaDocument) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }

        fn describe(&self) -> String {
            "read-only".to_string()
        }
    }
}
