//! Storage backends for the persona document
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use super::persona::{PersonaDocument, StorageError};

/// Where the persona document lives.
///
/// `load` returns `Ok(None)` when nothing has been persisted yet.
pub trait PersonaBackend: Send + Sync {
    fn load(&self) -> Result<Option<PersonaDocument>, StorageError>;

    fn save(&self, document: &PersonaDocument) -> Result<(), StorageError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Pretty-printed JSON file, rewritten wholesale on every save
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersonaBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<PersonaDocument>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StorageError::Malformed {
                path: self.path.display().to_string(),
                source,
            })
    }

    fn save(&self, document: &PersonaDocument) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(document).map_err(StorageError::Serialize)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Write beside the target then rename, so readers never see a half-written file
        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process backend, used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: Mutex<Option<PersonaDocument>>,
    fail_saves: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose saves always fail
    pub fn failing() -> Self {
        Self {
            document: Mutex::new(None),
            fail_saves: true,
        }
    }

    /// Last persisted document
    pub fn snapshot(&self) -> Option<PersonaDocument> {
        self.document.lock().ok().and_then(|doc| doc.clone())
    }
}

impl PersonaBackend for MemoryBackend {
    fn load(&self) -> Result<Option<PersonaDocument>, StorageError> {
        let doc = self.document.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(doc.clone())
    }

    fn save(&self, document: &PersonaDocument) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::Io {
                path: self.describe(),
                source: std::io::Error::new(ErrorKind::Other, "simulated write failure"),
            });
        }
        let mut doc = self.document.lock().map_err(|_| StorageError::Poisoned)?;
        *doc = Some(document.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
