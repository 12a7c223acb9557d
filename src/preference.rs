//! Persisted language preference.
//!
//! The browser keeps the selected language under one key of its
//! per-origin key-value storage. [`Storage`] abstracts that store; the
//! [`PreferenceStore`] wraps a single key with read/write semantics and a
//! default, and never surfaces storage failures to its callers.

use crate::i18n::Language;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Default storage key for the language preference
pub const DEFAULT_STORAGE_KEY: &str = "gvmi-lang";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {path} is not a JSON string map: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value storage scoped to one browsing context.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Storage that lives as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a JSON object file, surviving process restarts.
///
/// Every read goes to disk so that several instances on the same path see
/// each other's writes, like tabs sharing an origin's storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|source| StorageError::Format {
            path: self.path.clone(),
            source,
        })
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut items = self.load().unwrap_or_default();
        items.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&items).map_err(|source| StorageError::Format {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })?;
        }

        std::fs::write(&self.path, json).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// The persisted language preference.
pub struct PreferenceStore {
    storage: Box<dyn Storage>,
    key: String,
    default: Language,
}

impl PreferenceStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            key: DEFAULT_STORAGE_KEY.to_string(),
            default: Language::default_language(),
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    pub fn with_default(mut self, default: Language) -> Self {
        self.default = default;
        self
    }

    /// In-memory store, mainly for tests and one-shot runs.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    pub fn default_language(&self) -> Language {
        self.default
    }

    /// The stored language, or the default when nothing valid is stored.
    pub fn read(&self) -> Language {
        match self.storage.get_item(&self.key) {
            Ok(Some(code)) => Language::from_code(&code).unwrap_or_else(|e| {
                debug!("Ignoring stored language preference: {}", e);
                self.default
            }),
            Ok(None) => self.default,
            Err(e) => {
                warn!("Failed to read language preference: {}", e);
                self.default
            }
        }
    }

    /// Persist a language code, overwriting the previous value.
    ///
    /// The code is stored as given; unsupported codes are filtered on `read`.
    pub fn write(&mut self, code: &str) {
        if let Err(e) = self.storage.set_item(&self.key, code) {
            warn!("Failed to persist language preference '{}': {}", code, e);
        }
    }

    /// Raw stored value, bypassing validation.
    pub fn stored_code(&self) -> Option<String> {
        self.storage.get_item(&self.key).ok().flatten()
    }
}
