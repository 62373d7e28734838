//! Persistence
//!
//! The cart is stored as a single JSON document in a key-value slot. Writes
//! happen after every mutation and are fire-and-forget: a failed write is
//! logged, never surfaced as a failed transition. A slot that cannot be read
//! or parsed at startup is treated as "no prior cart".

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::cart::CartState;

/// Key the cart is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "wanderkart.cart";

/// Errors raised by storage backends and (de)serialisation.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// IO error reading or writing a slot
    #[error("Storage IO error: {0}")]
    Io(#[from] io::Error),

    /// The stored document is not a valid cart
    #[error("Malformed cart document: {0}")]
    Json(#[from] serde_json::Error),

    /// The key cannot be used as a slot name
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A string key-value store.
pub trait CartStorage {
    /// Read a slot, `None` if it has never been written.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Overwrite a slot.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the backend cannot be written.
    fn save(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Delete a slot. Deleting a missing slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// Storage held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: FxHashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.slots.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.slots.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.slots.remove(key);

        Ok(())
    }
}

/// Storage in a directory, one `<key>.json` file per slot.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use the given directory. It is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slots.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_'))
            && !key.starts_with('.');

        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.slot_path(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.slot_path(key)?;

        fs::create_dir_all(&self.dir)?;

        // Write beside the slot then rename, so a crash never leaves half a document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.slot_path(key)?) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Binds a storage backend to the cart's slot.
#[derive(Debug, Clone)]
pub struct CartPersistence<S: CartStorage> {
    storage: S,
    key: String,
}

impl<S: CartStorage> CartPersistence<S> {
    /// Store the cart under [`DEFAULT_STORAGE_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Store the cart under a custom key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The slot key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the stored cart, with totals recalculated from its lines.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the slot cannot be read or holds a
    /// malformed document.
    pub fn try_restore(&self) -> Result<Option<CartState>, PersistenceError> {
        let Some(contents) = self.storage.load(&self.key)? else {
            return Ok(None);
        };

        let state: CartState = serde_json::from_str(&contents)?;

        Ok(Some(state.recalculated()))
    }

    /// Read the stored cart, falling back to `initial` when there is none or
    /// it cannot be used.
    pub fn restore_or(&self, initial: impl FnOnce() -> CartState) -> CartState {
        match self.try_restore() {
            Ok(Some(state)) => {
                debug!(key = %self.key, items = state.len(), "cart restored");
                state
            }
            Ok(None) => initial(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "discarding unreadable cart");
                initial()
            }
        }
    }

    /// Write the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the cart cannot be serialised or the
    /// slot cannot be written.
    pub fn try_persist(&mut self, state: &CartState) -> Result<(), PersistenceError> {
        let contents = serde_json::to_string(state)?;

        self.storage.save(&self.key, &contents)
    }

    /// Write the cart, logging instead of returning a failure.
    pub fn persist(&mut self, state: &CartState) {
        if let Err(err) = self.try_persist(state) {
            error!(key = %self.key, error = %err, "failed to persist cart");
        }
    }

    /// Delete the stored cart, logging on failure.
    pub fn forget(&mut self) {
        if let Err(err) = self.storage.remove(&self.key) {
            error!(key = %self.key, error = %err, "failed to delete stored cart");
        }
    }
}
