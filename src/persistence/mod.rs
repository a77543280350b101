//! Key-value persistence
//!
//! The game only ever reads and writes whole values under a handful of
//! keys. Backends:
//! - `MemoryStore`: tests and storage-less environments
//! - `FileStore`: native, one JSON file per key
//! - `LocalStorageStore`: browser LocalStorage (wasm32 only)

use std::fmt;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;
pub mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;
pub use memory::MemoryStore;

/// Storage failure
#[derive(Debug)]
pub enum StoreError {
    /// Backend is missing or refused access (private browsing, no window)
    Unavailable(String),
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(why) => write!(f, "storage unavailable: {}", why),
            Self::Io(e) => write!(f, "storage io error: {}", e),
            Self::Serialize(e) => write!(f, "storage serialization error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unavailable(_) => None,
            Self::Io(e) => Some(e),
            Self::Serialize(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e)
    }
}

/// Whole-value string storage
pub trait KeyValueStore {
    /// `Ok(None)` when nothing has been stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Read and decode a JSON value; `None` when missing, unreadable or corrupt
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let json = match store.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Could not read '{}': {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding corrupt '{}': {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: serde::Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}
