//! Durable key-value storage for cart and account state.
//!
//! The storefront keeps two string slots: the cart under [`keys::CART`] and
//! the signed-in profile under [`keys::USER`]. Values are JSON text.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map, used in tests and for throwaway sessions
//! - [`FileStore`] - a single JSON object file, rewritten on every change

mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage slot names.
pub mod keys {
    /// Key for the JSON-encoded line item array.
    pub const CART: &str = "cart";

    /// Key for the JSON-encoded user profile.
    pub const USER: &str = "user";
}

/// Errors that can occur when reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored value (or the backing file itself) is not valid JSON of the expected shape.
    #[error("malformed stored data under '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded.
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A lock guarding the in-memory map was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string-keyed store that survives restarts.
///
/// Implementations use interior mutability so one handle can be shared by
/// the cart store and the account store.
pub trait KeyValueStore: Send + Sync {
    /// Load the raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a storage backend.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Load and decode the JSON value under `key`.
///
/// # Errors
///
/// Returns `StorageError::Parse` when the stored text does not decode as `T`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Parse {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` as JSON and store it under `key`, replacing any prior value.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the write fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_json_absent_key() {
        let store = MemoryStore::new();
        let value: Option<Vec<u32>> = load_json(&store, keys::CART).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_save_then_load_json() {
        let store = MemoryStore::new();
        save_json(&store, "numbers", &[1, 2, 3]).unwrap();
        let value: Option<Vec<u32>> = load_json(&store, "numbers").unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_load_json_malformed_is_parse_error() {
        let store = MemoryStore::new();
        store.set(keys::CART, "[{not json").unwrap();
        let err = load_json::<Vec<u32>>(&store, keys::CART).unwrap_err();
        assert!(matches!(err, StorageError::Parse { ref key, .. } if key == "cart"));
    }
}
