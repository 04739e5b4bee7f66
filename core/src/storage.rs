//! Durable key-value storage for on-device persistence.
//!
//! A [`KeyValueStore`] holds named blobs. Applications keep one serialized
//! document per key (for example the whole todo collection under `todos`)
//! and replace it wholesale on every write.
//!
//! # Implementations
//!
//! - `FileStore` (in the `todos` crate): one file per key in a data directory
//! - `InMemoryKeyValueStore` (in `todo-sync-testing`): fast, deterministic tests
//!
//! # Example
//!
//! ```no_run
//! use todo_sync_core::storage::{self, KeyValueStore, StorageError};
//!
//! async fn example(store: &dyn KeyValueStore) -> Result<(), StorageError> {
//!     storage::save_json(store, "greeting", &vec!["hello".to_string()]).await?;
//!     let loaded: Option<Vec<String>> = storage::load_json(store, "greeting").await?;
//!     assert_eq!(loaded, Some(vec!["hello".to_string()]));
//!     Ok(())
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`KeyValueStore`] methods.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Errors that can occur during storage operations.
///
/// Messages are kept as strings so the error is `Clone` and can travel
/// inside actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Underlying read or write failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The storage backend is not available.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Key-value storage abstraction for durable device storage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to be shared across effect tasks.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures so the store can be injected as
/// `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored under the key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read.
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Vec<u8>>>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be written.
    fn set<'a>(&'a self, key: &'a str, value: Vec<u8>) -> StorageFuture<'a, ()>;

    /// Remove the blob stored under `key`.
    ///
    /// Removing a key that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be written.
    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;
}

/// Read and decode the JSON document stored under `key`.
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if the stored bytes are not valid
/// JSON for `T`, or any error from the store itself.
pub async fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if encoding fails, or any error
/// from the store itself.
pub async fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(value)?;
    store.set(key, bytes).await
}
