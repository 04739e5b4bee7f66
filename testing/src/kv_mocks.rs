//! In-memory key-value storage for tests
//!
//! [`InMemoryKeyValueStore`] is a `HashMap`-backed [`KeyValueStore`] with
//! switches for injecting read/write failures and artificial latency, and
//! counters for asserting how often the backend was touched.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only happens after a test already panicked

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use todo_sync_core::storage::{KeyValueStore, StorageError, StorageFuture};

/// In-memory key-value store for fast, deterministic testing.
///
/// Clones share the same underlying data, so a test can keep one handle for
/// assertions and hand another to the code under test.
///
/// # Example
///
/// ```
/// use todo_sync_testing::InMemoryKeyValueStore;
/// use todo_sync_core::storage::KeyValueStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryKeyValueStore::new();
/// store.set("todos", b"[]".to_vec()).await?;
/// assert!(store.contains_key("todos"));
///
/// store.fail_reads(true);
/// assert!(store.get("todos").await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryKeyValueStore {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    latency: Arc<Mutex<Option<Duration>>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryKeyValueStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail with [`StorageError::Unavailable`]
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set`/`remove` fail with [`StorageError::Unavailable`]
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay every operation by `latency` before it touches the data
    ///
    /// Useful for widening race windows in concurrency tests.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Store raw bytes directly, bypassing failure injection and counters
    pub fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.data.write().unwrap().insert(key.to_string(), value.into());
    }

    /// Read raw bytes directly, bypassing failure injection and counters
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        self.data.read().unwrap().get(key).cloned()
    }

    /// Clear all data (for test isolation)
    pub fn clear(&self) {
        self.data.write().unwrap().clear();
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().unwrap().is_empty()
    }

    /// Check if a key exists in the store
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.read().unwrap().contains_key(key)
    }

    /// Number of `get` calls made so far (including failed ones)
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `set`/`remove` calls made so far (including failed ones)
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Vec<u8>>> {
        Box::pin(async move {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("injected read failure".to_string()));
            }
            Ok(self.data.read().unwrap().get(key).cloned())
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: Vec<u8>) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;
            self.check_writable()?;
            self.data.write().unwrap().insert(key.to_string(), value);
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;
            self.check_writable()?;
            self.data.write().unwrap().remove(key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrips() {
        let store = InMemoryKeyValueStore::new();
        tokio_test::block_on(async {
            store.set("auth", b"{}".to_vec()).await.unwrap();
            assert_eq!(store.get("auth").await.unwrap(), Some(b"{}".to_vec()));
        });
        assert_eq!(store.read_count(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn clones_share_data() {
        let store = InMemoryKeyValueStore::new();
        let handle = store.clone();
        store.insert_raw("todos", "[]");
        assert!(handle.contains_key("todos"));
        assert_eq!(handle.len(), 1);
    }

    #[test]
    fn injected_failures_surface_as_unavailable() {
        let store = InMemoryKeyValueStore::new();
        store.fail_reads(true);
        store.fail_writes(true);

        tokio_test::block_on(async {
            assert!(matches!(store.get("todos").await, Err(StorageError::Unavailable(_))));
            assert!(matches!(
                store.set("todos", Vec::new()).await,
                Err(StorageError::Unavailable(_))
            ));
            assert!(matches!(store.remove("todos").await, Err(StorageError::Unavailable(_))));
        });
        assert!(store.is_empty());
    }

    #[test]
    fn remove_missing_key_succeeds() {
        let store = InMemoryKeyValueStore::new();
        tokio_test::block_on(async {
            store.remove("missing").await.unwrap();
        });
    }
}
