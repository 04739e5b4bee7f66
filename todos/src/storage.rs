//! Persisted todo collection.
//!
//! The whole collection lives as one JSON array under [`TODOS_KEY`]. Every
//! mutation re-reads it, changes it and writes it back while holding a
//! single async mutex, so concurrent mutations cannot lose each other's
//! writes.

use crate::types::Todo;
use std::sync::Arc;
use todo_sync_core::storage::{self, KeyValueStore, StorageError};
use tokio::sync::Mutex;

/// Storage key of the todo collection
pub const TODOS_KEY: &str = "todos";

/// Serialized access to the persisted todo collection
///
/// Clones share the same backend and the same lock.
#[derive(Clone)]
pub struct TodoStorage {
    store: Arc<dyn KeyValueStore>,
    lock: Arc<Mutex<()>>,
}

impl TodoStorage {
    /// Wrap a key-value backend
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read the persisted collection, empty if nothing is stored
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails or holds invalid JSON.
    pub async fn read_all(&self) -> Result<Vec<Todo>, StorageError> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Read, change and write back the persisted collection as one step
    ///
    /// `f` sees the freshly read collection and its changes are persisted.
    /// Nothing is written if the read fails.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if reading or writing fails.
    pub async fn modify<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Vec<Todo>) -> T + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;
        let mut items = self.read_unlocked().await?;
        let output = f(&mut items);
        storage::save_json(self.store.as_ref(), TODOS_KEY, &items).await?;
        tracing::trace!(count = items.len(), "persisted todo collection");
        Ok(output)
    }

    async fn read_unlocked(&self) -> Result<Vec<Todo>, StorageError> {
        Ok(storage::load_json(self.store.as_ref(), TODOS_KEY)
            .await?
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for TodoStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStorage").finish_non_exhaustive()
    }
}
