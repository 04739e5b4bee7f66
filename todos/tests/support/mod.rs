//! Shared fixtures for the end-to-end tests.

#![allow(dead_code)] // Each test binary uses a different subset
#![allow(clippy::unwrap_used)] // Test code

use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo_sync_testing::{InMemoryKeyValueStore, test_clock};
use todos::{
    ApiError, AppEnvironment, AuthEnvironment, RemoteTodo, TodoApi, TodoApp, TodoId,
    TodosEnvironment,
};

/// Remote collection with scripted failures and a call log
#[derive(Default)]
pub struct ScriptedApi {
    items: Vec<RemoteTodo>,
    fail_fetch: AtomicBool,
    fail_writes: AtomicBool,
    fetches: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    /// A collection of `count` items with ids `1..=count` and throwaway titles
    pub fn with_items(count: i64) -> Self {
        Self {
            items: (1..=count)
                .map(|id| RemoteTodo {
                    id,
                    title: format!("remote placeholder {id}"),
                    completed: id % 3 == 0,
                    user_id: 1,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Write calls in order, as `"METHOD id"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_write(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                body: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

impl TodoApi for ScriptedApi {
    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<RemoteTodo>, ApiError>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(ApiError::RequestFailed("connection refused".to_string()));
            }
            Ok(self.items.clone())
        })
    }

    fn create<'a>(&'a self, todo: &'a RemoteTodo) -> BoxFuture<'a, Result<RemoteTodo, ApiError>> {
        Box::pin(async move {
            self.record_write(format!("POST {}", todo.id))?;
            // The placeholder API always answers with a fresh id
            Ok(RemoteTodo {
                id: 201,
                ..todo.clone()
            })
        })
    }

    fn replace<'a>(&'a self, todo: &'a RemoteTodo) -> BoxFuture<'a, Result<RemoteTodo, ApiError>> {
        Box::pin(async move {
            self.record_write(format!("PUT {}", todo.id))?;
            Ok(todo.clone())
        })
    }

    fn delete(&self, id: TodoId) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move { self.record_write(format!("DELETE {id}")) })
    }
}

/// App over in-memory storage and a scripted API, mirroring disabled
pub fn app(store: &InMemoryKeyValueStore, api: &Arc<ScriptedApi>) -> TodoApp {
    build(store, api, false)
}

/// App over in-memory storage and a scripted API, mirroring enabled
pub fn mirroring_app(store: &InMemoryKeyValueStore, api: &Arc<ScriptedApi>) -> TodoApp {
    build(store, api, true)
}

fn build(store: &InMemoryKeyValueStore, api: &Arc<ScriptedApi>, remote_sync: bool) -> TodoApp {
    let storage = Arc::new(store.clone());
    let environment = AppEnvironment {
        auth: AuthEnvironment::new(storage.clone()),
        todos: TodosEnvironment::new(storage, api.clone(), &test_clock())
            .with_remote_sync(remote_sync),
    };
    TodoApp::new(environment).with_timeout(Duration::from_secs(5))
}
