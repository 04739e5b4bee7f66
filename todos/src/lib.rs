//! Todo list state core with local persistence and remote seeding.
//!
//! The application keeps one [`Store`](todo_sync_runtime::Store) holding two
//! slices: a login gate and a todo list. The todo list is persisted as a
//! single document in a [`KeyValueStore`](todo_sync_core::storage::KeyValueStore)
//! and, the first time local storage turns out empty, seeded with ten items
//! from a remote REST collection.
//!
//! It demonstrates:
//!
//! - Reducers that describe storage and network I/O as effects
//! - Serialized read-modify-write of the persisted collection
//! - Composing slice reducers under one root with `Effect::map`
//! - A request-response facade over the Store for UI code
//! - Testing with `ReducerTest`
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_sync_core::environment::SystemClock;
//! use todos::{FileStore, Filter, RemoteTodoClient, TodoApp};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = TodoApp::from_parts(
//!     Arc::new(FileStore::new(".todos")),
//!     Arc::new(RemoteTodoClient::new("https://jsonplaceholder.typicode.com")),
//!     &SystemClock,
//! );
//!
//! // First run seeds ten todos from the remote collection
//! let todos = app.load().await?;
//! println!("Loaded {} todos", todos.len());
//!
//! app.create("Buy milk", false).await?;
//! app.set_search_query("milk").await?;
//! app.set_filter(Filter::Incomplete).await?;
//!
//! for todo in app.visible().await {
//!     println!("[ ] {}", todo.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod facade;
pub mod file_store;
pub mod ids;
pub mod reducer;
pub mod seed;
pub mod storage;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use api::{RemoteTodo, RemoteTodoClient, TodoApi};
pub use app::{AppAction, AppEnvironment, AppReducer, AppState};
pub use auth::{AuthAction, AuthEnvironment, AuthReducer, AuthState, Credentials, User};
pub use config::Config;
pub use error::{ApiError, AuthError, TodoError};
pub use facade::TodoApp;
pub use file_store::FileStore;
pub use reducer::{TodosEnvironment, TodosReducer};
pub use types::{Filter, InitPhase, Status, Todo, TodoAction, TodoId, TodosState, validate_title};
pub use view::visible_todos;
