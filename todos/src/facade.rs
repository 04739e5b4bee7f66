//! Request-response facade over the application store.
//!
//! UI code calls plain async methods on [`TodoApp`]. Each method sends a
//! command to the [`Store`] and, for asynchronous operations, waits for the
//! result action the command's effect feeds back. Failures are returned to
//! the caller and also recorded in state.

use crate::api::{RemoteTodoClient, TodoApi};
use crate::app::{AppAction, AppEnvironment, AppReducer, AppState};
use crate::auth::{AuthAction, AuthEnvironment, AuthState, Credentials, User};
use crate::config::Config;
use crate::error::{AuthError, TodoError};
use crate::file_store::FileStore;
use crate::reducer::TodosEnvironment;
use crate::types::{Filter, RequestId, Todo, TodoAction, TodoId, TodosState};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use todo_sync_core::environment::{Clock, SystemClock};
use todo_sync_core::storage::KeyValueStore;
use todo_sync_runtime::Store;

/// Default wait for a result action
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

/// Handle to the running application
///
/// Cheap to clone; clones share the same store.
///
/// # Example
///
/// ```no_run
/// use todos::{Config, TodoApp};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let app = TodoApp::from_config(&Config::from_env())?;
/// app.initialize_auth().await?;
/// app.login("user", "password").await?;
///
/// app.load().await?;
/// let todo = app.create("Buy milk", false).await?;
/// app.update(todo.toggled()).await?;
/// app.remove(todo.id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TodoApp {
    store: AppStore,
    next_request: Arc<AtomicU64>,
    timeout: Duration,
}

impl TodoApp {
    /// Creates an app over a prepared environment
    #[must_use]
    pub fn new(environment: AppEnvironment) -> Self {
        Self {
            store: Store::new(AppState::default(), AppReducer::new(), environment),
            next_request: Arc::new(AtomicU64::new(1)),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Creates an app from its external collaborators, mirroring disabled
    #[must_use]
    pub fn from_parts(
        storage: Arc<dyn KeyValueStore>,
        api: Arc<dyn TodoApi>,
        clock: &dyn Clock,
    ) -> Self {
        Self::new(AppEnvironment {
            auth: AuthEnvironment::new(Arc::clone(&storage)),
            todos: TodosEnvironment::new(storage, api, clock),
        })
    }

    /// Creates an app backed by a [`FileStore`] and a [`RemoteTodoClient`]
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Network`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, TodoError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data_dir));
        let api = RemoteTodoClient::with_timeout(&config.api_base_url, config.http_timeout())?;

        let environment = AppEnvironment {
            auth: AuthEnvironment::new(Arc::clone(&storage)),
            todos: TodosEnvironment::new(storage, Arc::new(api), &SystemClock)
                .with_remote_sync(config.remote_sync),
        };

        Ok(Self::new(environment).with_timeout(config.operation_timeout()))
    }

    /// Set how long operations wait for their result
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_id(&self) -> RequestId {
        self.next_request.fetch_add(1, Ordering::Relaxed)
    }

    /// Send a todo mutation and wait for the result carrying its request id
    async fn mutate(
        &self,
        request_id: RequestId,
        action: TodoAction,
    ) -> Result<TodoAction, TodoError> {
        let result = self
            .store
            .send_and_wait_for(
                AppAction::Todos(action),
                |a| matches!(a, AppAction::Todos(t) if t.result_for() == Some(request_id)),
                self.timeout,
            )
            .await?;

        match result {
            AppAction::Todos(TodoAction::MutationFailed { error, .. }) => Err(error),
            AppAction::Todos(action) => Ok(action),
            AppAction::Auth(_) => Err(TodoError::Store("unexpected auth result".to_string())),
        }
    }

    // ========== Todos ==========

    /// Load the collection, seeding it from the remote API if local storage is empty
    ///
    /// # Errors
    ///
    /// Returns the storage or network failure that aborted the load.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<Todo>, TodoError> {
        let result = self
            .store
            .send_and_wait_for(
                AppAction::Todos(TodoAction::Load),
                |a| matches!(a, AppAction::Todos(t) if t.ends_load()),
                self.timeout,
            )
            .await?;

        if let AppAction::Todos(TodoAction::LoadFailed { error }) = result {
            return Err(error);
        }
        Ok(self.store.state(|s| s.todos.items.clone()).await)
    }

    /// Append a todo; the title is stored as given
    ///
    /// # Errors
    ///
    /// Returns the storage failure that prevented persisting it, or
    /// [`TodoError::IdsExhausted`] if no new id can be assigned.
    #[tracing::instrument(skip(self, title))]
    pub async fn create(&self, title: impl Into<String>, completed: bool) -> Result<Todo, TodoError> {
        let request_id = self.request_id();
        let action = TodoAction::Create {
            request_id,
            title: title.into(),
            completed,
        };

        match self.mutate(request_id, action).await? {
            TodoAction::Created { todo, .. } => Ok(todo),
            other => Err(unexpected(&other)),
        }
    }

    /// Replace the todo with the same id; a missing id is a no-op
    ///
    /// # Errors
    ///
    /// Returns the storage failure that prevented persisting it.
    #[tracing::instrument(skip(self, todo), fields(id = todo.id))]
    pub async fn update(&self, todo: Todo) -> Result<Todo, TodoError> {
        let request_id = self.request_id();

        match self.mutate(request_id, TodoAction::Update { request_id, todo }).await? {
            TodoAction::Updated { todo, .. } => Ok(todo),
            other => Err(unexpected(&other)),
        }
    }

    /// Remove a todo; removing a missing id succeeds
    ///
    /// # Errors
    ///
    /// Returns the storage failure that prevented persisting the removal.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: TodoId) -> Result<TodoId, TodoError> {
        let request_id = self.request_id();

        match self.mutate(request_id, TodoAction::Remove { request_id, id }).await? {
            TodoAction::Removed { id, .. } => Ok(id),
            other => Err(unexpected(&other)),
        }
    }

    /// Set the search query
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if the store is shutting down.
    pub async fn set_search_query(&self, query: impl Into<String>) -> Result<(), TodoError> {
        self.store
            .send(AppAction::Todos(TodoAction::SetSearchQuery { query: query.into() }))
            .await?;
        Ok(())
    }

    /// Set the completion filter
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if the store is shutting down.
    pub async fn set_filter(&self, filter: Filter) -> Result<(), TodoError> {
        self.store
            .send(AppAction::Todos(TodoAction::SetFilter { filter }))
            .await?;
        Ok(())
    }

    /// Snapshot of the todo list
    pub async fn todos(&self) -> TodosState {
        self.store.state(|s| s.todos.clone()).await
    }

    /// The todos matching the current search query and filter
    pub async fn visible(&self) -> Vec<Todo> {
        self.store
            .state(|s| s.todos.visible().cloned().collect())
            .await
    }

    // ========== Auth ==========

    /// Adopt the persisted session, if any
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if no result arrives in time.
    pub async fn initialize_auth(&self) -> Result<AuthState, AuthError> {
        let result = self
            .store
            .send_and_wait_for(
                AppAction::Auth(AuthAction::Initialize),
                |a| matches!(a, AppAction::Auth(AuthAction::Initialized { .. })),
                self.timeout,
            )
            .await?;

        match result {
            AppAction::Auth(AuthAction::Initialized { session }) => Ok(session),
            _ => Err(AuthError::Store("unexpected result".to_string())),
        }
    }

    /// Sign in with the fixed credential pair
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on a mismatch.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let credentials = Credentials::new(username, password);
        let result = self
            .store
            .send_and_wait_for(
                AppAction::Auth(AuthAction::Login { credentials }),
                |a| {
                    matches!(
                        a,
                        AppAction::Auth(AuthAction::LoggedIn { .. } | AuthAction::LoginRejected { .. })
                    )
                },
                self.timeout,
            )
            .await?;

        match result {
            AppAction::Auth(AuthAction::LoggedIn { user }) => Ok(user),
            AppAction::Auth(AuthAction::LoginRejected { error }) => Err(error),
            _ => Err(AuthError::Store("unexpected result".to_string())),
        }
    }

    /// Sign out and forget the persisted session
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if no result arrives in time.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store
            .send_and_wait_for(
                AppAction::Auth(AuthAction::Logout),
                |a| matches!(a, AppAction::Auth(AuthAction::LoggedOut)),
                self.timeout,
            )
            .await?;
        Ok(())
    }

    /// Snapshot of the login gate
    pub async fn auth(&self) -> AuthState {
        self.store.state(|s| s.auth.clone()).await
    }

    /// Stop accepting commands and wait for in-flight effects
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if effects are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), TodoError> {
        self.store.shutdown(timeout).await?;
        Ok(())
    }
}

impl std::fmt::Debug for TodoApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoApp")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn unexpected(action: &TodoAction) -> TodoError {
    TodoError::Store(format!("unexpected result action: {action:?}"))
}
