//! Reducer logic for the todo list.
//!
//! Commands that touch storage return a single `Future` effect. The effect
//! performs the read-modify-write through [`TodoStorage`], optionally mirrors
//! the change to the remote collection, and feeds back a result action. The
//! in-memory collection only changes when that result action is reduced, so
//! persistence always completes first.

use crate::api::{RemoteTodo, TodoApi};
use crate::error::TodoError;
use crate::ids::IdGenerator;
use crate::seed;
use crate::storage::TodoStorage;
use crate::types::{InitPhase, Status, Todo, TodoAction, TodosState};
use std::sync::Arc;
use todo_sync_core::{
    async_effect, effect::Effect, environment::Clock, reducer::Reducer, storage::KeyValueStore,
    SmallVec, smallvec,
};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodosEnvironment {
    /// Persisted collection
    pub storage: TodoStorage,
    /// Remote collection, used for seeding and mirroring
    pub api: Arc<dyn TodoApi>,
    /// Id source for new todos
    pub ids: Arc<IdGenerator>,
    /// Mirror create/update/remove to the remote collection
    pub remote_sync: bool,
}

impl TodosEnvironment {
    /// Creates an environment with mirroring disabled
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, api: Arc<dyn TodoApi>, clock: &dyn Clock) -> Self {
        Self {
            storage: TodoStorage::new(store),
            api,
            ids: Arc::new(IdGenerator::from_clock(clock)),
            remote_sync: false,
        }
    }

    /// Enable or disable remote mirroring
    #[must_use]
    pub const fn with_remote_sync(mut self, enabled: bool) -> Self {
        self.remote_sync = enabled;
        self
    }
}

impl std::fmt::Debug for TodosEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodosEnvironment")
            .field("remote_sync", &self.remote_sync)
            .finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodosReducer;

impl TodosReducer {
    /// Creates a new `TodosReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Adopt a loaded collection
    fn adopt(state: &mut TodosState, items: Vec<Todo>) {
        state.items = items;
        state.status = Status::Succeeded;
        state.error = None;
        state.phase = InitPhase::Ready;
        state.resume_phase = None;
    }

    fn record_failure(state: &mut TodosState, error: &TodoError) {
        state.status = Status::Failed;
        state.error = Some(error.to_string());
    }

    fn read_local(env: &TodosEnvironment) -> Effect<TodoAction> {
        let storage = env.storage.clone();
        async_effect! {
            match storage.read_all().await {
                Ok(items) => Some(TodoAction::LocalLoaded { items }),
                Err(error) => Some(TodoAction::LoadFailed { error: error.into() }),
            }
        }
    }

    fn seed_from_remote(env: &TodosEnvironment) -> Effect<TodoAction> {
        let storage = env.storage.clone();
        let api = Arc::clone(&env.api);
        async_effect! {
            match fetch_seed(api.as_ref(), &storage).await {
                Ok(items) => Some(TodoAction::Seeded { items }),
                Err(error) => Some(TodoAction::LoadFailed { error }),
            }
        }
    }
}

/// Fetch the seed batch and persist it, returning the persisted collection
async fn fetch_seed(api: &dyn TodoApi, storage: &TodoStorage) -> Result<Vec<Todo>, TodoError> {
    let batch = seed::remap(api.fetch_all().await?);

    // A create may have landed since the empty read; keep it.
    let items = storage
        .modify(move |items| {
            if seed::needs_seed(items) {
                *items = batch;
            }
            items.clone()
        })
        .await?;

    Ok(items)
}

/// Log a failed mirror call; mirroring never fails the local operation
fn report_mirror<T>(operation: &'static str, id: i64, result: Result<T, crate::error::ApiError>) {
    match result {
        Ok(_) => tracing::debug!(operation, id, "mirrored change to remote collection"),
        Err(error) => {
            metrics::counter!("todos.mirror.failed", "operation" => operation).increment(1);
            tracing::warn!(operation, id, error = %error, "failed to mirror change to remote collection");
        },
    }
}

impl Reducer for TodosReducer {
    type State = TodosState;
    type Action = TodoAction;
    type Environment = TodosEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action, each short
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::Load => {
                if state.phase.is_loading() {
                    tracing::debug!(phase = ?state.phase, "load already in flight");
                    return SmallVec::new();
                }

                state.resume_phase = Some(state.phase);
                state.phase = InitPhase::LoadingLocal;
                state.status = Status::Loading;
                smallvec![Self::read_local(env)]
            },

            TodoAction::Create {
                request_id,
                title,
                completed,
            } => {
                let storage = env.storage.clone();
                let ids = Arc::clone(&env.ids);
                let api = Arc::clone(&env.api);
                let mirror = env.remote_sync;

                smallvec![async_effect! {
                    let persisted = storage
                        .modify(move |items| {
                            let todo = Todo::new(ids.next_unused(items)?, title, completed);
                            items.push(todo.clone());
                            Some(todo)
                        })
                        .await
                        .map_err(TodoError::from)
                        .and_then(|todo| todo.ok_or(TodoError::IdsExhausted));

                    match persisted {
                        Ok(todo) => {
                            if mirror {
                                // The remote id is discarded; the local id stays authoritative.
                                report_mirror("create", todo.id, api.create(&RemoteTodo::from(&todo)).await);
                            }
                            Some(TodoAction::Created { request_id, todo })
                        },
                        Err(error) => Some(TodoAction::MutationFailed { request_id, error }),
                    }
                }]
            },

            TodoAction::Update { request_id, todo } => {
                let storage = env.storage.clone();
                let api = Arc::clone(&env.api);
                let mirror = env.remote_sync;

                smallvec![async_effect! {
                    let replacement = todo.clone();
                    let persisted = storage
                        .modify(move |items| {
                            if let Some(slot) = items.iter_mut().find(|t| t.id == replacement.id) {
                                *slot = replacement;
                            }
                        })
                        .await;

                    match persisted {
                        Ok(()) => {
                            if mirror {
                                report_mirror("update", todo.id, api.replace(&RemoteTodo::from(&todo)).await);
                            }
                            Some(TodoAction::Updated { request_id, todo })
                        },
                        Err(error) => Some(TodoAction::MutationFailed {
                            request_id,
                            error: error.into(),
                        }),
                    }
                }]
            },

            TodoAction::Remove { request_id, id } => {
                let storage = env.storage.clone();
                let api = Arc::clone(&env.api);
                let mirror = env.remote_sync;

                smallvec![async_effect! {
                    let persisted = storage.modify(move |items| items.retain(|t| t.id != id)).await;

                    match persisted {
                        Ok(()) => {
                            if mirror {
                                report_mirror("remove", id, api.delete(id).await);
                            }
                            Some(TodoAction::Removed { request_id, id })
                        },
                        Err(error) => Some(TodoAction::MutationFailed {
                            request_id,
                            error: error.into(),
                        }),
                    }
                }]
            },

            TodoAction::SetSearchQuery { query } => {
                state.search_query = query;
                SmallVec::new()
            },

            TodoAction::SetFilter { filter } => {
                state.filter = filter;
                SmallVec::new()
            },

            // ========== Results ==========
            TodoAction::LocalLoaded { items } => {
                env.ids.observe_all(&items);

                if seed::needs_seed(&items) {
                    tracing::debug!("local storage empty, seeding from remote");
                    state.phase = InitPhase::SeedingFromRemote;
                    return smallvec![Self::seed_from_remote(env)];
                }

                tracing::info!(count = items.len(), "loaded todos from local storage");
                metrics::counter!("todos.load.completed", "source" => "local").increment(1);
                Self::adopt(state, items);
                SmallVec::new()
            },

            TodoAction::Seeded { items } => {
                env.ids.observe_all(&items);
                tracing::info!(count = items.len(), "seeded todos from remote collection");
                metrics::counter!("todos.load.completed", "source" => "remote").increment(1);
                Self::adopt(state, items);
                SmallVec::new()
            },

            TodoAction::LoadFailed { error } => {
                tracing::warn!(error = %error, "failed to load todos");
                metrics::counter!("todos.load.failed").increment(1);
                Self::record_failure(state, &error);
                if let Some(phase) = state.resume_phase.take() {
                    state.phase = phase;
                }
                SmallVec::new()
            },

            TodoAction::Created { todo, .. } => {
                tracing::debug!(id = todo.id, "todo created");
                match state.items.iter_mut().find(|t| t.id == todo.id) {
                    // A reload may already have picked up the persisted item
                    Some(existing) => *existing = todo,
                    None => state.items.push(todo),
                }
                SmallVec::new()
            },

            TodoAction::Updated { todo, .. } => {
                tracing::debug!(id = todo.id, "todo updated");
                if let Some(existing) = state.items.iter_mut().find(|t| t.id == todo.id) {
                    *existing = todo;
                }
                SmallVec::new()
            },

            TodoAction::Removed { id, .. } => {
                tracing::debug!(id, "todo removed");
                state.items.retain(|t| t.id != id);
                SmallVec::new()
            },

            TodoAction::MutationFailed { request_id, error } => {
                tracing::warn!(request_id, error = %error, "todo mutation failed");
                Self::record_failure(state, &error);
                SmallVec::new()
            },
        }
    }
}
