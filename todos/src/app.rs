//! Application root: one store, two slices.
//!
//! [`AppReducer`] routes each action to the slice reducer that owns it and
//! lifts the slice's effects back into [`AppAction`] with `Effect::map`.

use crate::auth::{AuthAction, AuthEnvironment, AuthReducer, AuthState};
use crate::reducer::{TodosEnvironment, TodosReducer};
use crate::types::{TodoAction, TodosState};
use todo_sync_core::{effect::Effect, reducer::Reducer, SmallVec};

/// Whole-application state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Login gate
    pub auth: AuthState,
    /// Todo list
    pub todos: TodosState,
}

/// Whole-application action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppAction {
    /// Routed to [`AuthReducer`]
    Auth(AuthAction),
    /// Routed to [`TodosReducer`]
    Todos(TodoAction),
}

/// Environment for both slices
#[derive(Clone, Debug)]
pub struct AppEnvironment {
    /// Login gate dependencies
    pub auth: AuthEnvironment,
    /// Todo list dependencies
    pub todos: TodosEnvironment,
}

/// Root reducer delegating to the slice reducers
#[derive(Clone, Debug, Default)]
pub struct AppReducer {
    auth: AuthReducer,
    todos: TodosReducer,
}

impl AppReducer {
    /// Creates a new `AppReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            auth: AuthReducer::new(),
            todos: TodosReducer::new(),
        }
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Auth(action) => self
                .auth
                .reduce(&mut state.auth, action, &env.auth)
                .into_iter()
                .map(|effect| effect.map(AppAction::Auth))
                .collect(),
            AppAction::Todos(action) => self
                .todos
                .reduce(&mut state.todos, action, &env.todos)
                .into_iter()
                .map(|effect| effect.map(AppAction::Todos))
                .collect(),
        }
    }
}
