//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of [`Todo`] items mirrored to local
//! storage. The reducer in [`crate::reducer`] is the only code that mutates
//! [`TodosState`]; everything here is plain data plus a few read helpers.

use crate::error::TodoError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a todo item
///
/// Unique within a collection. Minted by [`crate::ids::IdGenerator`].
pub type TodoId = i64;

/// Correlates a mutating command with the result action its effect produces
pub type RequestId = u64;

/// Owner tag given to todos created locally
pub const LOCAL_OWNER_TAG: i64 = 1;

/// Longest title accepted by [`validate_title`], in characters
pub const MAX_TITLE_LEN: usize = 500;

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Display title
    pub title: String,
    /// Whether the todo is done
    pub completed: bool,
    /// Carried through from the seed source, not interpreted
    pub owner_tag: i64,
}

impl Todo {
    /// Creates a todo owned by the local user
    #[must_use]
    pub fn new(id: TodoId, title: impl Into<String>, completed: bool) -> Self {
        Self {
            id,
            title: title.into(),
            completed,
            owner_tag: LOCAL_OWNER_TAG,
        }
    }

    /// Returns a copy with the completion flag flipped
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Trim a user-entered title and reject empty or oversized ones
///
/// The reducer stores whatever title it is given, so front ends call this
/// before sending `Create` or `Update`.
///
/// # Errors
///
/// Returns [`TodoError::Validation`] if the trimmed title is empty or longer
/// than [`MAX_TITLE_LEN`] characters.
pub fn validate_title(title: &str) -> Result<String, TodoError> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(TodoError::Validation("Todo title cannot be empty".to_string()));
    }

    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(TodoError::Validation(format!(
            "Todo title too long (max {MAX_TITLE_LEN} characters)"
        )));
    }

    Ok(trimmed.to_string())
}

/// Status of the last load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Nothing has been loaded yet
    #[default]
    Idle,
    /// A load is in flight
    Loading,
    /// The collection is loaded
    Succeeded,
    /// The last load or mutation failed, see `TodosState::error`
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Which todos the view shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every todo
    #[default]
    All,
    /// Only completed todos
    Completed,
    /// Only open todos
    Incomplete,
}

impl Filter {
    /// Whether a todo with the given completion flag passes this filter
    #[must_use]
    pub const fn matches(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Completed => completed,
            Self::Incomplete => !completed,
        }
    }
}

/// Where the collection is in its first-load protocol
///
/// `Empty → LoadingLocal → Ready`, or
/// `Empty → LoadingLocal → SeedingFromRemote → Ready` when local storage
/// holds nothing. A failed load returns to the phase it started from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitPhase {
    /// Never loaded
    #[default]
    Empty,
    /// Reading the persisted collection
    LoadingLocal,
    /// Local storage was empty, fetching the seed batch
    SeedingFromRemote,
    /// The collection has been adopted
    Ready,
}

impl InitPhase {
    /// Whether a load is in flight
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::LoadingLocal | Self::SeedingFromRemote)
    }
}

/// State of the todo list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodosState {
    /// The collection, in insertion order
    pub items: Vec<Todo>,
    /// Status of the last load
    pub status: Status,
    /// Message of the last failure
    pub error: Option<String>,
    /// Case-insensitive title filter
    pub search_query: String,
    /// Completion filter
    pub filter: Filter,
    /// First-load protocol phase
    pub phase: InitPhase,
    /// Phase to return to if the in-flight load fails
    pub(crate) resume_phase: Option<InitPhase>,
}

impl TodosState {
    /// Creates an empty, idle state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|t| t.completed).count()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.items.iter().find(|t| t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    /// The todos matching the current search query and filter
    pub fn visible(&self) -> impl Iterator<Item = &Todo> + Clone + '_ {
        crate::view::visible_todos(&self.items, &self.search_query, self.filter)
    }
}

/// Actions for the todo list
///
/// Commands come from the UI. Result actions are produced by effects and fed
/// back through the Store; mutation results carry the `request_id` of the
/// command that started them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Load the persisted collection, seeding it from the remote API if empty
    Load,

    /// Append a new todo
    Create {
        /// Correlation id echoed by the result
        request_id: RequestId,
        /// Title, already validated by the caller
        title: String,
        /// Initial completion flag
        completed: bool,
    },

    /// Replace the todo with the same id
    Update {
        /// Correlation id echoed by the result
        request_id: RequestId,
        /// Full replacement record
        todo: Todo,
    },

    /// Remove a todo by id
    Remove {
        /// Correlation id echoed by the result
        request_id: RequestId,
        /// Todo to remove
        id: TodoId,
    },

    /// Set the search query
    SetSearchQuery {
        /// New query
        query: String,
    },

    /// Set the completion filter
    SetFilter {
        /// New filter
        filter: Filter,
    },

    // ========== Results ==========
    /// The persisted collection was read
    LocalLoaded {
        /// Persisted items, empty if nothing was stored
        items: Vec<Todo>,
    },

    /// The seed batch was fetched and persisted
    Seeded {
        /// The persisted collection
        items: Vec<Todo>,
    },

    /// Reading storage or fetching the seed batch failed
    LoadFailed {
        /// What went wrong
        error: TodoError,
    },

    /// A todo was persisted
    Created {
        /// Correlation id of the `Create` command
        request_id: RequestId,
        /// The new todo
        todo: Todo,
    },

    /// A replacement was persisted
    Updated {
        /// Correlation id of the `Update` command
        request_id: RequestId,
        /// The replacement record
        todo: Todo,
    },

    /// A removal was persisted
    Removed {
        /// Correlation id of the `Remove` command
        request_id: RequestId,
        /// The removed id
        id: TodoId,
    },

    /// A create, update or remove failed before touching the collection
    MutationFailed {
        /// Correlation id of the failed command
        request_id: RequestId,
        /// What went wrong
        error: TodoError,
    },
}

impl TodoAction {
    /// The correlation id of a mutation result, if this is one
    #[must_use]
    pub const fn result_for(&self) -> Option<RequestId> {
        match self {
            Self::Created { request_id, .. }
            | Self::Updated { request_id, .. }
            | Self::Removed { request_id, .. }
            | Self::MutationFailed { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    /// Whether this action ends a load
    ///
    /// `LocalLoaded` only ends a load when it did not trigger seeding.
    #[must_use]
    pub fn ends_load(&self) -> bool {
        match self {
            Self::LocalLoaded { items } => !crate::seed::needs_seed(items),
            Self::Seeded { .. } | Self::LoadFailed { .. } => true,
            _ => false,
        }
    }
}
