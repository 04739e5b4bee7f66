//! Error types for the todo list, the HTTP client and the auth gate.

use thiserror::Error;
use todo_sync_core::storage::StorageError;
use todo_sync_runtime::StoreError;

/// Errors surfaced by todo operations
///
/// Cloneable so failures can travel inside result actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// Local storage could not be read or written
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The remote collection could not be reached or answered with an error
    #[error("Network error: {0}")]
    Network(String),

    /// Input was rejected before reaching the reducer
    #[error("Validation error: {0}")]
    Validation(String),

    /// Every todo id has been handed out
    #[error("No todo ids left to assign")]
    IdsExhausted,

    /// The Store rejected the action or no result arrived in time
    #[error("Store error: {0}")]
    Store(String),
}

impl From<ApiError> for TodoError {
    fn from(error: ApiError) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<StoreError> for TodoError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}

/// Errors that can occur when talking to the remote todo collection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server answered with a non-2xx status
    #[error("API error (status {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),
}

/// Errors surfaced by the auth gate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password did not match
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The Store rejected the action or no result arrived in time
    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}
