//! Login gate.
//!
//! The credential check is a fixed comparison, not a security model. A
//! successful login is persisted under [`AUTH_KEY`] so the session survives
//! restarts; persistence is best-effort and never blocks the in-memory
//! change.

use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use todo_sync_core::{
    async_effect, effect::Effect, reducer::Reducer, storage, storage::KeyValueStore, SmallVec,
    smallvec,
};

/// Storage key of the persisted session
pub const AUTH_KEY: &str = "auth";

/// Accepted username
pub const MOCK_USERNAME: &str = "user";
/// Accepted password
pub const MOCK_PASSWORD: &str = "password";
/// Email attached to the accepted user
pub const MOCK_EMAIL: &str = "user@example.com";
/// Token issued on login
pub const MOCK_TOKEN: &str = "mock-jwt-token";

/// The signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name
    pub username: String,
    /// Contact email
    pub email: String,
}

/// Session state, persisted as one record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    /// Whether a user is signed in
    pub is_authenticated: bool,
    /// Session token
    pub token: Option<String>,
    /// Signed-in user
    pub user: Option<User>,
}

/// Username and password as typed
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Bundle a username and password
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Check credentials against the fixed pair and build the session
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] on any mismatch.
pub fn authenticate(credentials: &Credentials) -> Result<AuthState, AuthError> {
    if credentials.username != MOCK_USERNAME || credentials.password != MOCK_PASSWORD {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(AuthState {
        is_authenticated: true,
        token: Some(MOCK_TOKEN.to_string()),
        user: Some(User {
            username: credentials.username.clone(),
            email: MOCK_EMAIL.to_string(),
        }),
    })
}

/// Actions for the login gate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthAction {
    /// Read the persisted session once at startup
    Initialize,
    /// Attempt to sign in
    Login {
        /// What the user typed
        credentials: Credentials,
    },
    /// Sign out and forget the persisted session
    Logout,

    /// The persisted session was read (default if absent or unreadable)
    Initialized {
        /// Session to adopt
        session: AuthState,
    },
    /// Sign-in succeeded and persistence was attempted
    LoggedIn {
        /// Signed-in user
        user: User,
    },
    /// Sign-in was refused
    LoginRejected {
        /// Why
        error: AuthError,
    },
    /// Sign-out finished and removal was attempted
    LoggedOut,
}

/// Environment dependencies for the auth reducer
#[derive(Clone)]
pub struct AuthEnvironment {
    /// Session persistence
    pub storage: Arc<dyn KeyValueStore>,
}

impl AuthEnvironment {
    /// Creates a new `AuthEnvironment`
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }
}

impl std::fmt::Debug for AuthEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the login gate
#[derive(Clone, Debug, Default)]
pub struct AuthReducer;

impl AuthReducer {
    /// Creates a new `AuthReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AuthAction::Initialize => {
                let store = Arc::clone(&env.storage);
                smallvec![async_effect! {
                    let session = match storage::load_json::<AuthState>(store.as_ref(), AUTH_KEY).await {
                        Ok(session) => session.unwrap_or_default(),
                        Err(error) => {
                            tracing::error!(error = %error, "failed to read persisted session");
                            AuthState::default()
                        },
                    };
                    Some(AuthAction::Initialized { session })
                }]
            },

            AuthAction::Login { credentials } => match authenticate(&credentials) {
                Ok(session) => {
                    let Some(user) = session.user.clone() else {
                        return SmallVec::new();
                    };
                    *state = session.clone();
                    tracing::info!(username = %user.username, "signed in");

                    let store = Arc::clone(&env.storage);
                    smallvec![async_effect! {
                        if let Err(error) = storage::save_json(store.as_ref(), AUTH_KEY, &session).await {
                            tracing::error!(error = %error, "failed to persist session");
                        }
                        Some(AuthAction::LoggedIn { user })
                    }]
                },
                Err(error) => {
                    tracing::debug!(username = %credentials.username, "sign-in refused");
                    smallvec![async_effect! { Some(AuthAction::LoginRejected { error }) }]
                },
            },

            AuthAction::Logout => {
                *state = AuthState::default();
                tracing::info!("signed out");

                let store = Arc::clone(&env.storage);
                smallvec![async_effect! {
                    if let Err(error) = store.remove(AUTH_KEY).await {
                        tracing::error!(error = %error, "failed to remove persisted session");
                    }
                    Some(AuthAction::LoggedOut)
                }]
            },

            AuthAction::Initialized { session } => {
                *state = session;
                SmallVec::new()
            },

            AuthAction::LoggedIn { .. } | AuthAction::LoginRejected { .. } | AuthAction::LoggedOut => {
                SmallVec::new()
            },
        }
    }
}
