//! Remote todo collection client.
//!
//! [`TodoApi`] is the seam the reducer talks to; [`RemoteTodoClient`] is the
//! production implementation over `reqwest`.

use crate::error::ApiError;
use crate::types::{Todo, TodoId};
use futures::future::BoxFuture;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default remote collection
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// A todo as the remote collection represents it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTodo {
    /// Remote identifier
    pub id: TodoId,
    /// Title
    pub title: String,
    /// Completion flag
    pub completed: bool,
    /// Owning user on the remote side
    pub user_id: i64,
}

impl From<&Todo> for RemoteTodo {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            completed: todo.completed,
            user_id: todo.owner_tag,
        }
    }
}

impl From<RemoteTodo> for Todo {
    fn from(remote: RemoteTodo) -> Self {
        Self {
            id: remote.id,
            title: remote.title,
            completed: remote.completed,
            owner_tag: remote.user_id,
        }
    }
}

/// Remote todo collection
///
/// Methods return boxed futures so the API can be injected as
/// `Arc<dyn TodoApi>`.
pub trait TodoApi: Send + Sync {
    /// `GET /todos`
    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<RemoteTodo>, ApiError>>;

    /// `POST /todos`, returning the record the server echoes back
    fn create<'a>(&'a self, todo: &'a RemoteTodo) -> BoxFuture<'a, Result<RemoteTodo, ApiError>>;

    /// `PUT /todos/{id}`, returning the record the server echoes back
    fn replace<'a>(&'a self, todo: &'a RemoteTodo) -> BoxFuture<'a, Result<RemoteTodo, ApiError>>;

    /// `DELETE /todos/{id}`
    fn delete(&self, id: TodoId) -> BoxFuture<'_, Result<(), ApiError>>;
}

/// HTTP client for the remote todo collection
#[derive(Clone, Debug)]
pub struct RemoteTodoClient {
    client: Client,
    base_url: String,
}

impl RemoteTodoClient {
    /// Create a client with default `reqwest` settings
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize(base_url.into()),
        }
    }

    /// Create a client whose requests time out after `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] if the HTTP client cannot be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: normalize(base_url.into()),
        })
    }

    /// The base URL requests are made against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the whole collection
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-2xx statuses, or parsing failures
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_todos(&self) -> Result<Vec<RemoteTodo>, ApiError> {
        let response = self
            .client
            .get(format!("{}/todos", self.base_url))
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        decode(response).await
    }

    /// Create a todo remotely
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-2xx statuses, or parsing failures
    #[tracing::instrument(skip(self, todo), fields(id = todo.id))]
    pub async fn create_todo(&self, todo: &RemoteTodo) -> Result<RemoteTodo, ApiError> {
        let response = self
            .client
            .post(format!("{}/todos", self.base_url))
            .json(todo)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        decode(response).await
    }

    /// Replace a todo remotely
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-2xx statuses, or parsing failures
    #[tracing::instrument(skip(self, todo), fields(id = todo.id))]
    pub async fn replace_todo(&self, todo: &RemoteTodo) -> Result<RemoteTodo, ApiError> {
        let response = self
            .client
            .put(format!("{}/todos/{}", self.base_url, todo.id))
            .json(todo)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        decode(response).await
    }

    /// Delete a todo remotely
    ///
    /// # Errors
    ///
    /// Returns errors for network failures or non-2xx statuses
    #[tracing::instrument(skip(self))]
    pub async fn delete_todo(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(format!("{}/todos/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        check_status(response).await.map(drop)
    }
}

impl TodoApi for RemoteTodoClient {
    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<RemoteTodo>, ApiError>> {
        Box::pin(self.fetch_todos())
    }

    fn create<'a>(&'a self, todo: &'a RemoteTodo) -> BoxFuture<'a, Result<RemoteTodo, ApiError>> {
        Box::pin(self.create_todo(todo))
    }

    fn replace<'a>(&'a self, todo: &'a RemoteTodo) -> BoxFuture<'a, Result<RemoteTodo, ApiError>> {
        Box::pin(self.replace_todo(todo))
    }

    fn delete(&self, id: TodoId) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(self.delete_todo(id))
    }
}

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample(id: TodoId) -> RemoteTodo {
        RemoteTodo {
            id,
            title: "quis ut nam facilis".to_string(),
            completed: false,
            user_id: 1,
        }
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = RemoteTodoClient::new("http://localhost:1234/");
        assert_eq!(client.base_url(), "http://localhost:1234");
    }

    #[test]
    fn remote_wire_format_uses_user_id() {
        let json = serde_json::to_value(sample(3)).unwrap();
        assert_eq!(json["userId"], 1);
        assert!(json.get("ownerTag").is_none());
    }

    #[tokio::test]
    async fn fetch_all_parses_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![sample(1), sample(2)]))
            .expect(1)
            .mount(&server)
            .await;

        let client = RemoteTodoClient::new(server.uri());
        let todos = client.fetch_all().await.unwrap();

        assert_eq!(todos, vec![sample(1), sample(2)]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = RemoteTodoClient::new(server.uri());
        let error = client.fetch_all().await.unwrap_err();

        assert_eq!(
            error,
            ApiError::Status {
                status: 503,
                body: "maintenance".to_string()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"oops\":"))
            .mount(&server)
            .await;

        let client = RemoteTodoClient::new(server.uri());
        assert!(matches!(
            client.fetch_all().await,
            Err(ApiError::ResponseParseFailed(_))
        ));
    }

    #[tokio::test]
    async fn create_posts_json_body() {
        let server = MockServer::start().await;
        let todo = sample(42);
        Mock::given(method("POST"))
            .and(path("/todos"))
            .and(body_json(&todo))
            .respond_with(ResponseTemplate::new(201).set_body_json(sample(201)))
            .expect(1)
            .mount(&server)
            .await;

        let client = RemoteTodoClient::new(server.uri());
        let created = client.create(&todo).await.unwrap();

        assert_eq!(created.id, 201);
    }

    #[tokio::test]
    async fn replace_puts_to_item_path() {
        let server = MockServer::start().await;
        let mut todo = sample(7);
        todo.completed = true;
        Mock::given(method("PUT"))
            .and(path("/todos/7"))
            .and(body_json(&todo))
            .respond_with(ResponseTemplate::new(200).set_body_json(&todo))
            .expect(1)
            .mount(&server)
            .await;

        let client = RemoteTodoClient::new(server.uri());
        assert_eq!(client.replace(&todo).await.unwrap(), todo);
    }

    #[tokio::test]
    async fn delete_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/todos/9"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = RemoteTodoClient::new(server.uri());
        client.delete(9).await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_server_is_request_failure() {
        let client =
            RemoteTodoClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        assert!(matches!(
            client.fetch_all().await,
            Err(ApiError::RequestFailed(_))
        ));
    }
}
