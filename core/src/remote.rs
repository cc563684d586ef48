//! Asynchronous remote client: build, wait, send, parse.
//!
//! Every call sleeps for `REQUEST_DELAY` before the transport fires. The
//! delay makes in-flight states observable, and tests rely on it.

use std::time::Duration;

use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::{ApiError, Operation, RemoteError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{CreateTodo, Todo, TodoId, UpdateTodo, UserId};

/// Fixed latency applied before every request. Not configurable.
pub const REQUEST_DELAY: Duration = Duration::from_millis(100);

/// CRUD access to the remote todo resource.
///
/// Failures of any kind collapse into `RemoteError`; the cause is logged.
#[derive(Debug, Clone)]
pub struct RemoteClient<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> RemoteClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: TodoClient::new(base_url),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch_all(&self, user_id: UserId) -> Result<Vec<Todo>, RemoteError> {
        settle(Operation::List, None, self.try_fetch_all(user_id).await)
    }

    pub async fn create(&self, input: &CreateTodo) -> Result<Todo, RemoteError> {
        settle(Operation::Create, None, self.try_create(input).await)
    }

    pub async fn update(&self, id: TodoId, input: &UpdateTodo) -> Result<Todo, RemoteError> {
        settle(Operation::Update, Some(id), self.try_update(id, input).await)
    }

    pub async fn delete(&self, id: TodoId) -> Result<(), RemoteError> {
        settle(Operation::Delete, Some(id), self.try_delete(id).await)
    }

    async fn try_fetch_all(&self, user_id: UserId) -> Result<Vec<Todo>, ApiError> {
        let response = self.send(self.client.build_list_todos(user_id)).await?;
        self.client.parse_list_todos(response)
    }

    async fn try_create(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.send(request).await?;
        self.client.parse_create_todo(response)
    }

    async fn try_update(&self, id: TodoId, input: &UpdateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, input)?;
        let response = self.send(request).await?;
        self.client.parse_update_todo(response)
    }

    async fn try_delete(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tokio::time::sleep(REQUEST_DELAY).await;
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

fn settle<R>(
    operation: Operation,
    id: Option<TodoId>,
    result: Result<R, ApiError>,
) -> Result<R, RemoteError> {
    result.map_err(|cause| {
        warn!(%operation, ?id, %cause, "remote request failed");
        RemoteError::new(operation)
    })
}
