//! In-process transport that feeds requests straight into the mock server's
//! router, so core tests exercise the real HTTP contract without sockets.

use axum::{http::Request, Router};
use http_body_util::BodyExt;
use mock_server::{router, ServerState};
use todo_core::{
    HttpRequest, HttpResponse, RemoteClient, SyncCore, Transport, TransportError, UserId,
};
use tower::ServiceExt;

pub const USER: UserId = 1;

pub struct RouterTransport {
    router: Router,
}

impl Transport for RouterTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(request.body.unwrap_or_default())
            .map_err(|e| TransportError::new(e.to_string()))?;

        let response = self.router.clone().oneshot(request).await.map_err(|never| match never {})?;
        let status = response.status().as_u16();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?
            .to_bytes();

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Seeds the server with `(title, completed)` records and returns a loaded core.
pub async fn loaded_core(seed: &[(&str, bool)]) -> (SyncCore<RouterTransport>, ServerState) {
    let state = ServerState::new();
    for &(title, completed) in seed {
        state.insert(title, completed, USER).await;
    }
    let core = unloaded_core(&state);
    core.load().await.unwrap();
    (core, state)
}

pub fn unloaded_core(state: &ServerState) -> SyncCore<RouterTransport> {
    let transport = RouterTransport {
        router: router(state.clone()),
    };
    SyncCore::new(RemoteClient::new("http://mock", transport), USER)
}

/// The server's records re-read through the wire format as core `Todo`s.
pub async fn server_todos(state: &ServerState) -> Vec<todo_core::Todo> {
    let json = serde_json::to_string(&state.todos().await).unwrap();
    serde_json::from_str(&json).unwrap()
}
