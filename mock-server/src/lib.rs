use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub type TodoId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
}

#[derive(Default)]
struct Faults {
    ids: HashSet<TodoId>,
    delays: HashMap<TodoId, Duration>,
    create: bool,
    list: bool,
}

#[derive(Default)]
struct Store {
    todos: BTreeMap<TodoId, Todo>,
    last_id: TodoId,
    faults: Faults,
}

/// Shared server state: the records, injected faults and a request counter.
///
/// Cloning is cheap; every clone sees the same store, so tests keep a handle
/// to seed records and break things while the router is serving.
#[derive(Clone, Default)]
pub struct ServerState {
    store: Arc<RwLock<Store>>,
    requests: Arc<AtomicUsize>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record directly, assigning the next id.
    pub async fn insert(&self, title: &str, completed: bool, user_id: u64) -> Todo {
        let mut store = self.store.write().await;
        store.last_id += 1;
        let todo = Todo {
            id: store.last_id,
            title: title.to_string(),
            completed,
            user_id,
        };
        store.todos.insert(todo.id, todo.clone());
        todo
    }

    pub async fn todos(&self) -> Vec<Todo> {
        self.store.read().await.todos.values().cloned().collect()
    }

    /// Answers 500 to every request addressing `id`.
    pub async fn fail_id(&self, id: TodoId) {
        self.store.write().await.faults.ids.insert(id);
    }

    /// Holds every update or delete of `id` for an extra `delay`.
    pub async fn slow_id(&self, id: TodoId, delay: Duration) {
        self.store.write().await.faults.delays.insert(id, delay);
    }

    pub async fn fail_creates(&self) {
        self.store.write().await.faults.create = true;
    }

    pub async fn fail_listing(&self) {
        self.store.write().await.faults.list = true;
    }

    /// Removes every injected fault.
    pub async fn heal(&self) {
        self.store.write().await.faults = Faults::default();
    }

    /// Number of requests the router has received.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

pub fn app() -> Router {
    router(ServerState::new())
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).patch(update_todo).delete(delete_todo))
        .layer(middleware::from_fn_with_state(state.clone(), count_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, ServerState::new()).await
}

pub async fn run_with_state(
    listener: TcpListener,
    state: ServerState,
) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

async fn count_requests(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

async fn list_todos(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Todo>>, StatusCode> {
    let store = state.store.read().await;
    if store.faults.list {
        warn!("injected list failure");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let todos = store
        .todos
        .values()
        .filter(|todo| params.user_id.is_none_or(|user_id| todo.user_id == user_id))
        .cloned()
        .collect();
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<ServerState>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), StatusCode> {
    let mut store = state.store.write().await;
    if store.faults.create {
        warn!("injected create failure");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    store.last_id += 1;
    let todo = Todo {
        id: store.last_id,
        title: input.title,
        completed: input.completed,
        user_id: input.user_id,
    };
    store.todos.insert(todo.id, todo.clone());
    info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(state): State<ServerState>,
    Path(id): Path<TodoId>,
) -> Result<Json<Todo>, StatusCode> {
    let store = state.store.read().await;
    check_fault(&store, id)?;
    store.todos.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_todo(
    State(state): State<ServerState>,
    Path(id): Path<TodoId>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    stall(&state, id).await;
    let mut store = state.store.write().await;
    check_fault(&store, id)?;
    let todo = store.todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    info!(id, "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(state): State<ServerState>,
    Path(id): Path<TodoId>,
) -> Result<StatusCode, StatusCode> {
    stall(&state, id).await;
    let mut store = state.store.write().await;
    check_fault(&store, id)?;
    store.todos.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    info!(id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}

async fn stall(state: &ServerState, id: TodoId) {
    let delay = state.store.read().await.faults.delays.get(&id).copied();
    if let Some(delay) = delay {
        warn!(id, ?delay, "injected latency");
        tokio::time::sleep(delay).await;
    }
}

fn check_fault(store: &Store, id: TodoId) -> Result<(), StatusCode> {
    if store.faults.ids.contains(&id) {
        warn!(id, "injected failure");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(())
}
