use std::time::Duration;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, router, ServerState, Todo};
use tokio::time::Instant;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json; charset=UTF-8")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder().method(method).uri(uri).body(String::new()).unwrap()
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(empty_request("GET", "/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn list_todos_filters_by_user_in_creation_order() {
    let state = ServerState::new();
    state.insert("mine", false, 1).await;
    state.insert("theirs", false, 2).await;
    state.insert("also mine", true, 1).await;

    let resp = router(state).oneshot(empty_request("GET", "/todos?userId=1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["mine", "also mine"]);
}

#[tokio::test]
async fn injected_list_failure_returns_500() {
    let state = ServerState::new();
    state.fail_listing().await;

    let resp = router(state).oneshot(empty_request("GET", "/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201_with_assigned_id() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"title":"Buy milk","userId":4}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 1);
    assert_eq!(todo.title, "Buy milk");
    assert_eq!(todo.user_id, 4);
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_todo_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn injected_create_failure_stores_nothing() {
    let state = ServerState::new();
    state.fail_creates().await;

    let resp = router(state.clone())
        .oneshot(json_request("POST", "/todos", r#"{"title":"x","userId":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(state.todos().await.is_empty());
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found() {
    let resp = app().oneshot(empty_request("GET", "/todos/99")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_todo_bad_id_returns_400() {
    let resp = app().oneshot(empty_request("GET", "/todos/not-a-number")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app()
        .oneshot(json_request("PATCH", "/todos/99", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_is_not_routed() {
    let resp = app()
        .oneshot(json_request("PUT", "/todos/1", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn injected_id_failure_leaves_record_untouched() {
    let state = ServerState::new();
    let todo = state.insert("keep me", false, 1).await;
    state.fail_id(todo.id).await;

    let resp = router(state.clone())
        .oneshot(json_request("PATCH", &format!("/todos/{}", todo.id), r#"{"completed":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.todos().await, vec![todo]);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/todos/99")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn injected_latency_holds_the_delete() {
    let state = ServerState::new();
    let todo = state.insert("slow", false, 1).await;
    state.slow_id(todo.id, Duration::from_secs(2)).await;
    let started = Instant::now();

    let resp = router(state.clone())
        .oneshot(empty_request("DELETE", &format!("/todos/{}", todo.id)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(state.todos().await.is_empty());
}

// --- request counting ---

#[tokio::test]
async fn every_request_is_counted() {
    let state = ServerState::new();
    let app = router(state.clone());

    app.clone().oneshot(empty_request("GET", "/todos")).await.unwrap();
    app.oneshot(empty_request("DELETE", "/todos/1")).await.unwrap();

    assert_eq!(state.request_count(), 2);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todos", r#"{"title":"Walk dog","userId":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;
    let id = created.id;

    // update: only completed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &format!("/todos/{id}"), r#"{"completed":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog"); // unchanged
    assert!(updated.completed);

    // update: only title
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &format!("/todos/{id}"), r#"{"title":"Walk cat"}"#))
        .await
        .unwrap();
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert!(updated.completed); // unchanged from previous update

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Todo = body_json(resp).await;
    assert_eq!(fetched, updated);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // list after delete: empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos"))
        .await
        .unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}
