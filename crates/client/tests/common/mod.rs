//! In-process mock of the chat REST API.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

pub const TOKEN: &str = "secret-token";

#[derive(Default)]
pub struct Backend {
    pub channels: Vec<Value>,
    pub messages: Vec<Value>,
    pub current_channel_id: Option<i64>,
    pub next_id: i64,
    /// Bodies received on `POST /api/v1/messages`.
    pub posted: Vec<Value>,
    /// `Authorization` headers seen, in order.
    pub auth_headers: Vec<Option<String>>,
    pub fail_messages: bool,
    /// Answer channel listing, rename and removal with a `200 OK` text body.
    pub plain_text: bool,
}

pub type Shared = Arc<Mutex<Backend>>;

pub struct MockServer {
    pub addr: SocketAddr,
    pub backend: Shared,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn backend(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.backend.lock().unwrap()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_server(backend: Backend) -> MockServer {
    let backend: Shared = Arc::new(Mutex::new(Backend {
        next_id: backend.next_id.max(100),
        ..backend
    }));

    let app = Router::new()
        .route("/api/v1/channels", get(list_channels).post(create_channel))
        .route("/api/v1/channels/{id}", patch(rename_channel).delete(remove_channel))
        .route("/api/v1/messages", get(list_messages).post(post_message))
        .route("/api/v1/login", post(login))
        .route("/api/v1/signup", post(signup))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        addr,
        backend,
        handle,
    }
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn authorized(backend: &Shared, headers: &HeaderMap) -> bool {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expected = format!("Bearer {TOKEN}");
    let ok = header.as_deref() == Some(expected.as_str());
    backend.lock().unwrap().auth_headers.push(header);
    ok
}

fn plain_ok() -> Response {
    (StatusCode::OK, "OK").into_response()
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response()
}

async fn list_channels(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&backend, &headers) {
        return unauthorized();
    }
    let b = backend.lock().unwrap();
    if b.plain_text {
        return plain_ok();
    }
    Json(json!({
        "channels": b.channels,
        "currentChannelId": b.current_channel_id,
    }))
    .into_response()
}

async fn list_messages(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&backend, &headers) {
        return unauthorized();
    }
    Json(Value::Array(backend.lock().unwrap().messages.clone())).into_response()
}

async fn post_message(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&backend, &headers) {
        return unauthorized();
    }
    let mut b = backend.lock().unwrap();
    if b.fail_messages {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "database down" })))
            .into_response();
    }
    b.next_id += 1;
    let id = b.next_id;
    let attributes = body["data"]["attributes"].clone();
    b.posted.push(body);
    b.messages.push(json!({
        "id": id,
        "body": attributes["body"],
        "channelId": attributes["channelId"],
        "username": attributes["username"],
    }));
    (
        StatusCode::CREATED,
        Json(json!({ "data": { "id": id, "type": "messages", "attributes": attributes } })),
    )
        .into_response()
}

async fn create_channel(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&backend, &headers) {
        return unauthorized();
    }
    let name = body["data"]["attributes"]["name"].clone();
    if name.as_str().is_some_and(|n| n == "general") {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "name taken" })))
            .into_response();
    }
    let mut b = backend.lock().unwrap();
    b.next_id += 1;
    let channel = json!({ "id": b.next_id, "name": name, "removable": true });
    b.channels.push(channel.clone());
    (StatusCode::CREATED, Json(channel)).into_response()
}

async fn rename_channel(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&backend, &headers) {
        return unauthorized();
    }
    if backend.lock().unwrap().plain_text {
        return plain_ok();
    }
    // Answer in document form to exercise the normalizer.
    Json(json!({ "data": { "id": id.to_string(), "attributes": { "name": body["name"] } } }))
        .into_response()
}

async fn remove_channel(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&backend, &headers) {
        return unauthorized();
    }
    if id == 404 {
        return StatusCode::NOT_FOUND.into_response();
    }
    let mut b = backend.lock().unwrap();
    b.channels.retain(|c| c["id"] != id);
    if b.plain_text {
        return plain_ok();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "ann" && body["password"] == "secret" {
        Json(json!({ "token": TOKEN, "username": "ann" })).into_response()
    } else {
        unauthorized()
    }
}

async fn signup(Json(body): Json<Value>) -> Response {
    match body["username"].as_str() {
        Some("taken") => (StatusCode::CONFLICT, Json(json!({ "message": "exists" }))).into_response(),
        Some("boom") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Some("bad") => StatusCode::BAD_REQUEST.into_response(),
        // No username in the reply: the client keeps the submitted one.
        _ => (StatusCode::CREATED, Json(json!({ "token": TOKEN }))).into_response(),
    }
}
