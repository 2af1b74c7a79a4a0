// Stub backend + analysis service served on an ephemeral port for integration tests.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use feed_client::domain::Post;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub const VALID_PASSWORD: &str = "secret";
pub const ISSUED_TOKEN: &str = "jwt-token";
pub const TAKEN_EMAIL: &str = "taken@example.com";
// Deleting this id answers with a plain-text 500.
pub const BROKEN_POST_ID: i64 = 999;

#[derive(Default)]
pub struct StubState {
    // Newest first, like the real backend's createdAt DESC ordering.
    pub posts: Vec<Post>,
    pub next_id: i64,
    // Authorization header of every request, in arrival order.
    pub auth_headers: Vec<Option<String>>,
    pub analyzed: Vec<String>,
    // Answer listings with only `content` and `totalPages`.
    pub bare_pages: bool,
}

pub type Shared = Arc<Mutex<StubState>>;

pub struct Stub {
    pub base_url: String,
    pub state: Shared,
}

impl Stub {
    pub fn serve_bare_pages(&self) {
        self.state.lock().expect("stub mutex poisoned").bare_pages = true;
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.state.lock().expect("stub mutex poisoned").auth_headers.clone()
    }

    pub fn analyzed(&self) -> Vec<String> {
        self.state.lock().expect("stub mutex poisoned").analyzed.clone()
    }

    pub fn post_ids(&self) -> Vec<i64> {
        self.state
            .lock()
            .expect("stub mutex poisoned")
            .posts
            .iter()
            .map(|post| post.id)
            .collect()
    }
}

fn stored_post(id: i64, content: &str, author: &str) -> Post {
    Post {
        id,
        content: content.to_string(),
        author: author.to_string(),
        created_at: format!("2024-05-01T10:{:02}:00", id % 60),
        // The backend only reports modification time once a post is edited.
        modified_at: None,
    }
}

// Start a stub seeded with `count` posts (ids 1..=count, newest first).
pub async fn spawn_stub(count: i64) -> Stub {
    let state = StubState {
        posts: (1..=count)
            .rev()
            .map(|id| stored_post(id, &format!("post {id}"), "Pilot"))
            .collect(),
        next_id: count + 1,
        ..StubState::default()
    };
    let state: Shared = Arc::new(Mutex::new(state));

    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");

    let app = router(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server failed");
    });

    Stub {
        base_url: format!("http://{addr}"),
        state,
    }
}

// An address nothing listens on.
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    drop(listener);
    format!("http://{addr}")
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/login", post(log_in))
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/analyze", post(analyze))
        .with_state(state)
}

fn record(state: &Shared, headers: &HeaderMap) {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state
        .lock()
        .expect("stub mutex poisoned")
        .auth_headers
        .push(header);
}

fn ok(status: StatusCode, data: Value) -> Response {
    (
        status,
        Json(json!({"code": "200", "message": "ok", "data": data})),
    )
        .into_response()
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({"code": code, "message": message, "data": null})),
    )
        .into_response()
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "404", "post not found")
}

async fn sign_up(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, &headers);
    if body["email"] == TAKEN_EMAIL {
        return error(StatusCode::CONFLICT, "U001", "email already in use");
    }
    ok(
        StatusCode::CREATED,
        json!({"id": 1, "email": body["email"], "nickname": body["nickname"]}),
    )
}

async fn log_in(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, &headers);
    if body["password"] != VALID_PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "U003", "password does not match");
    }
    ok(StatusCode::OK, json!({"accessToken": ISSUED_TOKEN}))
}

#[derive(Deserialize)]
struct PageQuery {
    page: usize,
    size: usize,
}

async fn list_posts(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    record(&state, &headers);
    let guard = state.lock().expect("stub mutex poisoned");
    let total = guard.posts.len();
    let content: Vec<Post> = guard
        .posts
        .iter()
        .skip(query.page * query.size)
        .take(query.size)
        .cloned()
        .collect();
    if guard.bare_pages {
        return ok(
            StatusCode::OK,
            json!({"content": content, "totalPages": total.div_ceil(query.size)}),
        );
    }
    ok(
        StatusCode::OK,
        json!({
            "content": content,
            "totalPages": total.div_ceil(query.size),
            "totalElements": total,
            "size": query.size,
            "number": query.page,
            "first": query.page == 0,
        }),
    )
}

async fn get_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    record(&state, &headers);
    let guard = state.lock().expect("stub mutex poisoned");
    match guard.posts.iter().find(|post| post.id == id) {
        Some(post) => ok(StatusCode::OK, json!(post)),
        None => not_found(),
    }
}

#[derive(Deserialize)]
struct PostBody {
    content: String,
    author: String,
}

async fn create_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<PostBody>,
) -> Response {
    record(&state, &headers);
    let mut guard = state.lock().expect("stub mutex poisoned");
    let post = stored_post(guard.next_id, &body.content, &body.author);
    guard.next_id += 1;
    guard.posts.insert(0, post.clone());
    ok(StatusCode::CREATED, json!(post))
}

async fn update_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<PostBody>,
) -> Response {
    record(&state, &headers);
    let mut guard = state.lock().expect("stub mutex poisoned");
    match guard.posts.iter_mut().find(|post| post.id == id) {
        Some(post) => {
            post.content = body.content;
            post.modified_at = Some("2024-05-02T12:00:00".to_string());
            ok(StatusCode::OK, json!(post))
        }
        None => not_found(),
    }
}

async fn delete_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    record(&state, &headers);
    if id == BROKEN_POST_ID {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database on fire").into_response();
    }
    let mut guard = state.lock().expect("stub mutex poisoned");
    let before = guard.posts.len();
    guard.posts.retain(|post| post.id != id);
    if guard.posts.len() == before {
        return not_found();
    }
    ok(StatusCode::OK, Value::Null)
}

#[derive(Deserialize)]
struct AnalyzeBody {
    content: String,
}

async fn analyze(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AnalyzeBody>,
) -> Response {
    record(&state, &headers);
    let hashtags: Vec<&str> = body
        .content
        .split_whitespace()
        .filter_map(|word| word.strip_prefix('#'))
        .collect();
    let positive = body.content.to_lowercase().contains("love");
    let sentiment = if positive {
        json!({"sentiment": "positive", "score": 0.75, "emoji": "😊"})
    } else {
        json!({"sentiment": "neutral", "score": 0.5, "emoji": "😐"})
    };
    let response = json!({"sentiment": sentiment, "hashtags": hashtags});
    state
        .lock()
        .expect("stub mutex poisoned")
        .analyzed
        .push(body.content);
    (StatusCode::OK, Json(response)).into_response()
}
