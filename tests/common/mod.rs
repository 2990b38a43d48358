//! In-process fake toolbox server for integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub struct FakeToolbox {
    pub url: String,
    pub state: Arc<CatalogState>,
}

#[derive(Default)]
pub struct CatalogState {
    pub manifest_requests: AtomicUsize,
    pub invoke_requests: AtomicUsize,
    /// Requests answered with 503 before the catalog responds normally.
    pub failures: AtomicUsize,
    pub last_invoke: Mutex<Option<Invocation>>,
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl FakeToolbox {
    pub fn fail_next(&self, n: usize) {
        self.state.failures.store(n, Ordering::SeqCst);
    }

    pub fn manifest_requests(&self) -> usize {
        self.state.manifest_requests.load(Ordering::SeqCst)
    }

    pub fn invoke_requests(&self) -> usize {
        self.state.invoke_requests.load(Ordering::SeqCst)
    }

    pub fn last_invoke(&self) -> Invocation {
        self.state
            .last_invoke
            .lock()
            .unwrap()
            .clone()
            .expect("no invocation recorded")
    }
}

pub async fn spawn() -> FakeToolbox {
    let state = Arc::new(CatalogState::default());
    let app = Router::new()
        .route("/api/toolset/", get(default_toolset))
        .route("/api/toolset/:name", get(toolset))
        .route("/api/tool/:name", get(tool))
        .route("/api/tool/:name/invoke", post(invoke))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeToolbox {
        url: format!("http://{addr}"),
        state,
    }
}

/// An address nothing listens on.
pub fn unreachable_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn tool_schema(name: &str) -> Option<Value> {
    let schema = match name {
        "search_hotels" => json!({
            "description": "Search for hotels by location",
            "parameters": [
                {"name": "location", "type": "string", "description": "City to search"}
            ]
        }),
        "book_room" => json!({
            "description": "Book a room at a hotel",
            "parameters": [
                {"name": "hotel_id", "type": "integer", "description": "Hotel to book"},
                {"name": "guest", "type": "string", "description": "Guest email", "authSources": ["guest-auth"]}
            ]
        }),
        "search_release_notes" => json!({
            "description": "Search Google Cloud release notes",
            "parameters": [
                {"name": "product", "type": "string", "description": "Product name"},
                {"name": "days", "type": "integer", "description": "Look-back window", "required": false}
            ]
        }),
        // Answers invocations without a `result` field.
        "ping" => json!({
            "description": "Check that the toolbox is alive",
            "parameters": []
        }),
        _ => return None,
    };
    Some(schema)
}

fn toolset_members(name: &str) -> Option<Vec<&'static str>> {
    match name {
        "" => Some(vec!["search_hotels", "book_room", "search_release_notes"]),
        "my-toolset" => Some(vec!["search_hotels", "book_room"]),
        "my_bq_toolset" => Some(vec!["search_release_notes"]),
        "empty" => Some(vec![]),
        "diagnostics" => Some(vec!["ping"]),
        _ => None,
    }
}

fn manifest(tools: &[&str]) -> Value {
    let tools: serde_json::Map<String, Value> = tools
        .iter()
        .filter_map(|name| tool_schema(name).map(|s| (name.to_string(), s)))
        .collect();
    json!({"serverVersion": "0.9.0-fake", "tools": tools})
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"status": "Not Found", "error": format!("{what} does not exist")})),
    )
        .into_response()
}

async fn default_toolset(State(state): State<Arc<CatalogState>>) -> Response {
    serve_toolset(&state, "").await
}

async fn toolset(State(state): State<Arc<CatalogState>>, Path(name): Path<String>) -> Response {
    serve_toolset(&state, &name).await
}

fn take_failure(state: &CatalogState) -> Option<Response> {
    state
        .failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .ok()
        .map(|_| (StatusCode::SERVICE_UNAVAILABLE, "try again later").into_response())
}

async fn serve_toolset(state: &CatalogState, name: &str) -> Response {
    state.manifest_requests.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = take_failure(state) {
        return resp;
    }
    match name {
        "broken" => (StatusCode::OK, "<html>not a manifest</html>").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(manifest(&[])).into_response()
        }
        _ => match toolset_members(name) {
            Some(tools) => Json(manifest(&tools)).into_response(),
            None => not_found(&format!("toolset {name:?}")),
        },
    }
}

async fn tool(State(state): State<Arc<CatalogState>>, Path(name): Path<String>) -> Response {
    state.manifest_requests.fetch_add(1, Ordering::SeqCst);
    if tool_schema(&name).is_none() {
        return not_found(&format!("tool {name:?}"));
    }
    Json(manifest(&[name.as_str()])).into_response()
}

async fn invoke(
    State(state): State<Arc<CatalogState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.invoke_requests.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = take_failure(&state) {
        return resp;
    }
    if tool_schema(&name).is_none() {
        return not_found(&format!("tool {name:?}"));
    }

    let headers = headers
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
        .collect();
    *state.last_invoke.lock().unwrap() = Some(Invocation {
        tool: name.clone(),
        headers,
        body: body.clone(),
    });

    if name == "ping" {
        return Json(json!({})).into_response();
    }
    Json(json!({"result": format!("{name} ok: {body}")})).into_response()
}
