//! Stub of the microCMS content API for tests and local development.
//!
//! Serves `GET /api/v1/{endpoint}` and `GET /api/v1/{endpoint}/{id}` from
//! content seeded at startup, checks `X-API-KEY`, shows drafts only when the
//! matching `X-GLOBAL-DRAFT-KEY` is sent, and records every request it sees.
//! The `broken` endpoint always fails with 500.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::debug;
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const GLOBAL_DRAFT_KEY_HEADER: &str = "x-global-draft-key";
pub const BROKEN_ENDPOINT: &str = "broken";

const LIST_LIMIT: usize = 10;

#[derive(Clone, Debug)]
struct Content {
    id: String,
    fields: Map<String, Value>,
    draft: bool,
}

impl Content {
    fn to_json(&self) -> Value {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(fields)
    }
}

/// One request as the server received it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub api_key: Option<String>,
    pub global_draft_key: Option<String>,
}

/// Shared log of received requests; clone it before handing the state to `app`.
#[derive(Clone, Debug, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn snapshot(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(&self, request: RecordedRequest) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }
}

/// Credentials and seeded content the stub serves.
#[derive(Clone, Debug)]
pub struct MockState {
    api_key: String,
    global_draft_key: String,
    contents: Arc<HashMap<String, Vec<Content>>>,
    log: RequestLog,
}

impl MockState {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            global_draft_key: String::new(),
            contents: Arc::new(HashMap::new()),
            log: RequestLog::default(),
        }
    }

    pub fn with_global_draft_key(mut self, key: impl Into<String>) -> Self {
        self.global_draft_key = key.into();
        self
    }

    /// Add a published item. Uses the object's `id` field when it is a
    /// string, otherwise generates one.
    pub fn with_content(self, endpoint: &str, fields: Value) -> Self {
        self.insert(endpoint, fields, false)
    }

    /// Add an item visible only with the global draft key.
    pub fn with_draft(self, endpoint: &str, fields: Value) -> Self {
        self.insert(endpoint, fields, true)
    }

    /// Register an endpoint with no content so it lists as empty instead of 404.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        Arc::make_mut(&mut self.contents)
            .entry(endpoint.to_string())
            .or_default();
        self
    }

    pub fn request_log(&self) -> RequestLog {
        self.log.clone()
    }

    fn insert(mut self, endpoint: &str, fields: Value, draft: bool) -> Self {
        let mut fields = match fields {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            _ => Uuid::new_v4().simple().to_string(),
        };
        Arc::make_mut(&mut self.contents)
            .entry(endpoint.to_string())
            .or_default()
            .push(Content { id, fields, draft });
        self
    }

    /// Record the request, then check the credential. Returns whether drafts
    /// are visible to the caller.
    fn admit(&self, method: &Method, uri: &Uri, headers: &HeaderMap) -> Result<bool, Failure> {
        let api_key = header(headers, API_KEY_HEADER);
        let draft_key = header(headers, GLOBAL_DRAFT_KEY_HEADER);
        debug!(%method, path = uri.path(), draft = draft_key.is_some(), "request");
        self.log.push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            api_key: api_key.clone(),
            global_draft_key: draft_key.clone(),
        });

        if api_key.as_deref() != Some(self.api_key.as_str()) {
            return Err(failure(StatusCode::UNAUTHORIZED, "X-API-KEY header is invalid."));
        }
        Ok(!self.global_draft_key.is_empty()
            && draft_key.as_deref() == Some(self.global_draft_key.as_str()))
    }

    fn visible(&self, endpoint: &str, drafts: bool) -> Result<Vec<&Content>, Failure> {
        if endpoint == BROKEN_ENDPOINT {
            return Err(failure(StatusCode::INTERNAL_SERVER_ERROR, "error"));
        }
        let items = self
            .contents
            .get(endpoint)
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "API not found."))?;
        Ok(items.iter().filter(|c| drafts || !c.draft).collect())
    }
}

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "message": message })))
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/api/v1/{endpoint}", get(list_contents))
        .route("/api/v1/{endpoint}/{id}", get(get_content))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn list_contents(
    State(state): State<MockState>,
    Path(endpoint): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<Value>, Failure> {
    let drafts = state.admit(&method, &uri, &headers)?;
    let items = state.visible(&endpoint, drafts)?;
    let contents: Vec<Value> = items.iter().take(LIST_LIMIT).map(|c| c.to_json()).collect();
    Ok(Json(json!({
        "contents": contents,
        "totalCount": items.len(),
        "offset": 0,
        "limit": LIST_LIMIT,
    })))
}

async fn get_content(
    State(state): State<MockState>,
    Path((endpoint, id)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<Value>, Failure> {
    let drafts = state.admit(&method, &uri, &headers)?;
    state
        .visible(&endpoint, drafts)?
        .into_iter()
        .find(|c| c.id == id)
        .map(|c| Json(c.to_json()))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Content is not found."))
}
