//! In-process mock backend for client tests
//!
//! Serves canned responses keyed by method and path, and records every
//! request it receives.

use super::http::ApiClient;
use crate::config::ApiConfig;
use crate::session::SessionStore;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// One request as the backend saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string
    pub target: String,
    pub headers: HashMap<String, Vec<String>>,
    pub body: String,
}

impl RecordedRequest {
    /// First value of a header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().copied()
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get(name)
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Default)]
struct Backend {
    routes: Mutex<HashMap<(String, String), (u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockServer {
    pub base_url: String,
    backend: Arc<Backend>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        let backend = Arc::new(Backend::default());
        let app = Router::new()
            .fallback(handle_request)
            .with_state(Arc::clone(&backend));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            backend,
            handle,
        }
    }

    /// Answer `method path` (query ignored) with a JSON body
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.respond_raw(method, path, status, body.to_string());
    }

    /// Answer `method path` (query ignored) with a raw body
    pub fn respond_raw(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.backend
            .routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.into()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.backend.requests.lock().unwrap().clone()
    }

    /// Client pointed at this backend with a fresh in-memory session
    pub fn client(&self) -> ApiClient {
        ApiClient::new(
            &ApiConfig::with_base_url(&self.base_url),
            SessionStore::in_memory(),
        )
        .unwrap()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_request(
    State(backend): State<Arc<Backend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    backend.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        target,
        headers: headers.iter().fold(HashMap::new(), |mut acc, (k, v)| {
            acc.entry(k.as_str().to_string())
                .or_insert_with(Vec::new)
                .push(v.to_str().unwrap_or_default().to_string());
            acc
        }),
        body,
    });

    let route = backend
        .routes
        .lock()
        .unwrap()
        .get(&(method.to_string(), uri.path().to_string()))
        .cloned();

    let (status, body) = route.unwrap_or((404, r#"{"detail": "Not Found"}"#.to_string()));
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
