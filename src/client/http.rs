//! Storefront HTTP client
//!
//! Issues requests against one base address, attaches the bearer token
//! held by the [`SessionStore`], and normalizes every failure into an
//! [`ApiError`]. Each call is a single attempt: no retries.

use super::error::ApiError;
use crate::config::ApiConfig;
use crate::session::SessionStore;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Per-call request settings
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Merged over the default `Content-Type: application/json`
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    /// Serialize `body` as the JSON payload
    pub fn json<T: Serialize + ?Sized>(method: Method, body: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest {
            message: format!("body is not serializable: {}", e),
        })?;
        Ok(Self {
            method,
            body: Some(body),
            ..Self::default()
        })
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Authenticated client for the storefront API
///
/// Construct one per application and pass it by reference; clones share
/// the connection pool and the session store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client; the base address is resolved here, once
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(concat!("MedCore/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let base_url = config.resolve_base_url();
        tracing::debug!("API base address: {}", base_url);

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Full request target for an API path
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') || path.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn build_headers(&self, extra: &HeaderMap) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in extra {
            if name == CONTENT_TYPE || name == AUTHORIZATION {
                headers.insert(name.clone(), value.clone());
            } else {
                headers.append(name.clone(), value.clone());
            }
        }

        if let Some(token) = self.session.get_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ApiError::InvalidRequest {
                    message: "stored token is not a valid header value".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Send one request and return the parsed JSON body
    ///
    /// An empty body parses as `{}`. Non-2xx responses fail with
    /// [`ApiError::Status`], using the body's `detail` when present.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let url = self.url_for(path);
        let request_id = Uuid::new_v4();
        let headers = self.build_headers(&options.headers)?;

        tracing::debug!(%request_id, method = %options.method, %url, "Sending API request");

        let mut builder = self.http.request(options.method.clone(), &url).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| {
            let err = ApiError::from(e);
            tracing::error!(%request_id, %url, "API error: {}", err);
            err
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            let err = ApiError::from(e);
            tracing::error!(%request_id, %url, status, "API error reading body: {}", err);
            err
        })?;

        let result = decode_response(status, &text);
        match &result {
            Ok(_) => tracing::debug!(%request_id, status, "API request completed"),
            Err(e) => tracing::warn!(%request_id, %url, status, "API error: {}", e),
        }
        result
    }

    /// [`request`](Self::request) followed by decoding into `T`
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let value = self.request(path, options).await?;
        decode_model(value)
    }
}

/// Turn a status and raw body into the parsed body or an error
///
/// A failing status always yields a status error, even when the body is
/// not JSON; a decode error is reserved for successful responses.
pub(crate) fn decode_response(status: u16, text: &str) -> Result<Value, ApiError> {
    let success = (200..300).contains(&status);
    let parsed = if text.trim().is_empty() {
        Ok(Value::Object(Map::new()))
    } else {
        serde_json::from_str::<Value>(text)
    };

    match (success, parsed) {
        (true, Ok(value)) => Ok(value),
        (true, Err(_)) => Err(ApiError::decode(Some(status))),
        (false, Ok(value)) => Err(ApiError::status(status, detail(&value))),
        (false, Err(_)) => Err(ApiError::status(status, None)),
    }
}

pub(crate) fn decode_model<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!("Unexpected response shape: {}", e);
        ApiError::decode(None)
    })
}

/// Server-supplied failure detail; structured details are kept as JSON text
fn detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockServer;
    use serde_json::json;

    #[test]
    fn test_decode_empty_body_is_empty_object() {
        assert_eq!(decode_response(204, "").unwrap(), json!({}));
        assert_eq!(decode_response(200, "  \n").unwrap(), json!({}));
    }

    #[test]
    fn test_decode_status_error_uses_detail() {
        let err = decode_response(403, r#"{"detail": "Not authorized to edit this product"}"#)
            .unwrap_err();
        assert_eq!(err.message(), "Not authorized to edit this product");
        assert_eq!(err.status_code(), Some(403));
    }

    #[test]
    fn test_decode_non_json_error_body_is_status_error() {
        let err = decode_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ApiError::Status { status_code: 502, .. }));
        assert_eq!(err.message(), "Request failed with status 502");
    }

    #[test]
    fn test_decode_non_json_success_body_is_decode_error() {
        let err = decode_response(200, "OK").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert_eq!(err.message(), "invalid response body");
    }

    #[test]
    fn test_decode_structured_detail() {
        let err = decode_response(422, r#"{"detail": [{"loc": ["body", "email"]}]}"#).unwrap_err();
        assert!(err.message().contains("email"));
    }

    #[test]
    fn test_url_for() {
        let client = ApiClient::new(
            &ApiConfig::with_base_url("http://localhost:8000/"),
            SessionStore::in_memory(),
        )
        .unwrap();
        assert_eq!(client.url_for("/auth/me"), "http://localhost:8000/auth/me");
        assert_eq!(client.url_for("users/"), "http://localhost:8000/users/");
    }

    #[test]
    fn test_base_address_follows_host() {
        let local = ApiClient::new(&ApiConfig::default(), SessionStore::in_memory()).unwrap();
        assert!(local.url_for("/products").starts_with("http://localhost:8000"));

        let remote_config = ApiConfig {
            host: "store.medcore.example".to_string(),
            ..ApiConfig::default()
        };
        let remote = ApiClient::new(&remote_config, SessionStore::in_memory()).unwrap();
        assert!(remote
            .url_for("/products")
            .starts_with("https://your-production-url.com"));
    }

    #[tokio::test]
    async fn test_request_sends_json_headers_without_token() {
        let server = MockServer::start().await;
        server.respond("GET", "/products", 200, json!([]));
        let client = server.client();

        let value = client.request("/products", RequestOptions::get()).await.unwrap();
        assert_eq!(value, json!([]));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(requests[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_request_attaches_bearer_token() {
        let server = MockServer::start().await;
        server.respond("GET", "/auth/me", 200, json!({"full_name": "Jane Doe"}));
        let client = server.client();
        client.session().set_token("abc").unwrap();

        client.request("/auth/me", RequestOptions::get()).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_request_caller_headers_merge() {
        let server = MockServer::start().await;
        server.respond("POST", "/products/create", 200, json!({}));
        let client = server.client();

        let options = RequestOptions::post(json!({"name": "Gloves"})).header(
            HeaderName::from_static("x-client"),
            HeaderValue::from_static("cli"),
        );
        client.request("/products/create", options).await.unwrap();

        let request = &server.requests()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.header("x-client"), Some("cli"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.json(), json!({"name": "Gloves"}));
    }

    #[tokio::test]
    async fn test_request_keeps_repeated_caller_headers() {
        let server = MockServer::start().await;
        server.respond("GET", "/products", 200, json!([]));
        let client = server.client();
        client.session().set_token("abc").unwrap();

        let mut options = RequestOptions::get();
        let tag = HeaderName::from_static("x-tag");
        options.headers.append(tag.clone(), HeaderValue::from_static("one"));
        options.headers.append(tag, HeaderValue::from_static("two"));
        options
            .headers
            .append(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        options
            .headers
            .append(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        options
            .headers
            .append(AUTHORIZATION, HeaderValue::from_static("Bearer caller"));
        client.request("/products", options).await.unwrap();

        let request = &server.requests()[0];
        assert_eq!(request.header_values("x-tag"), vec!["one", "two"]);
        assert_eq!(request.header_values("content-type"), vec!["application/json"]);
        assert_eq!(request.header_values("authorization"), vec!["Bearer abc"]);
    }

    #[tokio::test]
    async fn test_zero_timeout_in_config_file_sends_requests() {
        let server = MockServer::start().await;
        server.respond("GET", "/products", 200, json!([]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "[api]\nbase_url = \"{}\"\nrequest_timeout_secs = 0\n",
                server.base_url
            ),
        )
        .unwrap();

        let config = crate::config::Config::load(&path).unwrap();
        let client = ApiClient::new(&config.api, SessionStore::in_memory()).unwrap();

        let value = client.request("/products", RequestOptions::get()).await.unwrap();
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_request_times_out() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let config = ApiConfig {
            request_timeout_secs: Some(1),
            ..ApiConfig::with_base_url(format!("http://{}", addr))
        };
        let client = ApiClient::new(&config, SessionStore::in_memory()).unwrap();

        let err = client.request("/products", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(err.message(), "request timed out");
        hold.abort();
    }

    #[tokio::test]
    async fn test_request_204_resolves_to_empty_object() {
        let server = MockServer::start().await;
        server.respond_raw("DELETE", "/products/p1", 204, "");
        let client = server.client();

        let value = client
            .request("/products/p1", RequestOptions::delete())
            .await
            .unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_request_status_error() {
        let server = MockServer::start().await;
        server.respond("GET", "/products/missing", 404, json!({"detail": "Product not found"}));
        let client = server.client();

        let err = client
            .request("/products/missing", RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Product not found");
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_request_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = ApiClient::new(
            &ApiConfig::with_base_url(format!("http://127.0.0.1:{}", port)),
            SessionStore::in_memory(),
        )
        .unwrap();

        let err = client.request("/products", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn test_request_as_rejects_wrong_shape() {
        let server = MockServer::start().await;
        server.respond("GET", "/users/", 200, json!({"users": []}));
        let client = server.client();

        let err = client
            .request_as::<Vec<Value>>("/users/", RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
