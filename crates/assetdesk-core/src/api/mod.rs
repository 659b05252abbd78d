//! HTTP access to the inventory REST API.
//!
//! Every request goes through [`ApiClient::request`], which attaches the
//! session token, serializes the body and normalizes error responses into
//! [`ApiError`].

mod error;

pub use error::{ApiError, ApiErrorKind, ApiResult, FALLBACK_MESSAGE};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT as USER_AGENT_HEADER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{AuthScheme, Config};
use crate::session::SharedSession;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("assetdesk/", env!("CARGO_PKG_VERSION"));

/// A request described as data, so controllers can return it as an effect.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiCall {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }
}

/// Inventory API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    scheme: AuthScheme,
    session: SharedSession,
}

impl ApiClient {
    /// Creates a client for `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>, scheme: AuthScheme, session: SharedSession) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, scheme, session)
    }

    fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        scheme: AuthScheme,
        session: SharedSession,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            scheme,
            session,
        }
    }

    /// Builds a client from configuration (base URL, auth scheme, timeout).
    pub fn from_config(config: &Config, session: SharedSession) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self::with_http(
            http,
            config.effective_base_url()?,
            config.auth_scheme,
            session,
        ))
    }

    /// Replaces the base URL, e.g. from a command-line override.
    pub fn with_base_url(mut self, base_url: &str) -> anyhow::Result<Self> {
        let base_url = base_url.trim();
        url::Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid API base URL {base_url}: {e}"))?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issues a request and returns the parsed JSON body.
    ///
    /// Empty success bodies yield `Value::Null`.
    ///
    /// # Errors
    /// `HttpStatus` for non-success responses (message taken from the body's
    /// `error`/`message` field), `Transport` for network failures, `Decode`
    /// for malformed success bodies.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let token = self
            .session
            .get()
            .map_err(|e| ApiError::storage(&e))?;

        let mut builder = self
            .http
            .request(method.clone(), self.url_for(path))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT_HEADER, USER_AGENT);

        if let Some(token) = token.as_deref() {
            builder = builder.header(AUTHORIZATION, self.scheme.header_value(token));
        }
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(%method, path, error = %e, "request failed to send");
            ApiError::transport(describe_transport_error(&e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::transport(format!("Failed to read response: {e}")))?;

        tracing::debug!(%method, path, status = status.as_u16(), "api response");

        if !status.is_success() {
            return Err(ApiError::http_status(status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| ApiError::decode(format!("Invalid JSON from {path}: {e}")))
    }

    /// Executes a call described as data.
    pub async fn call(&self, call: &ApiCall) -> ApiResult<Value> {
        self.request(call.method.clone(), &call.path, call.body.as_ref())
            .await
    }

    /// GET `path` and decode the body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let value = self.request(Method::GET, path, None).await?;
        decode(value)
    }

    /// Send `body` with `method` and decode the response.
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::decode(format!("Failed to serialize request: {e}")))?;
        let value = self.request(method, path, Some(&body)).await?;
        decode(value)
    }
}

/// Decodes a JSON value into a typed record.
pub fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::decode(format!("Unexpected response: {e}")))
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Request timed out".to_string()
    } else if err.is_connect() {
        "Could not connect to the server".to_string()
    } else {
        format!("Network error: {err}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;
    use crate::session::{MemorySessionStore, SessionStore};

    fn client(server: &MockServer, scheme: AuthScheme, token: Option<&str>) -> ApiClient {
        let store = match token {
            Some(t) => MemorySessionStore::with_token(t),
            None => MemorySessionStore::new(),
        };
        ApiClient::new(server.uri(), scheme, Arc::new(store))
    }

    #[tokio::test]
    async fn test_bearer_header_attached_when_token_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets"))
            .and(header("authorization", "Bearer tok-1"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, AuthScheme::Bearer, Some("tok-1"));
        let value = api.request(Method::GET, "/assets", None).await.unwrap();
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_raw_header_attached_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/locations"))
            .and(header("authorization", "tok-raw"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, AuthScheme::Raw, Some("tok-raw"));
        api.request(Method::GET, "/locations", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets"))
            .respond_with(|req: &Request| {
                if req.headers.contains_key("authorization") {
                    ResponseTemplate::new(400)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!([]))
                }
            })
            .mount(&server)
            .await;

        let api = client(&server, AuthScheme::Bearer, None);
        api.request(Method::GET, "/assets", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_token_read_on_every_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemorySessionStore::new());
        let api = ApiClient::new(server.uri(), AuthScheme::Bearer, Arc::clone(&store) as SharedSession);
        store.set("late-token").unwrap();
        api.request(Method::GET, "/assets", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_body_serialized_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/departments"))
            .and(body_json(json!({"name": "IT", "location": "HQ"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, AuthScheme::Bearer, Some("t"));
        let created: Value = api
            .send_json(
                Method::POST,
                "/departments",
                &json!({"name": "IT", "location": "HQ"}),
            )
            .await
            .unwrap();
        assert_eq!(created["id"], 7);
    }

    #[tokio::test]
    async fn test_error_message_from_error_field() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/departments/3"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"error": "Department not empty"})),
            )
            .mount(&server)
            .await;

        let api = client(&server, AuthScheme::Bearer, Some("t"));
        let err = api
            .request(Method::DELETE, "/departments/3", None)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Department not empty");
        assert_eq!(err.status, Some(409));
    }

    #[tokio::test]
    async fn test_error_message_from_message_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets/99"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "asset not found"})),
            )
            .mount(&server)
            .await;

        let api = client(&server, AuthScheme::Bearer, Some("t"));
        let err = api.request(Method::GET, "/assets/99", None).await.unwrap_err();
        assert_eq!(err.message, "asset not found");
    }

    #[tokio::test]
    async fn test_error_falls_back_when_body_not_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let api = client(&server, AuthScheme::Bearer, Some("t"));
        let err = api.request(Method::GET, "/assets", None).await.unwrap_err();
        assert_eq!(err.message, FALLBACK_MESSAGE);
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/assets/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = client(&server, AuthScheme::Bearer, Some("t"));
        let value = api.request(Method::DELETE, "/assets/1", None).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let api = client(&server, AuthScheme::Bearer, Some("t"));
        let err = api.request(Method::GET, "/assets", None).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_transport_error_when_server_unreachable() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let api = ApiClient::new(
            "http://127.0.0.1:9",
            AuthScheme::Bearer,
            Arc::new(MemorySessionStore::new()),
        );
        let err = api.request(Method::GET, "/assets", None).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Transport);
        assert_eq!(err.status, None);
    }

    #[test]
    fn test_url_join_handles_slashes() {
        let api = ApiClient::new(
            "http://example.test/",
            AuthScheme::Bearer,
            Arc::new(MemorySessionStore::new()),
        );
        assert_eq!(api.url_for("/assets"), "http://example.test/assets");
        assert_eq!(api.url_for("assets"), "http://example.test/assets");
    }

    #[test]
    fn test_with_base_url_validates() {
        let api = ApiClient::new(
            "http://example.test",
            AuthScheme::Bearer,
            Arc::new(MemorySessionStore::new()),
        );
        let api = api.with_base_url("http://other.test:9000/").unwrap();
        assert_eq!(api.base_url(), "http://other.test:9000");
        assert!(api.with_base_url("not a url").is_err());
    }
}
