//! API client with transparent token refresh
//!
//! Every request carries the stored access token as a bearer header. When a
//! request that has not been replayed yet comes back 401, the client asks the
//! [`RefreshCoordinator`] for a new token and replays the request once with
//! it. Concurrent 401s share a single refresh call.

use std::sync::Arc;
use std::time::Duration;

use hisris_core::{
    Attempt, RefreshCoordinator, RefreshError, RefreshStats, SessionStore, TokenRefresher,
};
use hisris_domain::constants::BEARER_PREFIX;
use hisris_domain::ApiConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::auth::HttpTokenRefresher;
use super::errors::ApiError;
use crate::http::HttpClient;
use crate::observability::{ClientMetrics, ClientMetricsSnapshot};

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL including the version prefix (e.g. "https://ris.example.org/api/v1")
    pub base_url: String,
    /// Timeout for each request, replays included
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// One logical request, kept so it can be replayed after a token refresh.
#[derive(Clone)]
pub struct RequestContext {
    method: Method,
    url: Url,
    body: Option<Value>,
    attempt: Attempt,
    authenticated: bool,
    recoverable: bool,
}

impl RequestContext {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            attempt: Attempt::Initial,
            authenticated: true,
            recoverable: true,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Send without a bearer token; a 401 is returned as is.
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self.recoverable = false;
        self
    }

    /// Send with the bearer token but never enter token recovery on 401.
    pub fn without_recovery(mut self) -> Self {
        self.recoverable = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn attempt(&self) -> Attempt {
        self.attempt
    }
}

impl std::fmt::Debug for RequestContext {
    // Bodies may carry credentials, so only their presence is shown.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("path", &self.path())
            .field("has_body", &self.body.is_some())
            .field("attempt", &self.attempt)
            .field("authenticated", &self.authenticated)
            .field("recoverable", &self.recoverable)
            .finish()
    }
}

/// HTTP client for the HIS/RIS REST API
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    session: Arc<SessionStore>,
    coordinator: RefreshCoordinator,
    metrics: ClientMetrics,
}

impl ApiClient {
    /// Create a client that refreshes tokens against `POST /auth/refresh`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: ApiClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        Self::builder().config(config).session(session).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn refresh_stats(&self) -> RefreshStats {
        self.coordinator.stats()
    }

    pub fn metrics(&self) -> ClientMetricsSnapshot {
        self.metrics.snapshot(self.coordinator.stats())
    }

    /// Absolute URL for an API path such as `/patients/7`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the result is not a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        endpoint_url(&self.base_url, path)
    }

    /// Execute a GET request
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let ctx = RequestContext::new(Method::GET, self.endpoint(path)?);
        let response = self.execute(ctx).await?;
        decode(response, path).await
    }

    /// Execute a GET request with query parameters
    ///
    /// `None` fields are omitted; sequences become repeated keys.
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut url = self.endpoint(path)?;
        encode_query(&mut url, query)?;
        let response = self.execute(RequestContext::new(Method::GET, url)).await?;
        decode(response, path).await
    }

    /// Execute a GET request and return the raw body
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let ctx = RequestContext::new(Method::GET, self.endpoint(path)?);
        let response = ensure_success(self.execute(ctx).await?, path).await?;
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        Ok(bytes.to_vec())
    }

    /// Execute a POST request with a JSON body
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let ctx =
            RequestContext::new(Method::POST, self.endpoint(path)?).with_body(to_json(body)?);
        let response = self.execute(ctx).await?;
        decode(response, path).await
    }

    /// Execute a POST request without a body
    #[instrument(skip(self), fields(path = %path))]
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let ctx = RequestContext::new(Method::POST, self.endpoint(path)?);
        let response = self.execute(ctx).await?;
        decode(response, path).await
    }

    /// Execute a PUT request with a JSON body
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let ctx =
            RequestContext::new(Method::PUT, self.endpoint(path)?).with_body(to_json(body)?);
        let response = self.execute(ctx).await?;
        decode(response, path).await
    }

    /// Execute a DELETE request, discarding any response body
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let ctx = RequestContext::new(Method::DELETE, self.endpoint(path)?);
        ensure_success(self.execute(ctx).await?, path).await?;
        Ok(())
    }

    /// Execute a prepared request and deserialize its JSON response
    pub async fn execute_json<T>(&self, ctx: RequestContext) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let path = ctx.path().to_string();
        let response = self.execute(ctx).await?;
        decode(response, &path).await
    }

    /// Send `ctx`, recovering from one 401 through the refresh coordinator.
    ///
    /// Returns the response for any status other than an unrecoverable 401;
    /// callers classify non-success statuses themselves.
    ///
    /// # Errors
    ///
    /// - Transport failures and timeouts, unchanged.
    /// - `ApiError::Unauthorized` for a 401 on a replay, on a request that
    ///   opted out of recovery, or when no refresh token was stored.
    /// - `ApiError::RefreshFailed` when the refresh call itself failed.
    pub async fn execute(&self, mut ctx: RequestContext) -> Result<Response, ApiError> {
        let mut token = if ctx.authenticated { self.session.access_token() } else { None };

        loop {
            let response = self.send_once(&ctx, token.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            self.metrics.record_unauthorized();
            let rejected = error_from_response(response, ctx.path()).await;

            let next = match ctx.attempt.next() {
                Some(next) if ctx.recoverable => next,
                _ => {
                    debug!(path = ctx.path(), attempt = ?ctx.attempt, "401 not recoverable");
                    return Err(rejected);
                }
            };
            ctx.attempt = next;

            match self.coordinator.recover().await {
                Ok(new_token) => {
                    debug!(path = ctx.path(), "replaying request with refreshed token");
                    self.metrics.record_replay();
                    token = Some(new_token);
                }
                Err(RefreshError::MissingRefreshToken) => return Err(rejected),
                Err(err) => return Err(ApiError::RefreshFailed(err)),
            }
        }
    }

    async fn send_once(
        &self,
        ctx: &RequestContext,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut builder = self.http.request(ctx.method.clone(), ctx.url.clone());
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("{BEARER_PREFIX}{token}"));
        }
        if let Some(body) = &ctx.body {
            builder = builder.json(body);
        }

        self.metrics.record_request();
        let result = self.http.send(builder).await;
        if matches!(result, Err(ApiError::Timeout(_) | ApiError::Network(_))) {
            self.metrics.record_transport_error();
        }
        result
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    session: Option<Arc<SessionStore>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share an existing session store; a fresh empty one is used otherwise
    pub fn session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Replace the HTTP refresher with a custom implementation
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is not an absolute http(s)
    /// URL or the HTTP client cannot be created.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let base_url = normalize_base_url(&config.base_url)?;

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        let refresher = match self.refresher {
            Some(refresher) => refresher,
            None => Arc::new(HttpTokenRefresher::new(http.clone(), &base_url)?),
        };

        let session = self.session.unwrap_or_default();
        let coordinator = RefreshCoordinator::new(session.clone(), refresher);

        Ok(ApiClient { http, base_url, session, coordinator, metrics: ClientMetrics::new() })
    }
}

/// Validate a base URL and strip its trailing slash.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let parsed = Url::parse(raw)
        .map_err(|e| ApiError::Config(format!("Invalid base URL '{raw}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::Config(format!("Base URL must use http or https: {raw}")));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

pub(crate) fn endpoint_url(base_url: &str, path: &str) -> Result<Url, ApiError> {
    let joined = if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    };
    Url::parse(&joined)
        .map_err(|e| ApiError::Config(format!("Invalid request URL '{joined}': {e}")))
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Config(format!("Failed to serialize request body: {e}")))
}

/// Append the fields of `query` to `url`.
fn encode_query<Q: Serialize + ?Sized>(url: &mut Url, query: &Q) -> Result<(), ApiError> {
    let value = serde_json::to_value(query)
        .map_err(|e| ApiError::Config(format!("Failed to serialize query: {e}")))?;
    let Value::Object(fields) = value else {
        return Err(ApiError::Config("Query parameters must serialize to a map".into()));
    };

    let mut pairs = Vec::new();
    for (key, value) in fields {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(item) = query_scalar(&key, item)? {
                        pairs.push((key.clone(), item));
                    }
                }
            }
            other => {
                if let Some(item) = query_scalar(&key, other)? {
                    pairs.push((key, item));
                }
            }
        }
    }

    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(())
}

fn query_scalar(key: &str, value: Value) -> Result<Option<String>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => {
            Err(ApiError::Config(format!("Query parameter '{key}' must be a scalar")))
        }
    }
}

async fn error_from_response(response: Response, path: &str) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ApiError::from_status(status, path, body)
}

pub(crate) async fn ensure_success(response: Response, path: &str) -> Result<Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response, path).await)
    }
}

/// Deserialize a success body; 204/205 deserialize from `null`.
async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
    let response = ensure_success(response, path).await?;
    let status = response.status();

    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return serde_json::from_value(Value::Null).map_err(|_| {
            ApiError::Decode(format!("{path} returned {status} with no body, expected a value"))
        });
    }

    let body = response.bytes().await.map_err(ApiError::from)?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(format!("{path}: {e}")))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        name: String,
    }

    #[derive(Serialize)]
    struct Filter {
        q: Option<String>,
        page: Option<u32>,
        modality: Option<String>,
    }

    fn client_for(server: &MockServer, session: Arc<SessionStore>) -> ApiClient {
        let config = ApiClientConfig {
            base_url: format!("{}/api/v1/", server.uri()),
            timeout: Duration::from_secs(5),
            user_agent: "hisris-test".into(),
        };
        ApiClient::new(config, session).expect("client")
    }

    fn logged_in() -> Arc<SessionStore> {
        let store = SessionStore::new();
        store.set_tokens("T1", "R1");
        Arc::new(store)
    }

    #[tokio::test]
    async fn attaches_bearer_token_from_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/items/1"))
            .and(header("authorization", "Bearer T1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1, "name": "a"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let item: Item = client.get("/items/1").await.unwrap();

        assert_eq!(item, Item { id: 1, name: "a".into() });
    }

    #[tokio::test]
    async fn anonymous_session_sends_no_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/items"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(SessionStore::new()));
        let items: Vec<Item> = client.get("/items").await.unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn query_skips_missing_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/items"))
            .and(query_param("q", "smith"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let filter = Filter { q: Some("smith".into()), page: Some(2), modality: None };
        let _: Vec<Item> = client.get_with_query("/items", &filter).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(!query.contains("modality"), "query was {query}");
    }

    #[test]
    fn empty_query_leaves_url_untouched() {
        let mut url = Url::parse("http://localhost/api/v1/items").unwrap();
        encode_query(&mut url, &Filter { q: None, page: None, modality: None }).unwrap();

        assert_eq!(url.as_str(), "http://localhost/api/v1/items");
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/items"))
            .and(body_json(serde_json::json!({"name": "b"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 2, "name": "b"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let created: Item = client.post("/items", &serde_json::json!({"name": "b"})).await.unwrap();

        assert_eq!(created.id, 2);
    }

    #[tokio::test]
    async fn no_content_decodes_as_unit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/items/1/archive"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/items/1/reset"))
            .respond_with(ResponseTemplate::new(205))
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let (): () = client.post_empty("/items/1/archive").await.unwrap();
        let maybe: Option<Item> = client.get("/items/1/reset").await.unwrap();

        assert!(maybe.is_none());
    }

    #[tokio::test]
    async fn no_content_for_required_value_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/items/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let result: Result<Item, _> = client.get("/items/1").await;

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn decode_error_names_the_offending_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/items/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 3})))
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let err = client.get::<Item>("/items/3").await.unwrap_err();

        match err {
            ApiError::Decode(message) => {
                assert!(message.starts_with("/items/3: "), "{message}");
                assert!(message.contains("missing field `name`"), "{message}");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_accepts_empty_success() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/items/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());

        client.delete("/items/1").await.unwrap();
    }

    #[tokio::test]
    async fn status_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such item"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/busy"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/broken"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());

        let err = client.get::<Item>("/missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m.contains("no such item")));
        let err = client.get::<Item>("/busy").await.unwrap_err();
        assert!(matches!(err, ApiError::RateLimit(_)));
        let err = client.get::<Item>("/broken").await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
    }

    #[tokio::test]
    async fn get_bytes_returns_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/files/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"%PDF-1.7".to_vec())
                    .insert_header("content-type", "application/pdf"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let bytes = client.get_bytes("/files/1").await.unwrap();

        assert_eq!(bytes, b"%PDF-1.7");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = normalize_base_url("ftp://ris.example.org").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        assert!(normalize_base_url("not a url").is_err());
        assert_eq!(
            normalize_base_url("https://ris.example.org/api/v1/").unwrap(),
            "https://ris.example.org/api/v1"
        );
    }

    #[test]
    fn endpoint_joins_relative_and_absolute_paths() {
        let base = "http://localhost:8000/api/v1";
        assert_eq!(endpoint_url(base, "/patients").unwrap().path(), "/api/v1/patients");
        assert_eq!(endpoint_url(base, "patients/3").unwrap().path(), "/api/v1/patients/3");
    }
}
