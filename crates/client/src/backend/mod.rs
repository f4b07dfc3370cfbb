//! Creator search backend client.
//!
//! Sends a query with its filters to the marketplace search API and maps
//! transport and HTTP failures onto the search error taxonomy, so the
//! resilience layer can decide whether to retry.
//!
//! ### Protocol
//!
//! - **Endpoint**: `POST {backend_url}/search`
//! - **Body**: `{"query": "...", "filters": {...}}`
//! - **Response**: `{"results": [...]}`; records are passed through as JSON.
//! - **Status mapping**: 400/422 invalid query, 429 rate limited, 5xx server
//!   error. Timeouts and transport failures are reported as such.
//! - **Pacing**: requests are spaced by a minimum interval.

pub mod error;
pub mod request;
pub mod response;

pub use error::BackendError;
pub use request::{MAX_QUERY_CHARS, SearchRequest};
pub use response::BackendResponse;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use serde_json::Value;
use shoutout_core::{FilterState, SearchConfig, SearchFailure};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum spacing between backend requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Future returned by [`HttpBackend::search_fn`].
pub type BackendFuture = Pin<Box<dyn Future<Output = Result<Vec<Value>, SearchFailure>> + Send>>;

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL; `/search` and `/health` are appended.
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub min_request_interval: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for BackendConfig {
    fn from(config: &SearchConfig) -> Self {
        Self {
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            min_request_interval: MIN_REQUEST_INTERVAL,
        }
    }
}

impl BackendConfig {
    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), BackendError> {
        let url = url::Url::parse(&self.base_url).map_err(|e| BackendError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(BackendError::InvalidUrl(format!("unsupported scheme: {other}"))),
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

/// Enforces the minimum request interval.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self { last_request: Mutex::new(None), min_interval }
    }

    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// HTTP client for the creator search API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    config: BackendConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| BackendError::Network(Arc::new(e)))?;

        Ok(Self { http, rate_limiter: Arc::new(RateLimiter::new(config.min_request_interval)), config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Run one search against the backend.
    ///
    /// The request is validated before anything is sent; no retrying happens
    /// here.
    pub async fn search(&self, query: &str, filters: &FilterState) -> Result<Vec<Value>, BackendError> {
        let req = SearchRequest::new(query.trim(), filters.clone());
        req.validate()?;

        self.rate_limiter.acquire().await;

        let start = Instant::now();
        tracing::debug!(query = %req.query, filters = filters.active_count(), "searching backend");

        let http_response = self
            .http
            .post(self.config.search_url())
            .header(header::ACCEPT, "application/json")
            .json(&req)
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!("backend response status: {}", status);

        if status.is_client_error() || status.is_server_error() {
            return Err(BackendError::from_status(status.as_u16()));
        }

        let bytes = http_response.bytes().await?;
        let response: BackendResponse =
            serde_json::from_slice(&bytes).map_err(|e| BackendError::Parse(e.to_string()))?;

        tracing::debug!("search completed in {:?}, {} results", start.elapsed(), response.results.len());

        Ok(response.results)
    }

    /// Check `GET {backend}/health`; any 2xx counts as reachable.
    pub async fn health(&self) -> Result<(), BackendError> {
        let response = self.http.get(self.config.health_url()).send().await?;
        let status = response.status();
        if status.is_success() { Ok(()) } else { Err(BackendError::HttpError { status: status.as_u16() }) }
    }

    /// A repeatable search closure for the resilience layer.
    ///
    /// Each call issues a fresh request; errors are converted to typed
    /// failures so they are never classified by message.
    pub fn search_fn(
        self: &Arc<Self>,
        query: &str,
        filters: &FilterState,
    ) -> impl Fn() -> BackendFuture + Send + Sync + 'static {
        let backend = Arc::clone(self);
        let query = query.to_string();
        let filters = filters.clone();
        move || -> BackendFuture {
            let backend = Arc::clone(&backend);
            let query = query.clone();
            let filters = filters.clone();
            Box::pin(async move { backend.search(&query, &filters).await.map_err(SearchFailure::from) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoutout_core::ErrorKind;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpBackend {
        let config = BackendConfig {
            base_url: format!("{}/api", server.uri()),
            timeout: Duration::from_millis(500),
            user_agent: "shoutout-test".to_string(),
            min_request_interval: Duration::ZERO,
        };
        HttpBackend::new(config).unwrap()
    }

    #[test]
    fn test_config_from_search_config() {
        let search = SearchConfig { backend_url: "https://api.example.com/v1/".to_string(), ..Default::default() };
        let config = BackendConfig::from(&search);
        assert_eq!(config.search_url(), "https://api.example.com/v1/search");
        assert_eq!(config.health_url(), "https://api.example.com/v1/health");
        assert_eq!(config.timeout, search.timeout());
    }

    #[test]
    fn test_invalid_base_url() {
        let config = BackendConfig { base_url: "not a url".to_string(), ..Default::default() };
        assert!(matches!(HttpBackend::new(config), Err(BackendError::InvalidUrl(_))));

        let config = BackendConfig { base_url: "ftp://example.com".to_string(), ..Default::default() };
        assert!(matches!(HttpBackend::new(config), Err(BackendError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_search_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search"))
            .and(body_partial_json(serde_json::json!({"query": "birthday roast"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"id": "c1", "name": "Gilbert"}, {"id": "c2", "name": "Ronda"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = backend_for(&server).search("  birthday roast ", &FilterState::default()).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1]["name"], "Ronda");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(path("/api/search")).respond_with(ResponseTemplate::new(429)).mount(&server).await;
        let err = backend_for(&server).search("roast", &FilterState::default()).await.unwrap_err();
        assert!(matches!(err, BackendError::RateLimited));

        let server = MockServer::start().await;
        Mock::given(path("/api/search")).respond_with(ResponseTemplate::new(503)).mount(&server).await;
        let err = backend_for(&server).search("roast", &FilterState::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerError);

        let server = MockServer::start().await;
        Mock::given(path("/api/search")).respond_with(ResponseTemplate::new(422)).mount(&server).await;
        let err = backend_for(&server).search("roast", &FilterState::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = backend_for(&server).search("roast", &FilterState::default()).await.unwrap_err();
        assert!(matches!(err, BackendError::Timeout));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = backend_for(&server).search("roast", &FilterState::default()).await.unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[tokio::test]
    async fn test_invalid_query_not_sent() {
        let server = MockServer::start().await;
        Mock::given(path("/api/search")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let err = backend_for(&server).search("", &FilterState::default()).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_search_fn_yields_typed_failures() {
        let server = MockServer::start().await;
        Mock::given(path("/api/search")).respond_with(ResponseTemplate::new(500)).expect(2).mount(&server).await;

        let backend = Arc::new(backend_for(&server));
        let search = backend.search_fn("roast", &FilterState::default());
        for _ in 0..2 {
            let failure = search().await.unwrap_err();
            assert_eq!(failure.kind, Some(ErrorKind::ServerError));
        }
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path("/api/health")).respond_with(ResponseTemplate::new(204)).mount(&server).await;
        assert!(backend_for(&server).health().await.is_ok());

        let server = MockServer::start().await;
        Mock::given(path("/api/health")).respond_with(ResponseTemplate::new(503)).mount(&server).await;
        assert!(matches!(backend_for(&server).health().await, Err(BackendError::HttpError { status: 503 })));
    }
}
