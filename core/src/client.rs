//! Configured HTTP client whose verb methods never fail.
//!
//! # Design
//! `HttpClient` holds a pooled `reqwest::Client`, the base URL, the
//! validated default headers and the retry policy, and nothing that changes
//! after construction. It is cheap to clone and safe to share between
//! tasks.
//!
//! Each verb call is split in two steps. `build_request` resolves the path,
//! encodes the query, merges headers and attaches the body, producing an
//! `HttpRequest`. `execute` performs the round-trip and normalizes the
//! outcome into a `RequestResult`. A request that cannot be built never
//! reaches the transport.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

use crate::config::{ClientConfig, Headers, RetryPolicy};
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest};
use crate::result::{collect_headers, FailureKind, RequestResult};

static NO_HEADERS: Headers = Headers::new();

/// Test-harness HTTP client bound to one base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    transport: reqwest::Client,
    base_url: String,
    default_headers: HeaderMap,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Client for `base_url` with the default timeout and headers.
    pub fn from_base_url(base_url: &str) -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::new(base_url))
    }

    /// Validates `config` and binds a transport to it. No network activity.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let parsed = Url::parse(&config.base_url).map_err(|source| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::UnsupportedScheme {
                url: config.base_url.clone(),
                scheme: parsed.scheme().to_string(),
            });
        }
        if config.timeout.is_zero() {
            return Err(ClientError::ZeroTimeout);
        }

        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::InvalidHeaderName(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::InvalidHeaderValue(name.to_string()))?;
            default_headers.insert(name, value);
        }

        let transport = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_headers,
            timeout: config.timeout,
            retry: config.retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub async fn get(&self, path: &str) -> RequestResult {
        self.send(HttpMethod::Get, path, Vec::new(), None, &NO_HEADERS).await
    }

    /// GET with query parameters and per-call headers.
    pub async fn get_with<I, K, V>(&self, path: &str, query: I, extra_headers: &Headers) -> RequestResult
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        let query = query
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.to_string()))
            .collect();
        self.send(HttpMethod::Get, path, query, None, extra_headers).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestResult {
        self.send_json(HttpMethod::Post, path, body, &NO_HEADERS).await
    }

    pub async fn post_with<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        extra_headers: &Headers,
    ) -> RequestResult {
        self.send_json(HttpMethod::Post, path, body, extra_headers).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestResult {
        self.send_json(HttpMethod::Put, path, body, &NO_HEADERS).await
    }

    pub async fn put_with<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        extra_headers: &Headers,
    ) -> RequestResult {
        self.send_json(HttpMethod::Put, path, body, extra_headers).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestResult {
        self.send_json(HttpMethod::Patch, path, body, &NO_HEADERS).await
    }

    pub async fn patch_with<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        extra_headers: &Headers,
    ) -> RequestResult {
        self.send_json(HttpMethod::Patch, path, body, extra_headers).await
    }

    pub async fn delete(&self, path: &str) -> RequestResult {
        self.send(HttpMethod::Delete, path, Vec::new(), None, &NO_HEADERS).await
    }

    pub async fn delete_with(&self, path: &str, extra_headers: &Headers) -> RequestResult {
        self.send(HttpMethod::Delete, path, Vec::new(), None, extra_headers).await
    }

    /// Resolves `path` against the base URL. Absolute `scheme://` paths
    /// replace the base entirely.
    pub fn resolve_url(&self, path: &str) -> Result<Url, url::ParseError> {
        if is_absolute_url(path) {
            return Url::parse(path);
        }
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            Url::parse(&self.base_url)
        } else {
            Url::parse(&format!("{}/{relative}", self.base_url))
        }
    }

    /// Produces the exact request a verb call would send. The error is a
    /// human-readable reason the request cannot be sent.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<String>,
        extra_headers: &Headers,
    ) -> Result<HttpRequest, String> {
        let mut url = self
            .resolve_url(path)
            .map_err(|e| format!("invalid URL for path '{path}': {e}"))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let mut headers = self.default_headers.clone();
        for (name, value) in extra_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| format!("invalid header name '{name}'"))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| format!("invalid value for header '{name}'"))?;
            headers.insert(header_name, header_value);
        }
        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Sends `request`, re-sending it while it gets no response and the
    /// retry policy allows.
    pub async fn execute(&self, request: &HttpRequest) -> RequestResult {
        let mut attempt = 0;
        loop {
            let result = self.send_once(request).await;
            if result.failure_kind() != Some(FailureKind::NoResponse) || attempt >= self.retry.max_retries {
                return result;
            }
            let delay = self.retry.delay_for(attempt);
            attempt += 1;
            tracing::warn!(
                method = %request.method,
                url = %request.url,
                attempt,
                max_retries = self.retry.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "no response, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_once(&self, request: &HttpRequest) -> RequestResult {
        let started = Instant::now();
        let mut builder = self
            .transport
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(method = %request.method, url = %request.url, error = %err, "request failed");
                return RequestResult::from_transport_error(&err);
            }
        };

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        match response.bytes().await {
            Ok(body) => {
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "response received"
                );
                RequestResult::from_parts(status, headers, &body)
            }
            Err(err) => {
                tracing::debug!(method = %request.method, url = %request.url, status, error = %err, "response body lost");
                RequestResult::from_transport_error(&err)
            }
        }
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<String>,
        extra_headers: &Headers,
    ) -> RequestResult {
        match self.build_request(method, path, &query, body, extra_headers) {
            Ok(request) => self.execute(&request).await,
            Err(reason) => {
                tracing::debug!(%method, path, error = %reason, "request not sent");
                RequestResult::not_sent(reason)
            }
        }
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
        extra_headers: &Headers,
    ) -> RequestResult {
        match serde_json::to_string(body) {
            Ok(body) => self.send(method, path, Vec::new(), Some(body), extra_headers).await,
            Err(err) => RequestResult::not_sent(format!("failed to serialize request body: {err}")),
        }
    }
}

fn is_absolute_url(path: &str) -> bool {
    match path.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn client() -> HttpClient {
        HttpClient::from_base_url("http://localhost:3000").unwrap()
    }

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn relative_path_is_joined_to_base() {
        let req = client()
            .build_request(HttpMethod::Get, "/products/1", &[], None, &NO_HEADERS)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url.as_str(), "http://localhost:3000/products/1");
        assert!(req.body.is_none());
    }

    #[test]
    fn slashes_between_base_and_path_are_normalized() {
        let client = HttpClient::from_base_url("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        for path in ["users", "/users", "//users"] {
            let url = client.resolve_url(path).unwrap();
            assert_eq!(url.as_str(), "http://localhost:3000/api/users", "{path}");
        }
    }

    #[test]
    fn empty_path_targets_base() {
        let url = client().resolve_url("").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn absolute_path_overrides_base() {
        let url = client().resolve_url("https://dummyjson.com/posts/1").unwrap();
        assert_eq!(url.as_str(), "https://dummyjson.com/posts/1");
    }

    #[test]
    fn query_is_encoded_in_order() {
        let query = vec![
            ("userId".to_string(), "1".to_string()),
            ("q".to_string(), "a b&c".to_string()),
        ];
        let req = client()
            .build_request(HttpMethod::Get, "/posts", &query, None, &NO_HEADERS)
            .unwrap();
        assert_eq!(req.url.as_str(), "http://localhost:3000/posts?userId=1&q=a+b%26c");
    }

    #[test]
    fn default_headers_are_sent() {
        let req = client()
            .build_request(HttpMethod::Get, "/", &[], None, &NO_HEADERS)
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[test]
    fn extra_headers_override_defaults_case_insensitively() {
        let extra = headers(&[("accept", "text/plain"), ("X-Custom-Header", "test-value")]);
        let req = client()
            .build_request(HttpMethod::Get, "/", &[], None, &extra)
            .unwrap();
        assert_eq!(req.headers.get_all("accept").iter().count(), 1);
        assert_eq!(req.header("Accept"), Some("text/plain"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("x-custom-header"), Some("test-value"));
        // defaults themselves are untouched for the next call
        assert_eq!(client().default_headers().get("accept").unwrap(), "application/json");
    }

    #[test]
    fn body_without_content_type_gets_json() {
        let client = HttpClient::from_config(ClientConfig::new("http://localhost").with_headers(Headers::new())).unwrap();
        let req = client
            .build_request(HttpMethod::Post, "/products/add", &[], Some("{}".to_string()), &NO_HEADERS)
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some("{}"));

        let req = client
            .build_request(HttpMethod::Get, "/", &[], None, &NO_HEADERS)
            .unwrap();
        assert!(req.header("content-type").is_none());
    }

    #[test]
    fn invalid_extra_header_is_rejected_before_sending() {
        let extra = headers(&[("bad header", "x")]);
        let reason = client()
            .build_request(HttpMethod::Get, "/", &[], None, &extra)
            .unwrap_err();
        assert!(reason.contains("bad header"));

        let extra = headers(&[("X-Ok", "line\nbreak")]);
        assert!(client()
            .build_request(HttpMethod::Get, "/", &[], None, &extra)
            .is_err());
    }

    #[test]
    fn unparseable_absolute_path_is_rejected() {
        let reason = client()
            .build_request(HttpMethod::Get, "http://[::1", &[], None, &NO_HEADERS)
            .unwrap_err();
        assert!(reason.contains("invalid URL"));
    }

    #[test]
    fn bare_base_url_equals_default_config() {
        let from_url = HttpClient::from_base_url("https://dummyjson.com").unwrap();
        let from_config = HttpClient::from_config(ClientConfig::new("https://dummyjson.com")).unwrap();
        assert_eq!(from_url.base_url(), from_config.base_url());
        assert_eq!(from_url.timeout(), from_config.timeout());
        assert_eq!(from_url.timeout(), Duration::from_millis(10_000));
        assert_eq!(from_url.default_headers(), from_config.default_headers());
        assert_eq!(from_url.retry_policy(), from_config.retry_policy());
    }

    #[test]
    fn malformed_base_url_fails_construction() {
        let err = HttpClient::from_base_url("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn non_http_scheme_fails_construction() {
        let err = HttpClient::from_base_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedScheme { scheme, .. } if scheme == "ftp"));
    }

    #[test]
    fn zero_timeout_fails_construction() {
        let config = ClientConfig::new("http://localhost").with_timeout(Duration::ZERO);
        assert!(matches!(HttpClient::from_config(config), Err(ClientError::ZeroTimeout)));
    }

    #[test]
    fn invalid_default_header_fails_construction() {
        let config = ClientConfig::new("http://localhost").with_header("bad header", "x");
        assert!(matches!(
            HttpClient::from_config(config),
            Err(ClientError::InvalidHeaderName(name)) if name == "bad header"
        ));
    }

    #[test]
    fn absolute_url_detection() {
        assert!(is_absolute_url("http://a"));
        assert!(is_absolute_url("HTTPS://a/b"));
        assert!(!is_absolute_url("/products"));
        assert!(!is_absolute_url("products?next=http://x"));
        assert!(!is_absolute_url("://nope"));
    }

    #[tokio::test]
    async fn unserializable_body_is_not_sent() {
        let body: BTreeMap<Vec<u8>, u8> = BTreeMap::from([(vec![1], 1)]);
        let result = client().post("/products/add", &body).await;
        assert_eq!(result.status(), 0);
        assert_eq!(result.failure_kind(), Some(FailureKind::NotSent));
        assert!(result.error().unwrap().contains("serialize"));
        assert!(result.data().is_none());
    }

    #[tokio::test]
    async fn invalid_header_call_returns_not_sent() {
        let result = client()
            .delete_with("/products/1", &headers(&[("bad header", "x")]))
            .await;
        assert_eq!(result.status(), 0);
        assert_eq!(result.failure_kind(), Some(FailureKind::NotSent));
    }
}
