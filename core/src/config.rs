//! Construction-time configuration for `HttpClient`.

use std::collections::BTreeMap;
use std::time::Duration;

/// Header name to value. Used for default headers, per-call headers and
/// the headers of a received response.
pub type Headers = BTreeMap<String, String>;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// `Content-Type: application/json` and `Accept: application/json`.
pub fn default_headers() -> Headers {
    Headers::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ])
}

/// How often a request that got no response is re-sent.
///
/// Only requests that were transmitted but never answered are retried.
/// Received responses (whatever their status) and requests that could not
/// be built are returned as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each later one.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    pub const fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.backoff.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Everything an `HttpClient` is bound to. Validated when the client is
/// built, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub headers: Headers,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// A config for `base_url` with the default timeout, headers and no
    /// retries.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            headers: default_headers(),
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the whole default header set.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Adds or replaces a single default header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let config = ClientConfig::new("https://dummyjson.com");
        assert_eq!(config.base_url, "https://dummyjson.com");
        assert_eq!(config.timeout, Duration::from_millis(10_000));
        assert_eq!(config.headers, default_headers());
        assert_eq!(config.retry.max_retries, 0);
    }

    #[test]
    fn default_headers_are_json_pair() {
        let headers = default_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["Accept"], "application/json");
    }

    #[test]
    fn with_header_keeps_other_defaults() {
        let config = ClientConfig::new("http://localhost").with_header("X-Api-Key", "k");
        assert_eq!(config.headers.len(), 3);
        assert_eq!(config.headers["Accept"], "application/json");
    }

    #[test]
    fn with_headers_replaces_set() {
        let config = ClientConfig::new("http://localhost")
            .with_headers(Headers::from([("Accept".to_string(), "text/plain".to_string())]));
        assert_eq!(config.headers.len(), 1);
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn backoff_saturates_on_huge_attempt() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert_eq!(policy.delay_for(64), Duration::MAX);
    }
}
